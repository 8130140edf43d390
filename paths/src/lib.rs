/*
 * Copyright 2020 Nikhil Marathe <nsm.nikhil@gmail.com>
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::collections::{hash_map::Entry, HashMap};

pub type PathRef = usize;

/// Insertion ordered set of project relative paths.
///
/// Paths are compared as plain strings. No canonicalization happens, so `a/x.cc` and
/// `./a/x.cc` are different entries.
#[derive(Debug, Default)]
pub struct PathSet {
    paths: Vec<String>,
    map: HashMap<String, PathRef>,
}

// Rough translation of HashMap entry API to be more ergonomic.
#[derive(Debug, PartialEq, Eq)]
pub enum InsertResult {
    AlreadyExists(PathRef),
    Inserted(PathRef),
}

impl PathSet {
    pub fn new() -> PathSet {
        PathSet::default()
    }

    pub fn with_capacity(capacity: usize) -> PathSet {
        PathSet {
            paths: Vec::with_capacity(capacity),
            map: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert<P: Into<String>>(&mut self, path: P) -> InsertResult {
        let path = path.into();
        match self.map.entry(path) {
            Entry::Occupied(e) => InsertResult::AlreadyExists(*e.get()),
            Entry::Vacant(e) => {
                let idx = self.paths.len();
                self.paths.push(e.key().clone());
                e.insert(idx);
                InsertResult::Inserted(idx)
            }
        }
    }

    pub fn get(&self, rf: PathRef) -> &str {
        &self.paths[rf]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

/// Everything before the extension of the final path component.
///
/// Dots in directory names are not extension separators, and a name without an extension
/// (or a dotfile like `.clang-format`) is its own stem.
pub fn stem(path: &str) -> &str {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[name_start..].rfind('.') {
        Some(0) | None => path,
        Some(dot) => &path[..name_start + dot],
    }
}

/// `{build_root}/{stem}.o`, mirroring the source tree under the build root.
pub fn object_path(build_root: &str, source: &str) -> String {
    let stem = stem(source);
    if build_root.is_empty() {
        return format!("{}.o", stem);
    }
    format!("{}/{}.o", build_root.trim_end_matches('/'), stem)
}

/// The directory containing `path`, or `.` for a bare file name.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(i) => &path[..i],
        None => ".",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn insert_reports_duplicates() {
        let mut set = PathSet::new();
        assert_eq!(set.insert("a/x.cc"), InsertResult::Inserted(0));
        assert_eq!(set.insert("b.cpp"), InsertResult::Inserted(1));
        assert_eq!(set.insert("a/x.cc"), InsertResult::AlreadyExists(0));
        assert_eq!(set.get(1), "b.cpp");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["a/x.cc", "b.cpp"]);
    }

    #[test]
    fn no_canonicalization() {
        let mut set = PathSet::new();
        set.insert("a/x.cc");
        assert_eq!(set.insert("./a/x.cc"), InsertResult::Inserted(1));
    }

    #[test]
    fn object_paths() {
        assert_eq!(
            object_path("build", "tflite-micro/tensorflow/lite/array.cc"),
            "build/tflite-micro/tensorflow/lite/array.o"
        );
        assert_eq!(object_path("build", "main.cpp"), "build/main.o");
        assert_eq!(object_path("build/", "main.cpp"), "build/main.o");
        assert_eq!(object_path("build", "archive.tar.gz"), "build/archive.tar.o");
        assert_eq!(object_path("", "main.cpp"), "main.o");
    }

    #[test]
    fn dots_in_directories_are_not_extensions() {
        assert_eq!(object_path("out", "lib.v2/Makefile"), "out/lib.v2/Makefile.o");
        assert_eq!(object_path("out", "src/.hidden"), "out/src/.hidden.o");
    }

    #[test]
    fn parent_dirs() {
        assert_eq!(parent_dir("build/a/b/x.o"), "build/a/b");
        assert_eq!(parent_dir("build/x.o"), "build");
        assert_eq!(parent_dir("x.o"), ".");
        assert_eq!(parent_dir("/x.o"), "/");
    }

    proptest! {
        #[test]
        fn object_path_mirrors_source_tree(
            dirs in prop::collection::vec("[a-z_]{1,8}", 0..4),
            name in "[a-z_]{1,8}",
            ext in "(cc|cpp|c)",
        ) {
            let mut source = dirs.join("/");
            if !source.is_empty() {
                source.push('/');
            }
            source.push_str(&name);
            let without_ext = source.clone();
            source.push('.');
            source.push_str(&ext);

            let object = object_path("build", &source);
            prop_assert_eq!(&object, &format!("build/{}.o", without_ext));
            prop_assert_eq!(object_path("build", &source), object.clone());
            let expected_dir = if dirs.is_empty() {
                "build".to_owned()
            } else {
                format!("build/{}", dirs.join("/"))
            };
            prop_assert_eq!(parent_dir(&object), expected_dir.as_str());
        }
    }
}
