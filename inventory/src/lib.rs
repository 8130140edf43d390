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

//! The set of sources to compile: a fixed manifest followed by whatever the working directory
//! contributes.

use makegen_metrics::scoped_metric;
use makegen_paths::{InsertResult, PathSet};
use std::io::ErrorKind;
use thiserror::Error;

mod disk_interface;
pub use disk_interface::{DiskInterface, SystemDiskInterface};

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("duplicate source: {path}")]
    DuplicateSource { path: String },
    #[error("missing source: {path}")]
    MissingSource { path: String },
    #[error("reading size of {path}: {source}")]
    Stat {
        path: String,
        source: std::io::Error,
    },
    #[error("scanning {dir} for sources: {source}")]
    Scan {
        dir: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Relative to the project root.
    pub path: String,
    /// Only ever used as a proxy for how long the file takes to compile.
    pub size: u64,
}

impl SourceFile {
    pub fn new<S: Into<String>>(path: S, size: u64) -> SourceFile {
        SourceFile {
            path: path.into(),
            size,
        }
    }
}

/// Validated sources, manifest entries first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    sources: Vec<SourceFile>,
}

impl Inventory {
    pub fn sources(&self) -> &[SourceFile] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl IntoIterator for Inventory {
    type Item = SourceFile;
    type IntoIter = std::vec::IntoIter<SourceFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.into_iter()
    }
}

/// Sorted names of the files in the project root ending with `extension`.
pub fn scan<D: DiskInterface>(disk: &D, extension: &str) -> Result<Vec<String>, InventoryError> {
    let mut found = disk
        .list_files(".", extension)
        .map_err(|source| InventoryError::Scan {
            dir: ".".to_owned(),
            source,
        })?;
    // Directory listing order differs between filesystems.
    found.sort();
    Ok(found)
}

/// Builds the inventory from `manifest` plus a scan for `extension` files.
///
/// Duplicates are rejected before anything is read from disk, so a duplicated path that does
/// not exist still reports as a duplicate.
pub fn collect<D, S>(
    manifest: &[S],
    extension: &str,
    disk: &D,
) -> Result<Inventory, InventoryError>
where
    D: DiskInterface,
    S: AsRef<str>,
{
    scoped_metric!("inventory");
    let scanned = scan(disk, extension)?;

    let mut paths = PathSet::with_capacity(manifest.len() + scanned.len());
    let combined = manifest
        .iter()
        .map(|p| p.as_ref().to_owned())
        .chain(scanned.into_iter());
    for path in combined {
        if let InsertResult::AlreadyExists(existing) = paths.insert(path) {
            return Err(InventoryError::DuplicateSource {
                path: paths.get(existing).to_owned(),
            });
        }
    }

    let sources = paths
        .iter()
        .map(|path| match disk.size(path) {
            Ok(size) => Ok(SourceFile::new(path, size)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(InventoryError::MissingSource {
                path: path.to_owned(),
            }),
            Err(source) => Err(InventoryError::Stat {
                path: path.to_owned(),
                source,
            }),
        })
        .collect::<Result<Vec<SourceFile>, InventoryError>>()?;
    Ok(Inventory { sources })
}
