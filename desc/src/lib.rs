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

//! Makefile rendering.
//!
//! A [`Descriptor`] is plain data. Rendering it is a pure function, and the only I/O in this
//! crate is [`write_descriptor`], which never leaves a half written file behind.

use makegen_graph::BuildGraph;
use makegen_metrics::scoped_metric;
use std::{fmt, io::Write, path::Path};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const CLEAN: &str = "clean";

#[derive(Error, Debug)]
#[error("writing {path}: {source}")]
pub struct WriteError {
    pub path: String,
    pub source: std::io::Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub target: String,
    pub depends_on: Vec<String>,
    pub commands: Vec<String>,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.target)?;
        for dep in &self.depends_on {
            write!(f, " {}", dep)?;
        }
        writeln!(f)?;
        for command in &self.commands {
            writeln!(f, "\t{}", command)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Descriptor {
    pub rules: Vec<Rule>,
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            write!(f, "{}", rule)?;
        }
        Ok(())
    }
}

/// The link rule, then `clean`, then one compile rule per object in graph order.
pub fn emit(graph: &BuildGraph) -> Descriptor {
    scoped_metric!("emit");
    let prefix = graph.toolchain().command_prefix();
    let objects: Vec<String> = graph.dependencies().into_iter().map(String::from).collect();

    let mut link = vec![prefix.clone()];
    link.extend(objects.iter().cloned());
    link.push(format!("-o {}", graph.final_target()));

    let mut rules = Vec::with_capacity(graph.objects().len() + 2);
    rules.push(Rule {
        target: graph.final_target().to_owned(),
        depends_on: objects,
        commands: vec![link.join(" ")],
    });
    rules.push(Rule {
        target: CLEAN.to_owned(),
        depends_on: vec![],
        commands: vec![format!("rm -rf {}", graph.build_root())],
    });
    for object in graph.objects() {
        // One recipe line, so the directory always exists by the time the compiler runs.
        let compile = format!(
            "mkdir -p {} && {} {} -c -o {}",
            object.directory, prefix, object.source.path, object.object_path
        );
        rules.push(Rule {
            target: object.object_path.clone(),
            depends_on: vec![object.source.path.clone()],
            commands: vec![compile],
        });
    }
    Descriptor { rules }
}

/// Replaces `path` with the rendered descriptor.
///
/// The document goes to a temporary file next to `path` first and is renamed over it, so
/// readers see either the old file or the complete new one.
pub fn write_descriptor<P: AsRef<Path>>(path: P, descriptor: &Descriptor) -> Result<(), WriteError> {
    scoped_metric!("write");
    let path = path.as_ref();
    let wrap = |source: std::io::Error| WriteError {
        path: path.display().to_string(),
        source,
    };

    let contents = descriptor.to_string();
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(wrap)?;
    file.write_all(contents.as_bytes()).map_err(wrap)?;
    file.as_file().sync_all().map_err(wrap)?;
    file.persist(path).map_err(|e| wrap(e.error))?;
    Ok(())
}
