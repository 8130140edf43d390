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

use makegen_inventory::SourceFile;
use makegen_metrics::scoped_metric;
use makegen_paths::{object_path, parent_dir, InsertResult, PathSet};
use petgraph::{graph::NodeIndex, visit::DfsPostOrder};
use thiserror::Error;

pub mod order;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphError {
    #[error("{first} and {second} both compile to {object}")]
    ObjectCollision {
        object: String,
        first: String,
        second: String,
    },
}

/// The compiler invocation shared by every compile and link command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub compiler: String,
    pub flags: Vec<String>,
    /// Header search roots, highest priority first. Never sorted or deduplicated.
    pub include_roots: Vec<String>,
}

impl Toolchain {
    pub fn new<S: Into<String>>(compiler: S) -> Toolchain {
        Toolchain {
            compiler: compiler.into(),
            flags: vec![],
            include_roots: vec![],
        }
    }

    pub fn with_flags<I, S>(mut self, flags: I) -> Toolchain
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags.extend(flags.into_iter().map(Into::into));
        self
    }

    pub fn with_include_roots<I, S>(mut self, roots: I) -> Toolchain
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_roots.extend(roots.into_iter().map(Into::into));
        self
    }

    /// `{compiler} {flags..} -I{root}..`
    pub fn command_prefix(&self) -> String {
        let mut parts = Vec::with_capacity(1 + self.flags.len() + self.include_roots.len());
        parts.push(self.compiler.clone());
        parts.extend(self.flags.iter().cloned());
        parts.extend(self.include_roots.iter().map(|root| format!("-I{}", root)));
        parts.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectTarget {
    pub object_path: String,
    /// Has to exist before the compiler can write `object_path`.
    pub directory: String,
    pub source: SourceFile,
}

impl ObjectTarget {
    pub fn new(build_root: &str, source: SourceFile) -> ObjectTarget {
        let object_path = object_path(build_root, &source.path);
        let directory = parent_dir(&object_path).to_owned();
        ObjectTarget {
            object_path,
            directory,
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildGraph {
    objects: Vec<ObjectTarget>,
    final_target: String,
    build_root: String,
    toolchain: Toolchain,
}

impl BuildGraph {
    pub fn objects(&self) -> &[ObjectTarget] {
        &self.objects
    }

    pub fn final_target(&self) -> &str {
        &self.final_target
    }

    pub fn build_root(&self) -> &str {
        &self.build_root
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// What the final target depends on, in the current object order.
    pub fn dependencies(&self) -> Vec<&str> {
        self.objects
            .iter()
            .map(|o| o.object_path.as_str())
            .collect()
    }

    /// The same graph with its objects reordered by [`order::by_estimated_cost`].
    pub fn ordered(self) -> BuildGraph {
        BuildGraph {
            objects: order::by_estimated_cost(self.objects),
            ..self
        }
    }

    /// The order a serial executor would produce targets in when asked for the final target.
    ///
    /// Sources are leaves and are not part of the schedule.
    pub fn schedule(&self) -> Vec<&str> {
        #[derive(Debug)]
        enum Node<'a> {
            Target(&'a str),
            Source,
        }

        let mut graph = petgraph::Graph::<Node, ()>::new();
        let root = graph.add_node(Node::Target(&self.final_target));
        // The visitor stacks neighbors in most-recently-added-first order, so adding edges in
        // object order makes it visit objects in object order.
        for object in &self.objects {
            let target: NodeIndex = graph.add_node(Node::Target(&object.object_path));
            let source = graph.add_node(Node::Source);
            graph.add_edge(root, target, ());
            graph.add_edge(target, source, ());
        }

        let mut order = Vec::with_capacity(self.objects.len() + 1);
        let mut visitor = DfsPostOrder::new(&graph, root);
        while let Some(node) = visitor.next(&graph) {
            if let Node::Target(name) = graph[node] {
                order.push(name);
            }
        }
        order
    }
}

pub struct GraphBuilder {
    build_root: String,
    final_target: String,
    toolchain: Toolchain,
}

impl GraphBuilder {
    pub fn new<R, T>(build_root: R, final_target: T, toolchain: Toolchain) -> GraphBuilder
    where
        R: Into<String>,
        T: Into<String>,
    {
        GraphBuilder {
            build_root: build_root.into(),
            final_target: final_target.into(),
            toolchain,
        }
    }

    /// One object target per source, in source order.
    pub fn build<I>(self, sources: I) -> Result<BuildGraph, GraphError>
    where
        I: IntoIterator<Item = SourceFile>,
    {
        scoped_metric!("graph");
        let mut seen = PathSet::new();
        let mut objects: Vec<ObjectTarget> = Vec::new();
        for source in sources {
            let object = ObjectTarget::new(&self.build_root, source);
            // Distinct sources can still collide, e.g. `a.cc` and `a.cpp`.
            if let InsertResult::AlreadyExists(idx) = seen.insert(object.object_path.as_str()) {
                return Err(GraphError::ObjectCollision {
                    object: object.object_path,
                    first: objects[idx].source.path.clone(),
                    second: object.source.path,
                });
            }
            objects.push(object);
        }

        Ok(BuildGraph {
            objects,
            final_target: self.final_target,
            build_root: self.build_root,
            toolchain: self.toolchain,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn toolchain() -> Toolchain {
        Toolchain::new("g++").with_include_roots(vec!["inc1/", "inc2/"])
    }

    fn sources(entries: &[(&str, u64)]) -> Vec<SourceFile> {
        entries
            .iter()
            .map(|(path, size)| SourceFile::new(*path, *size))
            .collect()
    }

    #[test]
    fn command_prefix_keeps_include_order() {
        let toolchain = Toolchain::new("g++")
            .with_flags(vec!["-O2"])
            .with_include_roots(vec!["inc2/", "inc1/", "inc2/"]);
        assert_eq!(toolchain.command_prefix(), "g++ -O2 -Iinc2/ -Iinc1/ -Iinc2/");
        assert_eq!(Toolchain::new("cc").command_prefix(), "cc");
    }

    #[test]
    fn one_object_per_source() {
        let graph = GraphBuilder::new("build", "test", toolchain())
            .build(sources(&[("a/x.cc", 3), ("main.cpp", 9)]))
            .expect("valid graph");
        assert_eq!(graph.objects().len(), 2);
        assert_eq!(graph.final_target(), "test");
        assert_eq!(graph.dependencies(), vec!["build/a/x.o", "build/main.o"]);
        let first = &graph.objects()[0];
        assert_eq!(first.directory, "build/a");
        assert_eq!(first.source, SourceFile::new("a/x.cc", 3));
        assert_eq!(graph.objects()[1].directory, "build");
    }

    #[test]
    fn object_collision() {
        let err = GraphBuilder::new("build", "test", toolchain())
            .build(sources(&[("a.cc", 1), ("b.cc", 1), ("a.cpp", 1)]))
            .expect_err("collision");
        assert_eq!(
            err,
            GraphError::ObjectCollision {
                object: "build/a.o".to_owned(),
                first: "a.cc".to_owned(),
                second: "a.cpp".to_owned(),
            }
        );
    }

    #[test]
    fn ordered_sorts_by_size() {
        let graph = GraphBuilder::new("build", "test", toolchain())
            .build(sources(&[("small.cc", 500), ("large.cc", 1200)]))
            .expect("valid graph")
            .ordered();
        assert_eq!(graph.dependencies(), vec!["build/large.o", "build/small.o"]);
        assert_eq!(graph.toolchain(), &toolchain());
        assert_eq!(graph.build_root(), "build");
    }

    #[test]
    fn schedule_ends_with_final_target() {
        let graph = GraphBuilder::new("build", "test", toolchain())
            .build(sources(&[("a.cc", 1), ("b/c.cc", 2), ("d.cpp", 3)]))
            .expect("valid graph");
        assert_eq!(
            graph.schedule(),
            vec!["build/a.o", "build/b/c.o", "build/d.o", "test"]
        );
    }

    #[test]
    fn empty_graph() {
        let graph = GraphBuilder::new("build", "test", toolchain())
            .build(vec![])
            .expect("valid graph");
        assert!(graph.dependencies().is_empty());
        assert_eq!(graph.schedule(), vec!["test"]);
    }
}
