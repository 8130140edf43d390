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

use anyhow::{self, Context};
use thiserror::Error;

use makegen_desc::{emit, write_descriptor, Descriptor};
use makegen_graph::{BuildGraph, GraphBuilder, GraphError, Toolchain};
use makegen_inventory::{collect, DiskInterface, InventoryError, SystemDiskInterface};
use std::{ffi::OsString, path::PathBuf};

pub mod manifest;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DebugMode {
    /// Print the order a serial make would build targets in.
    List,
    Stats,
}

#[derive(Error, Debug)]
#[error("Unknown debug setting '{0}'")]
pub struct DebugModeError(String);

impl std::str::FromStr for DebugMode {
    type Err = DebugModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stats" => Ok(DebugMode::Stats),
            "list" => Ok(DebugMode::List),
            e => Err(DebugModeError(e.to_owned())),
        }
    }
}

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Project root. Sources, the scan and the output are all relative to it.
    pub execution_dir: Option<String>,
    pub output: String,
    pub build_root: String,
    pub final_target: String,
    pub compiler: String,
    pub flags: Vec<String>,
    pub include_roots: Vec<String>,
    pub manifest: Vec<String>,
    pub scan_extension: String,
    pub debug_modes: Vec<DebugMode>,
    pub to_stdout: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            execution_dir: None,
            output: "Makefile".to_owned(),
            build_root: "build".to_owned(),
            final_target: "test".to_owned(),
            compiler: "g++".to_owned(),
            flags: vec![],
            include_roots: manifest::INCLUDE_ROOTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            manifest: manifest::SOURCES.iter().map(|s| s.to_string()).collect(),
            scan_extension: ".cpp".to_owned(),
            debug_modes: vec![],
            to_stdout: false,
        }
    }
}

impl Config {
    pub fn toolchain(&self) -> Toolchain {
        Toolchain::new(self.compiler.as_str())
            .with_flags(self.flags.iter().cloned())
            .with_include_roots(self.include_roots.iter().cloned())
    }

    fn root(&self) -> PathBuf {
        PathBuf::from(self.execution_dir.as_deref().unwrap_or("."))
    }

    fn has_debug_mode(&self, mode: DebugMode) -> bool {
        self.debug_modes.iter().any(|m| *m == mode)
    }
}

/// Validated inventory mapped to object targets, largest sources first.
pub fn plan<D: DiskInterface>(config: &Config, disk: &D) -> Result<BuildGraph, GenerateError> {
    let inventory = collect(&config.manifest, &config.scan_extension, disk)?;
    let graph = GraphBuilder::new(
        config.build_root.as_str(),
        config.final_target.as_str(),
        config.toolchain(),
    )
    .build(inventory)?;
    Ok(graph.ordered())
}

/// Renders the Makefile for `config` without writing anything.
pub fn generate<D: DiskInterface>(config: &Config, disk: &D) -> Result<Descriptor, GenerateError> {
    Ok(emit(&plan(config, disk)?))
}

pub fn run(config: Config) -> anyhow::Result<()> {
    if config.has_debug_mode(DebugMode::Stats) {
        makegen_metrics::enable();
    }

    let root = config.root();
    if !root.is_dir() {
        anyhow::bail!("project directory {} does not exist", root.display());
    }
    let disk = SystemDiskInterface::new(&root);
    let graph = plan(&config, &disk)
        .with_context(|| format!("generating {}", config.output))?;

    if config.has_debug_mode(DebugMode::List) {
        for target in graph.schedule() {
            eprintln!("makegen: {}", target);
        }
    }

    let descriptor = emit(&graph);
    if config.to_stdout {
        print!("{}", descriptor);
    } else {
        let output = root.join(&config.output);
        write_descriptor(&output, &descriptor)?;
        eprintln!(
            "makegen: wrote {} ({} objects)",
            output.display(),
            graph.objects().len()
        );
    }

    if config.has_debug_mode(DebugMode::Stats) {
        makegen_metrics::dump();
    }
    Ok(())
}

pub const USAGE: &str = "\
usage: makegen [options]

options:
  -C DIR     generate for the project in DIR (default: current directory)
  -o FILE    output file, relative to the project (default: Makefile)
  -d MODE    enable debugging, may be repeated
  --stdout   print the Makefile instead of writing it
  --version  print makegen version
  -h, --help print this message

debugging modes:
  stats      print timing statistics
  list       print targets in the order a serial make would build them
";

#[derive(Debug)]
pub enum Invocation {
    Help,
    Version,
    Generate(Config),
}

/// Parses command line arguments, without the program name.
pub fn parse_args(args: Vec<OsString>) -> anyhow::Result<Invocation> {
    let mut args = pico_args::Arguments::from_vec(args);
    if args.contains(["-h", "--help"]) {
        return Ok(Invocation::Help);
    }
    if args.contains("--version") {
        return Ok(Invocation::Version);
    }

    let mut config = Config::default();
    config.execution_dir = args.opt_value_from_str("-C")?;
    if let Some(output) = args.opt_value_from_str("-o")? {
        config.output = output;
    }
    config.debug_modes = args.values_from_str("-d")?;
    config.to_stdout = args.contains("--stdout");

    let rest = args.finish();
    if !rest.is_empty() {
        anyhow::bail!("unexpected arguments: {:?}", rest);
    }
    Ok(Invocation::Generate(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    fn config(list: &[&str]) -> Config {
        match parse_args(args(list)).expect("valid args") {
            Invocation::Generate(config) => config,
            other => panic!("expected generate, got {:?}", other),
        }
    }

    #[test]
    fn defaults() {
        let config = config(&[]);
        assert_eq!(config.output, "Makefile");
        assert_eq!(config.build_root, "build");
        assert_eq!(config.final_target, "test");
        assert_eq!(config.manifest.len(), manifest::SOURCES.len());
        assert_eq!(
            config.toolchain().command_prefix(),
            "g++ -Itflite-micro/ -Iflatbuffers/include/ -Igemmlowp/ -Iruy/"
        );
        assert!(config.debug_modes.is_empty());
        assert!(!config.to_stdout);
    }

    #[test]
    fn options() {
        let config = config(&["-C", "proj", "-o", "gen.mk", "-d", "stats", "-d", "list", "--stdout"]);
        assert_eq!(config.execution_dir.as_deref(), Some("proj"));
        assert_eq!(config.output, "gen.mk");
        assert_eq!(config.debug_modes, vec![DebugMode::Stats, DebugMode::List]);
        assert!(config.to_stdout);
    }

    #[test]
    fn help_and_version() {
        assert!(matches!(
            parse_args(args(&["--help"])).expect("valid"),
            Invocation::Help
        ));
        assert!(matches!(
            parse_args(args(&["--version"])).expect("valid"),
            Invocation::Version
        ));
    }

    #[test]
    fn unknown_debug_mode() {
        let err = parse_args(args(&["-d", "explain"])).expect_err("unknown mode");
        assert!(err.to_string().contains("explain"), "{}", err);
    }

    #[test]
    fn stray_arguments() {
        assert!(parse_args(args(&["all"])).is_err());
    }

    #[test]
    fn default_manifest_plans() {
        // Every manifest entry compiles to its own object.
        let config = Config::default();
        let graph = GraphBuilder::new("build", "test", config.toolchain())
            .build(
                config
                    .manifest
                    .iter()
                    .map(|p| makegen_inventory::SourceFile::new(p.as_str(), 0)),
            )
            .expect("no collisions");
        assert_eq!(graph.objects().len(), manifest::SOURCES.len());
    }
}
