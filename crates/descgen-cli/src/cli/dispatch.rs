//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;
use descgen_compiler::CompileConfig;
use descgen_compiler::stages::DEFAULT_MAX_ENDPOINTS;

use super::ColorChoice;
use crate::commands::build::BuildArgs;
use crate::commands::check::CheckArgs;
use crate::commands::dump::DumpArgs;

/// Flags shared by every compiling command.
pub struct CompileParams {
    pub inputs: Vec<PathBuf>,
    pub max_endpoints: u8,
    pub require_one: Vec<u8>,
    pub color: ColorChoice,
}

impl CompileParams {
    fn from_matches(m: &ArgMatches) -> Self {
        Self {
            inputs: m
                .get_many::<PathBuf>("inputs")
                .map(|v| v.cloned().collect())
                .unwrap_or_default(),
            max_endpoints: m
                .get_one::<u8>("max_endpoints")
                .copied()
                .unwrap_or(DEFAULT_MAX_ENDPOINTS),
            require_one: m
                .get_many::<u8>("require_one")
                .map(|v| v.copied().collect())
                .unwrap_or_default(),
            color: parse_color(m),
        }
    }

    fn config(&self) -> CompileConfig {
        CompileConfig {
            max_endpoints: self.max_endpoints,
            require_one: self.require_one.clone(),
        }
    }
}

pub struct BuildParams {
    pub compile: CompileParams,
    pub source_out: Option<PathBuf>,
    pub header_out: Option<PathBuf>,
    pub deps_out: Option<PathBuf>,
    pub verbosity: u8,
}

impl BuildParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            compile: CompileParams::from_matches(m),
            source_out: m.get_one::<PathBuf>("source_out").cloned(),
            header_out: m.get_one::<PathBuf>("header_out").cloned(),
            deps_out: m.get_one::<PathBuf>("deps_out").cloned(),
            verbosity: m.get_count("verbose"),
        }
    }
}

impl From<BuildParams> for BuildArgs {
    fn from(p: BuildParams) -> Self {
        Self {
            config: p.compile.config(),
            inputs: p.compile.inputs,
            source_out: p.source_out,
            header_out: p.header_out,
            deps_out: p.deps_out,
            color: p.compile.color.should_colorize(),
        }
    }
}

pub struct CheckParams {
    pub compile: CompileParams,
    pub verbosity: u8,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            compile: CompileParams::from_matches(m),
            verbosity: m.get_count("verbose"),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            config: p.compile.config(),
            inputs: p.compile.inputs,
            color: p.compile.color.should_colorize(),
        }
    }
}

pub struct DumpParams {
    pub compile: CompileParams,
    pub registry: bool,
    pub verbosity: u8,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            compile: CompileParams::from_matches(m),
            registry: m.get_flag("registry"),
            verbosity: m.get_count("verbose"),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            config: p.compile.config(),
            inputs: p.compile.inputs,
            registry: p.registry,
            color: p.compile.color.should_colorize(),
        }
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
