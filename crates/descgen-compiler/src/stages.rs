//! Typestate pipeline: `CompileBuilder -> Parsed -> Indexed -> Resolved`.
//!
//! Each stage owns everything the next one needs, so a later stage can never
//! observe a half-built earlier one.

use descgen_core::{SourceMap, read_elements};

use crate::emit::{DescriptorTable, header_guard, write_deps, write_header, write_source};
use crate::registry::{MAX_ENDPOINTS, Registry};
use crate::resolve::{Resolutions, resolve};
use crate::tree::{Forest, build_forest};
use crate::Result;

pub const DEFAULT_MAX_ENDPOINTS: u8 = 8;

/// Knobs for one compilation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileConfig {
    /// Endpoint numbers available to the allocator.
    pub max_endpoints: u8,
    /// Descriptor types that must occur exactly once.
    pub require_one: Vec<u8>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            max_endpoints: DEFAULT_MAX_ENDPOINTS,
            require_one: Vec::new(),
        }
    }
}

pub struct CompileBuilder {
    sources: SourceMap,
    config: CompileConfig,
}

impl CompileBuilder {
    pub fn new(sources: SourceMap) -> Self {
        Self {
            sources,
            config: CompileConfig::default(),
        }
    }

    pub fn inline(src: &str) -> Self {
        Self::new(SourceMap::inline(src))
    }

    pub fn with_config(mut self, config: CompileConfig) -> Self {
        self.config = config;
        self
    }

    /// Endpoint numbers available to the allocator, at most `MAX_ENDPOINTS`.
    pub fn with_max_endpoints(mut self, max: u8) -> Self {
        self.config.max_endpoints = max.min(MAX_ENDPOINTS);
        self
    }

    pub fn require_exactly_one(mut self, descriptor_type: u8) -> Self {
        self.config.require_one.push(descriptor_type);
        self
    }

    pub fn parse(self) -> Result<Parsed> {
        let elements = read_elements(&self.sources)?;
        let forest = build_forest(&self.sources, &elements)?;
        log::debug!(
            "parsed {} sources into {} nodes ({} descriptors)",
            self.sources.len(),
            forest.len(),
            forest.descriptor_count()
        );
        Ok(Parsed {
            sources: self.sources,
            config: self.config,
            forest,
        })
    }

    /// Run every stage.
    pub fn compile(self) -> Result<Resolved> {
        self.parse()?.index()?.resolve()
    }
}

#[derive(Debug)]
pub struct Parsed {
    sources: SourceMap,
    config: CompileConfig,
    forest: Forest,
}

impl Parsed {
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn index(self) -> Result<Indexed> {
        let registry = Registry::index(&self.forest, self.config.max_endpoints)?;
        for &descriptor_type in &self.config.require_one {
            registry.expect_exactly_one(descriptor_type)?;
        }
        Ok(Indexed {
            sources: self.sources,
            forest: self.forest,
            registry,
        })
    }
}

#[derive(Debug)]
pub struct Indexed {
    sources: SourceMap,
    forest: Forest,
    registry: Registry,
}

impl Indexed {
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn resolve(self) -> Result<Resolved> {
        let resolutions = resolve(&self.forest, &self.registry)?;
        let table = DescriptorTable::build(&self.forest, &self.registry, &resolutions)?;
        Ok(Resolved {
            sources: self.sources,
            forest: self.forest,
            registry: self.registry,
            resolutions,
            table,
        })
    }
}

/// A fully resolved run, ready to emit.
#[derive(Debug)]
pub struct Resolved {
    sources: SourceMap,
    forest: Forest,
    registry: Registry,
    resolutions: Resolutions,
    table: DescriptorTable,
}

impl Resolved {
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn resolutions(&self) -> &Resolutions {
        &self.resolutions
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn table(&self) -> &DescriptorTable {
        &self.table
    }

    pub fn emit_source(&self) -> String {
        write_source(&self.table)
    }

    /// Header text; the include guard is derived from `path`.
    pub fn emit_header(&self, path: &str) -> String {
        write_header(&self.table, &header_guard(path))
    }

    /// Make rule listing every input file as a prerequisite of `targets`.
    pub fn emit_deps(&self, targets: &[&str]) -> String {
        write_deps(targets, self.sources.paths())
    }
}
