//! Shared logic for the compiling commands.

use std::path::PathBuf;

use descgen_compiler::{CompileBuilder, CompileConfig, Resolved};

use super::source_loader::load_sources;

/// Load the inputs and run the whole pipeline, exiting with status 1 on the
/// first error after printing its diagnostic.
pub fn compile_or_exit(inputs: &[PathBuf], config: CompileConfig, color: bool) -> Resolved {
    let sources = match load_sources(inputs) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("{}", e.printer().colored(color).render());
            std::process::exit(1);
        }
    };

    log::debug!("compiling {} input(s)", sources.len());
    match CompileBuilder::new(sources.clone()).with_config(config).compile() {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("{}", e.printer().sources(&sources).colored(color).render());
            std::process::exit(1);
        }
    }
}
