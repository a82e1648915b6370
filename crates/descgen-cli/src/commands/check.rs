use std::path::PathBuf;

use descgen_compiler::CompileConfig;

use super::run_common::compile_or_exit;

pub struct CheckArgs {
    pub inputs: Vec<PathBuf>,
    pub config: CompileConfig,
    pub color: bool,
}

pub fn run(args: CheckArgs) {
    let resolved = compile_or_exit(&args.inputs, args.config, args.color);
    log::info!(
        "{} descriptor(s) in {} table row(s)",
        resolved.registry().len(),
        resolved.table().descriptor_rows().count()
    );
    // Silent on success (like cargo check)
}
