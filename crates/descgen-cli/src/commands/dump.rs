use std::path::PathBuf;

use descgen_compiler::CompileConfig;

use super::run_common::compile_or_exit;

pub struct DumpArgs {
    pub inputs: Vec<PathBuf>,
    pub config: CompileConfig,
    pub registry: bool,
    pub color: bool,
}

pub fn run(args: DumpArgs) {
    let resolved = compile_or_exit(&args.inputs, args.config, args.color);
    let dump = resolved
        .printer()
        .registry(args.registry)
        .colored(args.color)
        .dump();
    print!("{}", dump);
}
