use std::path::PathBuf;

use descgen_compiler::{CompileConfig, Error, Resolved, Result};

use super::output::write_if_changed;
use super::run_common::compile_or_exit;

pub struct BuildArgs {
    pub inputs: Vec<PathBuf>,
    pub config: CompileConfig,
    pub source_out: Option<PathBuf>,
    pub header_out: Option<PathBuf>,
    pub deps_out: Option<PathBuf>,
    pub color: bool,
}

/// One generated file, rendered but not yet written.
#[derive(Debug, PartialEq, Eq)]
pub struct Output {
    pub path: PathBuf,
    pub contents: String,
}

pub fn run(args: BuildArgs) {
    let resolved = compile_or_exit(&args.inputs, args.config.clone(), args.color);

    if args.source_out.is_none() && args.header_out.is_none() {
        if args.deps_out.is_some() {
            eprintln!("error: --deps needs --source or --header to name the targets");
            std::process::exit(1);
        }
        print!("{}", resolved.emit_source());
        return;
    }

    let outputs = render_outputs(&resolved, &args);
    if let Err(e) = write_outputs(&outputs) {
        eprintln!("{}", e.printer().colored(args.color).render());
        std::process::exit(1);
    }
}

/// Render every requested output. Nothing touches the disk here, so a
/// failing run never leaves half of its outputs behind.
pub fn render_outputs(resolved: &Resolved, args: &BuildArgs) -> Vec<Output> {
    let mut outputs = Vec::new();
    if let Some(path) = &args.source_out {
        outputs.push(Output {
            path: path.clone(),
            contents: resolved.emit_source(),
        });
    }
    if let Some(path) = &args.header_out {
        outputs.push(Output {
            path: path.clone(),
            contents: resolved.emit_header(&path.to_string_lossy()),
        });
    }
    if let Some(path) = &args.deps_out {
        let targets: Vec<String> = [&args.source_out, &args.header_out]
            .into_iter()
            .flatten()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let targets: Vec<&str> = targets.iter().map(String::as_str).collect();
        outputs.push(Output {
            path: path.clone(),
            contents: resolved.emit_deps(&targets),
        });
    }
    outputs
}

pub fn write_outputs(outputs: &[Output]) -> Result<()> {
    for output in outputs {
        write_if_changed(&output.path, &output.contents)
            .map_err(|e| Error::io(output.path.to_string_lossy(), &e))?;
    }
    Ok(())
}
