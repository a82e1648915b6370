//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Flags every command that compiles understands.
fn with_compile_args(cmd: Command) -> Command {
    cmd.arg(inputs_arg())
        .arg(max_endpoints_arg())
        .arg(require_one_arg())
        .arg(color_arg())
        .arg(verbose_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("descgen")
        .about("Compile USB descriptor markup embedded in C comments")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(build_command())
        .subcommand(check_command())
        .subcommand(dump_command())
}

/// Compile and write the requested outputs.
pub fn build_command() -> Command {
    let cmd = Command::new("build")
        .about("Generate the descriptor table, endpoint header and make deps")
        .override_usage(
            "\
  descgen build <FILE>... --source <OUT> [--header <OUT>] [--deps <OUT>]",
        )
        .after_help(
            r#"EXAMPLES:
  descgen build src/*.c --source build/usb_descriptors.c
  descgen build src/*.c --source d.c --header d.h --deps d.d
  descgen build src/*.c --source d.c --require-one 0x01 --max-endpoints 4"#,
        )
        .arg(source_out_arg())
        .arg(header_out_arg())
        .arg(deps_out_arg());

    with_compile_args(cmd)
}

/// Compile without writing anything.
pub fn check_command() -> Command {
    let cmd = Command::new("check")
        .about("Validate descriptor markup without generating output")
        .after_help(
            r#"EXAMPLES:
  descgen check src/*.c
  descgen check src/*.c --require-one 0x01"#,
        );

    with_compile_args(cmd)
}

/// Show the resolved tree.
pub fn dump_command() -> Command {
    let cmd = Command::new("dump")
        .about("Show resolved descriptors")
        .after_help(
            r#"EXAMPLES:
  descgen dump src/usb_hid.c             # content tree with resolved values
  descgen dump src/*.c --registry        # per-type indices"#,
        )
        .arg(registry_arg());

    with_compile_args(cmd)
}
