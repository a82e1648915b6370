//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` so build/check/dump can share the
//! same definition.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};
use descgen_compiler::registry::MAX_ENDPOINTS;

/// C source files carrying descriptor markup (positional, one or more).
pub fn inputs_arg() -> Arg {
    Arg::new("inputs")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .num_args(1..)
        .required(true)
        .help("C source files to scan for descriptor comments ('-' for stdin)")
}

/// Generated C source (--source).
pub fn source_out_arg() -> Arg {
    Arg::new("source_out")
        .long("source")
        .value_name("OUT")
        .value_parser(value_parser!(PathBuf))
        .help("Write the descriptor table source to OUT")
}

/// Generated header (--header).
pub fn header_out_arg() -> Arg {
    Arg::new("header_out")
        .long("header")
        .value_name("OUT")
        .value_parser(value_parser!(PathBuf))
        .help("Write the endpoint header to OUT")
}

/// Make dependency rule (--deps).
pub fn deps_out_arg() -> Arg {
    Arg::new("deps_out")
        .long("deps")
        .value_name("OUT")
        .value_parser(value_parser!(PathBuf))
        .help("Write a make rule listing the inputs to OUT")
}

/// Endpoint allocator size (--max-endpoints).
pub fn max_endpoints_arg() -> Arg {
    Arg::new("max_endpoints")
        .long("max-endpoints")
        .value_name("N")
        .default_value("8")
        .value_parser(value_parser!(u8).range(0..=i64::from(MAX_ENDPOINTS)))
        .help("Number of endpoint addresses available to the allocator")
}

/// Exactly-one policy (--require-one, repeatable).
pub fn require_one_arg() -> Arg {
    Arg::new("require_one")
        .long("require-one")
        .value_name("TYPE")
        .action(ArgAction::Append)
        .value_parser(parse_descriptor_type)
        .help("Require exactly one descriptor of TYPE (e.g. 0x01)")
}

/// Descriptor type as decimal or `0x` hex.
pub fn parse_descriptor_type(text: &str) -> Result<u8, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => text.parse::<u8>(),
    };
    parsed.map_err(|_| format!("`{text}` is not a descriptor type (0..=255 or 0x00..=0xff)"))
}

/// Dump the registry instead of the tree (--registry).
pub fn registry_arg() -> Arg {
    Arg::new("registry")
        .long("registry")
        .action(ArgAction::SetTrue)
        .help("Show per-type descriptor indices instead of the content tree")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Verbosity level (-v, -vv, -vvv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .help("Verbosity level (-v info, -vv debug, -vvv trace)")
}
