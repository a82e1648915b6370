//! Helpers shared by the compiler's unit tests.

use crate::stages::{CompileBuilder, Indexed, Parsed, Resolved};
use crate::Error;

/// Wrap bare markup in a block comment, one markup line per comment line.
///
/// Markup line `n` ends up on source line `n + 1`.
pub fn comment(markup: &str) -> String {
    let mut out = String::from("/*\n");
    for line in markup.lines() {
        out.push_str(" * ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(" */\n");
    out
}

pub fn parse(markup: &str) -> Parsed {
    CompileBuilder::inline(&comment(markup))
        .parse()
        .expect("markup parses")
}

pub fn index(markup: &str) -> Indexed {
    parse(markup).index().expect("markup indexes")
}

pub fn compile(markup: &str) -> Resolved {
    CompileBuilder::inline(&comment(markup))
        .compile()
        .expect("markup compiles")
}

pub fn compile_err(markup: &str) -> Error {
    match CompileBuilder::inline(&comment(markup)).compile() {
        Ok(_) => panic!("expected compilation to fail"),
        Err(err) => err,
    }
}

/// Literal bytes of the first buffer; panics on expression bytes.
pub fn first_buffer_bytes(resolved: &Resolved) -> Vec<u8> {
    buffer_bytes(resolved, 0)
}

pub fn buffer_bytes(resolved: &Resolved, buffer: usize) -> Vec<u8> {
    resolved.table().buffers[buffer]
        .bytes()
        .map(|b| match b {
            crate::value::ByteValue::Literal(v) => *v,
            other => panic!("expected a literal byte, found {other}"),
        })
        .collect()
}
