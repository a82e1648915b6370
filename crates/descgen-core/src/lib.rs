//! Source intake for descgen.
//!
//! Everything that happens before the descriptor compiler sees its input:
//! - `source_map` - input files in command-line order
//! - `fragment` - block comment extraction
//! - `element` - markup parsing into a generic element tree
//! - `colors` - ANSI palette shared by CLI output

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod colors;
pub mod element;
pub mod fragment;
pub mod source_map;


use std::fmt::Write;

pub use colors::Colors;
pub use element::{Element, Location, parse_fragment, read_elements};
pub use fragment::{Fragment, extract_fragments};
pub use source_map::{Source, SourceId, SourceKind, SourceMap};

/// A numbered source line shown next to a markup error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextLine {
    pub number: usize,
    pub text: String,
}

/// Errors raised while turning comment fragments into elements.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    /// The fragment is not well-formed markup.
    #[error("{path}:{line}: malformed descriptor markup: {message}\n{}", render_context(.context, .line))]
    Syntax {
        path: String,
        line: usize,
        message: String,
        context: Vec<ContextLine>,
        fragment: String,
    },
}

impl MarkupError {
    pub fn line(&self) -> usize {
        match self {
            MarkupError::Syntax { line, .. } => *line,
        }
    }
}

fn render_context(context: &[ContextLine], line: &usize) -> String {
    let width = context
        .last()
        .map(|c| c.number.to_string().len())
        .unwrap_or(1);

    let mut out = String::new();
    for ctx in context {
        let marker = if ctx.number == *line { '>' } else { ' ' };
        let _ = writeln!(out, "{marker} {:>width$} | {}", ctx.number, ctx.text);
    }
    out.truncate(out.trim_end().len());
    out
}
