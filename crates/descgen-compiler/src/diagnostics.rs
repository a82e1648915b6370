//! Builder-pattern printer for compile errors.
//!
//! Located errors are rendered as an annotated excerpt of the offending
//! source: the error line plus a few lines on each side.

use std::fmt::Write;
use std::ops::Range;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use descgen_core::{Location, MarkupError, SourceMap};

use crate::Error;

/// Lines shown on each side of the error line.
const CONTEXT_RADIUS: usize = 3;

pub struct DiagnosticsPrinter<'e, 's> {
    error: &'e Error,
    sources: Option<&'s SourceMap>,
    colored: bool,
}

impl<'e, 's> DiagnosticsPrinter<'e, 's> {
    pub fn new(error: &'e Error) -> Self {
        Self {
            error,
            sources: None,
            colored: false,
        }
    }

    pub fn sources(mut self, sources: &'s SourceMap) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        if let Error::FragmentSyntax(MarkupError::Syntax {
            path,
            line,
            message,
            context,
            ..
        }) = self.error
        {
            let Some(first) = context.first() else {
                return write!(w, "error: {}", self.error);
            };
            let lines: Vec<&str> = context.iter().map(|c| c.text.as_str()).collect();
            let excerpt = Excerpt::new(&lines, first.number, *line);
            let title = format!("malformed descriptor markup: {message}");
            let report: Vec<Group> = vec![excerpt.group(Level::ERROR, true, &title, path, message)];
            return write!(w, "{}", renderer.render(&report));
        }

        let (Some(sources), Some(location)) = (self.sources, self.error.location()) else {
            return write!(w, "error: {}", self.error);
        };

        let message = self.error.to_string();
        let path = sources.name(location.source);
        let excerpt = excerpt_at(sources, location);
        let previous = match self.error {
            Error::DuplicateId { previous, .. } => Some(excerpt_at(sources, *previous)),
            _ => None,
        };

        let mut report: Vec<Group> =
            vec![excerpt.group(Level::ERROR, true, &message, path, &message)];
        if let (Some(excerpt), Error::DuplicateId { previous, .. }) = (&previous, self.error) {
            let note = "first defined here";
            let path = sources.name(previous.source);
            report.push(excerpt.group(Level::NOTE, false, note, path, note));
        }

        write!(w, "{}", renderer.render(&report))
    }
}

/// A window of source lines around one annotated line.
struct Excerpt {
    text: String,
    first_line: usize,
    span: Range<usize>,
}

impl Excerpt {
    fn new(lines: &[&str], first_line: usize, line: usize) -> Self {
        let mut text = String::new();
        let mut span = 0..0;
        for (i, content) in lines.iter().enumerate() {
            if first_line + i == line {
                let indent = content.len() - content.trim_start().len();
                let start = text.len() + indent;
                span = start..text.len() + content.trim_end().len();
            }
            text.push_str(content);
            text.push('\n');
        }
        if span.is_empty() {
            span = span.start..(span.start + 1).min(text.len());
        }
        Self {
            text,
            first_line,
            span,
        }
    }

    fn group<'a>(
        &'a self,
        level: Level<'a>,
        primary: bool,
        title: &'a str,
        path: &'a str,
        label: &'a str,
    ) -> Group<'a> {
        let snippet = Snippet::source(self.text.as_str())
            .line_start(self.first_line)
            .path(path)
            .annotation(AnnotationKind::Primary.span(self.span.clone()).label(label));
        if primary {
            level.primary_title(title).element(snippet)
        } else {
            level.secondary_title(title).element(snippet)
        }
    }
}

fn excerpt_at(sources: &SourceMap, location: Location) -> Excerpt {
    let source = sources.get(location.source);
    let first = location.line.saturating_sub(CONTEXT_RADIUS).max(1);
    let last = location.line + CONTEXT_RADIUS;
    let lines: Vec<&str> = (first..=last).map_while(|n| source.line(n)).collect();
    Excerpt::new(&lines, first, location.line)
}

impl Error {
    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }
}
