//! Comment fragment extraction.
//!
//! Markup lives in block comments whose `/*` and `*/` delimiters sit on their
//! own lines:
//!
//! ```text
//! /**
//!  * <descriptor id="device" type="0x01">
//!  *  <length name="bLength" />
//!  * </descriptor>
//!  */
//! ```
//!
//! The delimiter lines contribute no text. Every line in between loses its
//! leading whitespace and leading `*` characters, so fragment lines map 1:1 to
//! source lines starting at [`Fragment::line`].

use crate::source_map::{Source, SourceId};

/// Text of one block comment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    pub source: SourceId,
    /// 1-based source line of the first fragment line.
    pub line: usize,
    pub text: String,
}

impl Fragment {
    /// Source line of the fragment line at `offset` (0-based).
    pub fn source_line(&self, offset: usize) -> usize {
        self.line + offset
    }
}

/// Extract every non-empty block comment body from a source, in order.
pub fn extract_fragments(source: &Source<'_>) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut gathered: Option<(usize, String)> = None;

    for (idx, line) in source.content.lines().enumerate() {
        let stripped = line.trim_start();

        let Some((start, text)) = gathered.as_mut() else {
            if stripped.starts_with("/*") {
                // `/* ... */` on a single line carries no markup
                let single = stripped.len() >= 4 && stripped.trim_end().ends_with("*/");
                if !single {
                    gathered = Some((idx + 2, String::new()));
                }
            }
            continue;
        };

        if stripped.trim_end().ends_with("*/") {
            if !text.trim().is_empty() {
                fragments.push(Fragment {
                    source: source.id,
                    line: *start,
                    text: std::mem::take(text),
                });
            }
            gathered = None;
            continue;
        }

        text.push_str(stripped.trim_start_matches('*'));
        text.push('\n');
    }

    if gathered.is_some() {
        log::warn!("{}: unterminated block comment ignored", source.name());
    }

    fragments
}
