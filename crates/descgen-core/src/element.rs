//! Generic element tree parsed from comment fragments.
//!
//! A fragment holds zero or more sibling elements. It is wrapped in a synthetic
//! root element and handed to `quick-xml`; the root's children are returned.

use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::fragment::Fragment;
use crate::source_map::{SourceId, SourceMap};
use crate::{ContextLine, MarkupError};

const ROOT_OPEN: &str = "<root>";
const ROOT_CLOSE: &str = "</root>";

/// Lines shown on each side of a syntax error.
const CONTEXT_RADIUS: usize = 3;

/// Where an element starts in its source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Location {
    pub source: SourceId,
    /// 1-based line.
    pub line: usize,
}

/// One tagged node of markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: IndexMap<String, String>,
    /// Text and CDATA directly inside the element, concatenated.
    pub text: Option<String>,
    pub children: Vec<Element>,
    pub location: Location,
}

impl Element {
    pub fn new(tag: impl Into<String>, location: Location) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
            location,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Text with surrounding whitespace removed; empty when there is none.
    pub fn trimmed_text(&self) -> &str {
        self.text.as_deref().map(str::trim).unwrap_or_default()
    }

    fn push_text(&mut self, text: &str) {
        self.text.get_or_insert_with(String::new).push_str(text);
    }
}

/// Parse one fragment into its root-level elements.
pub fn parse_fragment(
    sources: &SourceMap,
    fragment: &Fragment,
) -> Result<Vec<Element>, MarkupError> {
    let wrapped = format!("{ROOT_OPEN}{}{ROOT_CLOSE}", fragment.text);
    let mut reader = Reader::from_str(&wrapped);
    reader.trim_text(false);

    let fail = |pos: usize, message: String| syntax_error(sources, fragment, pos, message);
    let mut stack: Vec<Element> = Vec::new();
    let mut document: Option<Element> = None;

    loop {
        let pos = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|err| fail(reader.buffer_position(), err.to_string()))?;

        match event {
            Event::Start(start) => {
                let element = open_element(&start, fragment, pos).map_err(|msg| fail(pos, msg))?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(&start, fragment, pos).map_err(|msg| fail(pos, msg))?;
                close_element(&mut stack, &mut document, element);
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(fail(pos, "unexpected closing tag".to_owned()));
                };
                close_element(&mut stack, &mut document, element);
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|err| fail(pos, err.to_string()))?;
                match stack.last_mut() {
                    Some(top) => top.push_text(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(fail(pos, "text outside of any element".to_owned())),
                }
            }
            Event::CData(data) => {
                let data = data.into_inner();
                if let Some(top) = stack.last_mut() {
                    top.push_text(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            // comments, processing instructions, declarations
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        let message = format!("unclosed element `<{}>`", open.tag);
        return Err(fail(wrapped.len(), message));
    }

    Ok(document.map(|root| root.children).unwrap_or_default())
}

/// Parse every fragment of every source, in source order then document order.
pub fn read_elements(sources: &SourceMap) -> Result<Vec<Element>, MarkupError> {
    let mut elements = Vec::new();
    for source in sources.iter() {
        for fragment in crate::extract_fragments(&source) {
            elements.extend(parse_fragment(sources, &fragment)?);
        }
    }
    Ok(elements)
}

fn open_element(
    start: &BytesStart<'_>,
    fragment: &Fragment,
    pos: usize,
) -> Result<Element, String> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let location = Location {
        source: fragment.source,
        line: fragment.source_line(fragment_line(fragment, pos)),
    };
    let mut element = Element::new(tag, location);

    for attr in start.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|err| err.to_string())?;
        element.attributes.insert(key, value.into_owned());
    }

    Ok(element)
}

fn close_element(stack: &mut [Element], document: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *document = Some(element),
    }
}

/// 0-based fragment line containing byte `pos` of the wrapped text.
fn fragment_line(fragment: &Fragment, pos: usize) -> usize {
    let offset = pos.saturating_sub(ROOT_OPEN.len()).min(fragment.text.len());
    fragment.text.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
}

fn syntax_error(
    sources: &SourceMap,
    fragment: &Fragment,
    pos: usize,
    message: String,
) -> MarkupError {
    let last_line = fragment.text.lines().count().saturating_sub(1);
    let error_line = fragment_line(fragment, pos).min(last_line);
    let first = error_line.saturating_sub(CONTEXT_RADIUS);
    let context = fragment
        .text
        .lines()
        .enumerate()
        .skip(first)
        .take(error_line - first + CONTEXT_RADIUS + 1)
        .map(|(idx, text)| ContextLine {
            number: fragment.source_line(idx),
            text: text.trim_end().to_owned(),
        })
        .collect();

    MarkupError::Syntax {
        path: sources.name(fragment.source).to_owned(),
        line: fragment.source_line(error_line),
        message,
        context,
        fragment: fragment.text.clone(),
    }
}
