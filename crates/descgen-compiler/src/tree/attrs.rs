//! Typed access to element attributes, with errors pointing at the element.

use descgen_core::Element;

use crate::value::{Value, fits, parse_int};
use crate::{Error, Result};

/// Widths accepted by `size` attributes.
const MAX_FIELD_SIZE: u8 = 4;

pub(super) struct Attrs<'e> {
    el: &'e Element,
}

impl<'e> Attrs<'e> {
    pub fn new(el: &'e Element) -> Self {
        Self { el }
    }

    pub fn optional(&self, name: &str) -> Option<&'e str> {
        self.el.attr(name).map(str::trim)
    }

    pub fn required(&self, name: &str) -> Result<&'e str> {
        self.optional(name).ok_or_else(|| Error::MissingAttribute {
            tag: self.el.tag.clone(),
            attribute: name.to_string(),
            location: self.el.location,
        })
    }

    /// A present attribute is true unless it spells out false.
    pub fn flag(&self, name: &str) -> Result<bool> {
        Ok(self.explicit_flag(name)?.unwrap_or(false))
    }

    pub fn explicit_flag(&self, name: &str) -> Result<Option<bool>> {
        let Some(raw) = self.optional(name) else {
            return Ok(None);
        };
        let lower = raw.to_ascii_lowercase();
        match lower.as_str() {
            "" | "1" | "true" | "yes" => Ok(Some(true)),
            "0" | "false" | "no" => Ok(Some(false)),
            // `unique="unique"`, HTML style
            other if other == name.to_ascii_lowercase() => Ok(Some(true)),
            _ => Err(self.invalid(name, raw, "expected true or false")),
        }
    }

    pub fn int(&self, name: &str, max: u64) -> Result<Option<u64>> {
        let Some(raw) = self.optional(name) else {
            return Ok(None);
        };
        match parse_int(raw) {
            Some(v) if v <= max => Ok(Some(v)),
            Some(_) => Err(self.invalid(name, raw, &format!("must be at most {max:#x}"))),
            None => Err(self.invalid(name, raw, "expected an integer")),
        }
    }

    pub fn descriptor_type(&self, name: &str) -> Result<u8> {
        self.required(name)?;
        let v = self.int(name, u64::from(u8::MAX))?.unwrap_or_default();
        Ok(v as u8)
    }

    pub fn optional_descriptor_type(&self, name: &str) -> Result<Option<u8>> {
        Ok(self.int(name, u64::from(u8::MAX))?.map(|v| v as u8))
    }

    /// Field width in bytes, 1 through 4.
    pub fn size(&self, default: u8) -> Result<u8> {
        let Some(raw) = self.optional("size") else {
            return Ok(default);
        };
        match parse_int(raw) {
            Some(v) if (1..=u64::from(MAX_FIELD_SIZE)).contains(&v) => Ok(v as u8),
            _ => Err(self.invalid("size", raw, "expected a width from 1 to 4")),
        }
    }

    /// The element text as a value of `width` bytes.
    pub fn value(&self, width: u8) -> Result<Value> {
        let text = self.el.trimmed_text();
        if text.is_empty() {
            return Err(self.invalid("value", text, "element has no value text"));
        }
        let value = Value::parse(text);
        match value.as_literal() {
            Some(v) if !fits(v, width) => Err(Error::ValueOutOfRange {
                what: format!("`<{}>`", self.el.tag),
                value: v,
                size: width,
                location: self.el.location,
            }),
            _ => Ok(value),
        }
    }

    fn invalid(&self, attribute: &str, value: &str, reason: &str) -> Error {
        Error::InvalidAttribute {
            tag: self.el.tag.clone(),
            attribute: attribute.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
            location: self.el.location,
        }
    }
}
