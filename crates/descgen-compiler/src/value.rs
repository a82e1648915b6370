//! Field values and the bytes they emit.
//!
//! A value is either a literal known at compile time or a C expression that
//! the C compiler evaluates later. Expressions are split into bytes with
//! shifts and masks so they still land little-endian in the buffer.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    Literal(u64),
    Expr(String),
}

impl Value {
    /// Interpret markup text: integers become literals, anything else is passed
    /// through as a C expression.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match parse_int(text) {
            Some(v) => Value::Literal(v),
            None => Value::Expr(text.to_string()),
        }
    }

    /// Little-endian bytes of this value, `width` of them.
    pub fn bytes(&self, width: u8) -> Vec<ByteValue> {
        (0..width)
            .map(|i| match self {
                Value::Literal(v) => ByteValue::Literal((v >> (8 * u32::from(i))) as u8),
                Value::Expr(expr) => ByteValue::Expr {
                    expr: expr.clone(),
                    shift: 8 * i,
                },
            })
            .collect()
    }

    pub fn as_literal(&self) -> Option<u64> {
        match self {
            Value::Literal(v) => Some(*v),
            Value::Expr(_) => None,
        }
    }
}

/// One byte of emitted descriptor data.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ByteValue {
    Literal(u8),
    /// `(expr >> shift) & 0xFF`, evaluated by the C compiler.
    Expr { expr: String, shift: u8 },
}

impl fmt::Display for ByteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteValue::Literal(b) => write!(f, "0x{b:02x}"),
            ByteValue::Expr { expr, shift: 0 } => write!(f, "(({expr}) & 0xff)"),
            ByteValue::Expr { expr, shift } => write!(f, "((({expr}) >> {shift}) & 0xff)"),
        }
    }
}

/// Whether `value` fits in `size` little-endian bytes.
pub fn fits(value: u64, size: u8) -> bool {
    size >= 8 || value >> (8 * u32::from(size)) == 0
}

/// Parse a decimal, `0x` hex, or `0b` binary integer.
pub fn parse_int(text: &str) -> Option<u64> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).ok();
    }
    if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        return u64::from_str_radix(bin, 2).ok();
    }
    if text.starts_with('+') {
        return None;
    }
    text.parse().ok()
}

/// Little-endian UTF-16 encoding used by USB string descriptors.
pub fn utf16_le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}
