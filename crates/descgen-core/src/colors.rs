//! ANSI color codes for terminal output.
//!
//! Three roles plus reset:
//! - Blue: descriptor ids and field names
//! - Green: resolved values and emitted bytes
//! - Dim: structure (kinds, markers, locations)

/// ANSI palette for CLI dumps. Only standard 16-color codes.
#[derive(Clone, Copy, Debug)]
pub struct Colors {
    pub name: &'static str,
    pub value: &'static str,
    pub dim: &'static str,
    pub reset: &'static str,
}

impl Default for Colors {
    fn default() -> Self {
        Self::OFF
    }
}

impl Colors {
    pub const ON: Self = Self {
        name: "\x1b[34m",
        value: "\x1b[32m",
        dim: "\x1b[2m",
        reset: "\x1b[0m",
    };

    pub const OFF: Self = Self {
        name: "",
        value: "",
        dim: "",
        reset: "",
    };

    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ON } else { Self::OFF }
    }

    pub fn is_enabled(&self) -> bool {
        !self.name.is_empty()
    }
}
