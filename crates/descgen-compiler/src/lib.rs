//! descgen compiler: schema, content tree, registry, resolution, and C emitter.
//!
//! Pipeline for one compilation run:
//! - `tree` - schema-checked content nodes built from the element tree
//! - `registry` - id/type indexing and endpoint allocation
//! - `resolve` - deferred values (lengths, indices, counts, endpoint addresses)
//! - `emit` - descriptor buffers, the descriptor table, and C writers
//! - `diagnostics` - error rendering
//! - `stages` - the typestate facade tying the passes together

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod diagnostics;
pub mod dump;
pub mod emit;
mod layout;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod stages;
pub mod tree;
pub mod value;

#[cfg(test)]
pub mod test_utils;

use descgen_core::{Location, MarkupError};

pub use diagnostics::DiagnosticsPrinter;
pub use emit::{DescriptorTable, TableRow};
pub use registry::{DescriptorId, EndpointAllocator, Registry};
pub use resolve::{Resolution, Resolutions};
pub use stages::{CompileBuilder, CompileConfig, Indexed, Parsed, Resolved};
pub use tree::{ContentNode, Forest, NodeId, NodeKind};

/// Errors that abort a compilation run. The first one wins; nothing is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    FragmentSyntax(#[from] MarkupError),

    #[error("unknown tag `<{tag}>`")]
    UnknownTag { tag: String, location: Location },

    #[error("`<{child}>` is not allowed inside `<{parent}>`")]
    IllegalChild {
        parent: String,
        child: String,
        location: Location,
    },

    #[error("`<descriptor>` must be at the top level of a comment, found inside `<{parent}>`")]
    DescriptorMustBeTopLevelInput { parent: String, location: Location },

    #[error("`<{tag}>` is missing required attribute `{attribute}`")]
    MissingAttribute {
        tag: String,
        attribute: String,
        location: Location,
    },

    #[error("`<{tag}>` has invalid {attribute} `{value}`: {reason}")]
    InvalidAttribute {
        tag: String,
        attribute: String,
        value: String,
        reason: String,
        location: Location,
    },

    #[error("id `{id}` is defined more than once")]
    DuplicateId {
        id: String,
        location: Location,
        previous: Location,
    },

    #[error("reference to undefined descriptor `{id}`")]
    MissingReference { id: String, location: Location },

    #[error("`{id}` is a descriptor of type {actual:#04x}, expected {expected:#04x}")]
    ReferenceTypeMismatch {
        id: String,
        expected: u8,
        actual: u8,
        location: Location,
    },

    #[error("all {max} endpoint addresses are already allocated")]
    EndpointsExhausted { max: u8, location: Location },

    #[error("descriptor `{descriptor}` contains itself")]
    ReferenceCycle {
        descriptor: String,
        location: Location,
    },

    #[error("{what} value {value} does not fit in {size} byte(s)")]
    ValueOutOfRange {
        what: String,
        value: u64,
        size: u8,
        location: Location,
    },

    #[error("expected exactly one descriptor of type {descriptor_type:#04x}, found {found}")]
    ExpectedExactlyOneOfType { descriptor_type: u8, found: usize },

    #[error("{path}: {message}")]
    Io { path: String, message: String },
}

impl Error {
    /// Source position of the offending element, when the error has one.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::UnknownTag { location, .. }
            | Error::IllegalChild { location, .. }
            | Error::DescriptorMustBeTopLevelInput { location, .. }
            | Error::MissingAttribute { location, .. }
            | Error::InvalidAttribute { location, .. }
            | Error::DuplicateId { location, .. }
            | Error::MissingReference { location, .. }
            | Error::ReferenceTypeMismatch { location, .. }
            | Error::EndpointsExhausted { location, .. }
            | Error::ReferenceCycle { location, .. }
            | Error::ValueOutOfRange { location, .. } => Some(*location),
            Error::FragmentSyntax(_)
            | Error::ExpectedExactlyOneOfType { .. }
            | Error::Io { .. } => None,
        }
    }

    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;
