//! Node schema: which tag builds which node, and what may nest inside it.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Every node kind the markup can spell, plus the `include` directive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeTag {
    Descriptor,
    Include,
    Hidden,
    Byte,
    Word,
    String,
    Length,
    Type,
    Index,
    Ref,
    Count,
    Foreach,
    Echo,
    Children,
    InEndpoint,
    OutEndpoint,
    Raw,
}

#[derive(Debug)]
pub struct SchemaEntry {
    pub tag: &'static str,
    pub node: NodeTag,
    /// Tags legal as direct children.
    pub children: &'static [NodeTag],
}

/// Tags allowed directly in a comment fragment.
pub const ROOT_CHILDREN: &[NodeTag] = &[NodeTag::Descriptor, NodeTag::Include];

/// Name used for the fragment root in diagnostics.
pub const ROOT_NAME: &str = "comment";

const DESCRIPTOR_CHILDREN: &[NodeTag] = &[
    NodeTag::Hidden,
    NodeTag::Byte,
    NodeTag::Word,
    NodeTag::String,
    NodeTag::Length,
    NodeTag::Type,
    NodeTag::Index,
    NodeTag::Ref,
    NodeTag::Count,
    NodeTag::Foreach,
    NodeTag::Children,
    NodeTag::InEndpoint,
    NodeTag::OutEndpoint,
    NodeTag::Raw,
];

const NO_CHILDREN: &[NodeTag] = &[];

pub static SCHEMA: &[SchemaEntry] = &[
    SchemaEntry {
        tag: "descriptor",
        node: NodeTag::Descriptor,
        children: DESCRIPTOR_CHILDREN,
    },
    SchemaEntry {
        tag: "include",
        node: NodeTag::Include,
        children: NO_CHILDREN,
    },
    SchemaEntry {
        tag: "hidden",
        node: NodeTag::Hidden,
        children: NO_CHILDREN,
    },
    SchemaEntry {
        tag: "byte",
        node: NodeTag::Byte,
        children: NO_CHILDREN,
    },
    SchemaEntry {
        tag: "word",
        node: NodeTag::Word,
        children: NO_CHILDREN,
    },
    SchemaEntry {
        tag: "string",
        node: NodeTag::String,
        children: NO_CHILDREN,
    },
    SchemaEntry {
        tag: "length",
        node: NodeTag::Length,
        children: NO_CHILDREN,
    },
    SchemaEntry {
        tag: "type",
        node: NodeTag::Type,
        children: NO_CHILDREN,
    },
    SchemaEntry {
        tag: "index",
        node: NodeTag::Index,
        children: NO_CHILDREN,
    },
    SchemaEntry {
        tag: "ref",
        node: NodeTag::Ref,
        children: NO_CHILDREN,
    },
    SchemaEntry {
        tag: "count",
        node: NodeTag::Count,
        children: NO_CHILDREN,
    },
    SchemaEntry {
        tag: "foreach",
        node: NodeTag::Foreach,
        children: &[NodeTag::Echo],
    },
    SchemaEntry {
        tag: "echo",
        node: NodeTag::Echo,
        children: NO_CHILDREN,
    },
    SchemaEntry {
        tag: "children",
        node: NodeTag::Children,
        children: NO_CHILDREN,
    },
    SchemaEntry {
        tag: "inendpoint",
        node: NodeTag::InEndpoint,
        children: NO_CHILDREN,
    },
    SchemaEntry {
        tag: "outendpoint",
        node: NodeTag::OutEndpoint,
        children: NO_CHILDREN,
    },
    SchemaEntry {
        tag: "raw",
        node: NodeTag::Raw,
        children: NO_CHILDREN,
    },
];

static BY_TAG: LazyLock<HashMap<&'static str, &'static SchemaEntry>> =
    LazyLock::new(|| SCHEMA.iter().map(|entry| (entry.tag, entry)).collect());

/// Find the schema entry for a tag name.
pub fn lookup(tag: &str) -> Option<&'static SchemaEntry> {
    BY_TAG.get(tag).copied()
}

impl NodeTag {
    pub fn entry(self) -> &'static SchemaEntry {
        SCHEMA
            .iter()
            .find(|entry| entry.node == self)
            .expect("every NodeTag has a schema entry")
    }

    pub fn tag_name(self) -> &'static str {
        self.entry().tag
    }

    /// Whether `child` may appear directly inside this node.
    pub fn allows(self, child: NodeTag) -> bool {
        self.entry().children.contains(&child)
    }
}
