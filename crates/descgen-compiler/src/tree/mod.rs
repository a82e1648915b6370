//! Content tree: schema-checked nodes built from the element tree.
//!
//! Nodes live in one arena (`Forest`) and refer to each other by `NodeId`.
//! Every node knows the descriptor it belongs to, so later passes never walk
//! upward through parent pointers.

mod attrs;
mod builder;


use descgen_core::Location;

use crate::registry::DescriptorId;
use crate::value::Value;

pub use builder::build_forest;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn tag_name(self) -> &'static str {
        match self {
            Direction::In => "inendpoint",
            Direction::Out => "outendpoint",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptorNode {
    pub descriptor_type: u8,
    /// Id of the descriptor this one nests under, if any.
    pub parent_id: Option<String>,
    /// Gets its own row in the descriptor table.
    pub top: bool,
    /// Indexed ahead of other descriptors of its type.
    pub first: bool,
    pub windex: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Descriptor(DescriptorNode),
    /// Named value that only shows up when echoed.
    Hidden { value: Value, size: u8 },
    Byte(Value),
    Word(Value),
    /// UTF-16LE payload.
    StringConst(Vec<u8>),
    Length { size: u8, count_all: bool },
    TypeField { size: u8 },
    IndexField { size: u8 },
    Ref { target: String, expected_type: Option<u8>, size: u8 },
    Count { descriptor_type: u8, associated: bool, size: u8 },
    Foreach { descriptor_type: u8, associated: bool, unique: bool },
    Echo { name: String },
    Children { descriptor_type: u8 },
    Endpoint { direction: Direction, define: Option<String> },
    /// Verbatim C passed through to the buffer.
    Raw(String),
}

impl NodeKind {
    pub fn tag_name(&self) -> &'static str {
        match self {
            NodeKind::Descriptor(_) => "descriptor",
            NodeKind::Hidden { .. } => "hidden",
            NodeKind::Byte(_) => "byte",
            NodeKind::Word(_) => "word",
            NodeKind::StringConst(_) => "string",
            NodeKind::Length { .. } => "length",
            NodeKind::TypeField { .. } => "type",
            NodeKind::IndexField { .. } => "index",
            NodeKind::Ref { .. } => "ref",
            NodeKind::Count { .. } => "count",
            NodeKind::Foreach { .. } => "foreach",
            NodeKind::Echo { .. } => "echo",
            NodeKind::Children { .. } => "children",
            NodeKind::Endpoint { direction, .. } => direction.tag_name(),
            NodeKind::Raw(_) => "raw",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentNode {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Descriptor this node belongs to. A descriptor owns itself.
    pub owner: DescriptorId,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
    pub location: Location,
}

impl ContentNode {
    pub fn as_descriptor(&self) -> Option<&DescriptorNode> {
        match &self.kind {
            NodeKind::Descriptor(d) => Some(d),
            _ => None,
        }
    }

    /// Label used in diagnostics and dumps: id, then name, then tag.
    pub fn label(&self) -> &str {
        self.id
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(self.kind.tag_name())
    }
}

/// All content nodes of one compilation run.
#[derive(Clone, Debug, Default)]
pub struct Forest {
    nodes: Vec<ContentNode>,
    /// Descriptor nodes in discovery order, indexed by `DescriptorId`.
    descriptors: Vec<NodeId>,
    includes: Vec<String>,
}

impl Forest {
    pub fn node(&self, id: NodeId) -> &ContentNode {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in construction order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ContentNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &ContentNode)> {
        self.node(id)
            .children
            .iter()
            .map(|&child| (child, self.node(child)))
    }

    pub fn descriptor_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Descriptor nodes in discovery order.
    pub fn descriptors(&self) -> impl Iterator<Item = (DescriptorId, NodeId)> + '_ {
        self.descriptors
            .iter()
            .enumerate()
            .map(|(i, &node)| (DescriptorId::new(i), node))
    }

    pub fn descriptor_node(&self, id: DescriptorId) -> NodeId {
        self.descriptors[id.index()]
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    fn push(&mut self, node: ContentNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn node_mut(&mut self, id: NodeId) -> &mut ContentNode {
        &mut self.nodes[id.index()]
    }
}
