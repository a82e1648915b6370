//! Resolved nodes to buffer chunks.

use crate::layout::{Layout, Stack};
use crate::registry::DescriptorId;
use crate::resolve::Resolutions;
use crate::tree::{NodeId, NodeKind};
use crate::value::{ByteValue, Value};
use crate::Result;

/// A piece of a descriptor buffer, kept structured for readable C output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Chunk {
    Field {
        name: Option<String>,
        bytes: Vec<ByteValue>,
    },
    /// Verbatim C, contributing no counted bytes.
    Raw(String),
    /// A nested descriptor pulled in by `children`.
    Nested { label: String, chunks: Vec<Chunk> },
}

impl Chunk {
    /// Every byte of this chunk, nested descriptors included.
    pub fn bytes(&self) -> Box<dyn Iterator<Item = &ByteValue> + '_> {
        match self {
            Chunk::Field { bytes, .. } => Box::new(bytes.iter()),
            Chunk::Raw(_) => Box::new(std::iter::empty()),
            Chunk::Nested { chunks, .. } => Box::new(chunks.iter().flat_map(Chunk::bytes)),
        }
    }
}

pub(crate) struct Renderer<'a> {
    pub layout: Layout<'a>,
    pub resolutions: &'a Resolutions,
}

impl Renderer<'_> {
    pub fn descriptor(&self, descriptor: DescriptorId) -> Result<Vec<Chunk>> {
        self.descriptor_in(descriptor, &mut Stack::new())
    }

    fn descriptor_in(&self, descriptor: DescriptorId, stack: &mut Stack) -> Result<Vec<Chunk>> {
        self.layout.enter(descriptor, stack)?;
        let node = self.layout.forest.descriptor_node(descriptor);
        let mut chunks = Vec::new();
        for &child in &self.layout.forest.node(node).children {
            self.node(child, stack, &mut chunks)?;
        }
        stack.pop();
        Ok(chunks)
    }

    fn node(&self, node: NodeId, stack: &mut Stack, out: &mut Vec<Chunk>) -> Result<()> {
        let n = self.layout.forest.node(node);
        let field = |bytes: Vec<ByteValue>| Chunk::Field {
            name: n.name.clone(),
            bytes,
        };

        match &n.kind {
            NodeKind::Descriptor(_) => {
                let chunks = self.descriptor_in(n.owner, stack)?;
                out.push(Chunk::Nested {
                    label: self.layout.registry.get(n.owner).label(),
                    chunks,
                });
            }
            NodeKind::Hidden { .. } | NodeKind::Echo { .. } => {}
            NodeKind::Byte(value) => out.push(field(value.bytes(1))),
            NodeKind::Word(value) => out.push(field(value.bytes(2))),
            NodeKind::StringConst(bytes) => {
                out.push(field(bytes.iter().copied().map(ByteValue::Literal).collect()));
            }
            NodeKind::Length { size, .. }
            | NodeKind::TypeField { size }
            | NodeKind::IndexField { size }
            | NodeKind::Ref { size, .. }
            | NodeKind::Count { size, .. } => {
                let value = self
                    .resolutions
                    .value(node)
                    .expect("sized fields resolve to a value");
                out.push(field(Value::Literal(value).bytes(*size)));
            }
            NodeKind::Endpoint { .. } => {
                let address = self
                    .resolutions
                    .address(node)
                    .expect("endpoints resolve to an address");
                out.push(field(vec![ByteValue::Literal(address)]));
            }
            NodeKind::Raw(text) => out.push(Chunk::Raw(text.clone())),
            NodeKind::Children { .. } => {
                for &descriptor in self.resolutions.matched(node) {
                    let chunks = self.descriptor_in(descriptor, stack)?;
                    out.push(Chunk::Nested {
                        label: self.layout.registry.get(descriptor).label(),
                        chunks,
                    });
                }
            }
            NodeKind::Foreach { .. } => {
                let names = self.layout.echo_names(node);
                for &descriptor in self.resolutions.matched(node) {
                    for name in &names {
                        for echoed in self.layout.named_children(descriptor, name) {
                            self.echo(descriptor, echoed, stack, out)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn echo(
        &self,
        from: DescriptorId,
        node: NodeId,
        stack: &mut Stack,
        out: &mut Vec<Chunk>,
    ) -> Result<()> {
        let n = self.layout.forest.node(node);
        match &n.kind {
            NodeKind::Hidden { value, size } => {
                out.push(Chunk::Field {
                    name: n.name.clone(),
                    bytes: value.bytes(*size),
                });
                Ok(())
            }
            NodeKind::Foreach { .. } | NodeKind::Children { .. } => {
                self.layout.enter(from, stack)?;
                self.node(node, stack, out)?;
                stack.pop();
                Ok(())
            }
            _ => self.node(node, stack, out),
        }
    }
}
