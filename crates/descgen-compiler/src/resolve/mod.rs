//! Deferred resolution.
//!
//! Runs once every descriptor is indexed. Visits descriptors in discovery
//! order, each node before its children, and fills one slot per node. Endpoint
//! addresses are handed out in that same order.

#[cfg(test)]
mod resolve_tests;

use crate::layout::Layout;
use crate::registry::{DescriptorId, EndpointAllocator, IN_DIRECTION, Registry};
use crate::tree::{Direction, Forest, NodeId, NodeKind};
use crate::value::fits;
use crate::{Error, Result};

/// Resolution slot of one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Pending,
    /// Nothing to resolve; the node's bytes are fixed by its markup.
    Static,
    Value(u64),
    Matched(Vec<DescriptorId>),
    Address(u8),
}

/// Resolution slots for every node of a forest, indexed by `NodeId`.
#[derive(Clone, Debug)]
pub struct Resolutions {
    slots: Vec<Resolution>,
    endpoints_allocated: u8,
}

impl Resolutions {
    fn new(len: usize) -> Self {
        Self {
            slots: vec![Resolution::Pending; len],
            endpoints_allocated: 0,
        }
    }

    fn set(&mut self, node: NodeId, resolution: Resolution) {
        let slot = &mut self.slots[node.index()];
        debug_assert_eq!(*slot, Resolution::Pending, "node {node:?} resolved twice");
        *slot = resolution;
    }

    pub fn get(&self, node: NodeId) -> &Resolution {
        &self.slots[node.index()]
    }

    pub fn value(&self, node: NodeId) -> Option<u64> {
        match self.get(node) {
            Resolution::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn matched(&self, node: NodeId) -> &[DescriptorId] {
        match self.get(node) {
            Resolution::Matched(ids) => ids,
            _ => &[],
        }
    }

    pub fn address(&self, node: NodeId) -> Option<u8> {
        match self.get(node) {
            Resolution::Address(a) => Some(*a),
            _ => None,
        }
    }

    /// Endpoint numbers handed out during resolution.
    pub fn endpoints_allocated(&self) -> u8 {
        self.endpoints_allocated
    }

    pub fn is_complete(&self) -> bool {
        !self.slots.contains(&Resolution::Pending)
    }
}

/// Resolve every node of an indexed forest.
pub fn resolve(forest: &Forest, registry: &Registry) -> Result<Resolutions> {
    let mut resolver = Resolver {
        layout: Layout::new(forest, registry),
        endpoints: registry.endpoint_allocator(),
        out: Resolutions::new(forest.len()),
    };
    for (_, node) in forest.descriptors() {
        resolver.visit(node)?;
    }
    resolver.out.endpoints_allocated = resolver.endpoints.allocated();
    debug_assert!(resolver.out.is_complete(), "every node is reachable from a descriptor");
    Ok(resolver.out)
}

struct Resolver<'a> {
    layout: Layout<'a>,
    endpoints: EndpointAllocator,
    out: Resolutions,
}

impl Resolver<'_> {
    fn visit(&mut self, node: NodeId) -> Result<()> {
        let resolution = self.resolve_node(node)?;
        self.out.set(node, resolution);
        let forest = self.layout.forest;
        for &child in &forest.node(node).children {
            self.visit(child)?;
        }
        Ok(())
    }

    fn resolve_node(&mut self, node: NodeId) -> Result<Resolution> {
        let forest = self.layout.forest;
        let registry = self.layout.registry;
        let n = forest.node(node);
        let owner = registry.get(n.owner);

        let resolution = match &n.kind {
            NodeKind::Descriptor(_) => Resolution::Value(u64::from(owner.index)),
            NodeKind::Hidden { .. }
            | NodeKind::Byte(_)
            | NodeKind::Word(_)
            | NodeKind::StringConst(_)
            | NodeKind::Echo { .. }
            | NodeKind::Raw(_) => Resolution::Static,
            NodeKind::Length { size, .. } => {
                let len = self.layout.length_value(node)? as u64;
                self.sized(node, "length", len, *size)?
            }
            NodeKind::TypeField { size } => {
                self.sized(node, "type", u64::from(owner.descriptor_type), *size)?
            }
            NodeKind::IndexField { size } => {
                self.sized(node, "index", u64::from(owner.index), *size)?
            }
            NodeKind::Ref {
                target,
                expected_type,
                size,
            } => {
                let Some(found) = registry.by_id(target) else {
                    return Err(Error::MissingReference {
                        id: target.clone(),
                        location: n.location,
                    });
                };
                let entry = registry.get(found);
                if let Some(expected) = *expected_type {
                    if expected != entry.descriptor_type {
                        return Err(Error::ReferenceTypeMismatch {
                            id: target.clone(),
                            expected,
                            actual: entry.descriptor_type,
                            location: n.location,
                        });
                    }
                }
                self.sized(node, "ref", u64::from(entry.index), *size)?
            }
            NodeKind::Count { size, .. } => {
                let count = self.layout.selection(node).len() as u64;
                self.sized(node, "count", count, *size)?
            }
            NodeKind::Children { .. } => Resolution::Matched(self.layout.selection(node)),
            NodeKind::Foreach { .. } => Resolution::Matched(self.layout.foreach_members(node)),
            NodeKind::Endpoint { direction, .. } => {
                let Some(number) = self.endpoints.reserve() else {
                    return Err(Error::EndpointsExhausted {
                        max: self.endpoints.max(),
                        location: n.location,
                    });
                };
                let address = match direction {
                    Direction::In => number | IN_DIRECTION,
                    Direction::Out => number,
                };
                log::debug!(
                    "endpoint {} in {} -> {address:#04x}",
                    n.name.as_deref().unwrap_or(direction.tag_name()),
                    owner.label()
                );
                Resolution::Address(address)
            }
        };
        Ok(resolution)
    }

    fn sized(&self, node: NodeId, what: &str, value: u64, size: u8) -> Result<Resolution> {
        if !fits(value, size) {
            return Err(Error::ValueOutOfRange {
                what: what.to_string(),
                value,
                size,
                location: self.layout.forest.node(node).location,
            });
        }
        Ok(Resolution::Value(value))
    }
}
