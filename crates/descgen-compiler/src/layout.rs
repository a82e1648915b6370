//! Byte lengths and descriptor selections.
//!
//! Lengths never depend on resolved values, only on the forest and the
//! registry, so they can be computed at any point after indexing. Every walk
//! into another descriptor goes through `enter`, which rejects a descriptor
//! that (transitively) contains itself.

use indexmap::IndexSet;

use crate::registry::{DescriptorId, Registry};
use crate::tree::{Forest, NodeId, NodeKind};
use crate::value::{ByteValue, Value};
use crate::{Error, Result};

#[derive(Clone, Copy)]
pub(crate) struct Layout<'a> {
    pub forest: &'a Forest,
    pub registry: &'a Registry,
}

/// Descriptors currently being walked, outermost first.
pub(crate) type Stack = Vec<DescriptorId>;

impl<'a> Layout<'a> {
    pub fn new(forest: &'a Forest, registry: &'a Registry) -> Self {
        Self { forest, registry }
    }

    /// Descriptors selected by a `count`, `foreach`, or `children` node, in
    /// index order.
    pub fn selection(&self, node: NodeId) -> Vec<DescriptorId> {
        let n = self.forest.node(node);
        let owner = self.registry.get(n.owner).id.as_deref();
        match n.kind {
            NodeKind::Children { descriptor_type } => {
                self.registry.children_of(descriptor_type, owner)
            }
            NodeKind::Count {
                descriptor_type,
                associated,
                ..
            }
            | NodeKind::Foreach {
                descriptor_type,
                associated,
                ..
            } => {
                if associated {
                    self.registry.children_of(descriptor_type, owner)
                } else {
                    self.registry.of_type(descriptor_type).to_vec()
                }
            }
            _ => Vec::new(),
        }
    }

    /// Descriptors a `foreach` emits: its selection minus descriptors with
    /// nothing to echo and, when `unique`, repeats of an earlier echo.
    pub fn foreach_members(&self, node: NodeId) -> Vec<DescriptorId> {
        let NodeKind::Foreach { unique, .. } = self.forest.node(node).kind else {
            return Vec::new();
        };
        let names = self.echo_names(node);

        let mut seen: IndexSet<Vec<ByteValue>> = IndexSet::new();
        let mut members = Vec::new();
        for descriptor in self.selection(node) {
            let echoed: Vec<NodeId> = names
                .iter()
                .flat_map(|name| self.named_children(descriptor, name))
                .collect();
            if echoed.is_empty() {
                continue;
            }
            if unique {
                // Only compile-time bytes can be compared; anything else is kept.
                let key: Option<Vec<ByteValue>> = echoed
                    .iter()
                    .map(|&n| self.static_bytes(n))
                    .collect::<Option<Vec<_>>>()
                    .map(|parts| parts.concat());
                if let Some(key) = key {
                    if !seen.insert(key) {
                        continue;
                    }
                }
            }
            members.push(descriptor);
        }
        members
    }

    /// Names listed by the `echo` children of a `foreach`.
    pub fn echo_names(&self, foreach: NodeId) -> Vec<&'a str> {
        self.forest
            .children(foreach)
            .filter_map(|(_, child)| match &child.kind {
                NodeKind::Echo { name } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Direct children of a descriptor carrying `name`, in document order.
    pub fn named_children(&self, descriptor: DescriptorId, name: &str) -> Vec<NodeId> {
        let node = self.forest.descriptor_node(descriptor);
        self.forest
            .children(node)
            .filter(|(_, child)| child.name.as_deref() == Some(name))
            .map(|(id, _)| id)
            .collect()
    }

    /// Bytes of a node whose value is fixed before resolution.
    pub fn static_bytes(&self, node: NodeId) -> Option<Vec<ByteValue>> {
        let n = self.forest.node(node);
        match &n.kind {
            NodeKind::Hidden { value, size } => Some(value.bytes(*size)),
            NodeKind::Byte(value) => Some(value.bytes(1)),
            NodeKind::Word(value) => Some(value.bytes(2)),
            NodeKind::StringConst(bytes) => {
                Some(bytes.iter().copied().map(ByteValue::Literal).collect())
            }
            NodeKind::TypeField { size } => {
                let t = self.registry.get(n.owner).descriptor_type;
                Some(Value::Literal(u64::from(t)).bytes(*size))
            }
            _ => None,
        }
    }

    /// Value of a `length` node: the bytes of every other child of its
    /// descriptor, leaving out `children` blocks unless `all` is set.
    pub fn length_value(&self, node: NodeId) -> Result<usize> {
        let n = self.forest.node(node);
        let NodeKind::Length { count_all, .. } = n.kind else {
            return Ok(0);
        };
        let mut stack = Stack::new();
        self.enter(n.owner, &mut stack)?;
        let descriptor = self.forest.descriptor_node(n.owner);
        let mut total = 0;
        for (sibling, child) in self.forest.children(descriptor) {
            if sibling == node || (!count_all && matches!(child.kind, NodeKind::Children { .. })) {
                continue;
            }
            total += self.node_len(sibling, &mut stack)?;
        }
        Ok(total)
    }

    /// Rendered size of a whole descriptor.
    pub fn descriptor_len(&self, descriptor: DescriptorId, stack: &mut Stack) -> Result<usize> {
        self.enter(descriptor, stack)?;
        let node = self.forest.descriptor_node(descriptor);
        let mut total = 0;
        for &child in &self.forest.node(node).children {
            total += self.node_len(child, stack)?;
        }
        stack.pop();
        Ok(total)
    }

    pub fn node_len(&self, node: NodeId, stack: &mut Stack) -> Result<usize> {
        let n = self.forest.node(node);
        let len = match &n.kind {
            NodeKind::Descriptor(_) => self.descriptor_len(n.owner, stack)?,
            NodeKind::Hidden { .. } | NodeKind::Echo { .. } | NodeKind::Raw(_) => 0,
            NodeKind::Byte(_) | NodeKind::Endpoint { .. } => 1,
            NodeKind::Word(_) => 2,
            NodeKind::StringConst(bytes) => bytes.len(),
            NodeKind::Length { size, .. }
            | NodeKind::TypeField { size }
            | NodeKind::IndexField { size }
            | NodeKind::Ref { size, .. }
            | NodeKind::Count { size, .. } => usize::from(*size),
            NodeKind::Children { .. } => {
                let mut total = 0;
                for descriptor in self.selection(node) {
                    total += self.descriptor_len(descriptor, stack)?;
                }
                total
            }
            NodeKind::Foreach { .. } => {
                let names = self.echo_names(node);
                let mut total = 0;
                for descriptor in self.foreach_members(node) {
                    for name in &names {
                        for echoed in self.named_children(descriptor, name) {
                            total += self.echo_len(descriptor, echoed, stack)?;
                        }
                    }
                }
                total
            }
        };
        Ok(len)
    }

    /// Size of a node echoed out of `from`. Hidden values appear here and
    /// only here.
    pub fn echo_len(&self, from: DescriptorId, node: NodeId, stack: &mut Stack) -> Result<usize> {
        match self.forest.node(node).kind {
            NodeKind::Hidden { size, .. } => Ok(usize::from(size)),
            NodeKind::Foreach { .. } | NodeKind::Children { .. } => {
                self.enter(from, stack)?;
                let len = self.node_len(node, stack)?;
                stack.pop();
                Ok(len)
            }
            _ => self.node_len(node, stack),
        }
    }

    pub fn enter(&self, descriptor: DescriptorId, stack: &mut Stack) -> Result<()> {
        if stack.contains(&descriptor) {
            let entry = self.registry.get(descriptor);
            return Err(Error::ReferenceCycle {
                descriptor: entry.label(),
                location: entry.location,
            });
        }
        stack.push(descriptor);
        Ok(())
    }
}
