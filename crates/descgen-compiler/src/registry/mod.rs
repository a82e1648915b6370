//! Descriptor registry: ids, per-type indices, and top-level rows.
//!
//! Built once from the forest and read-only afterwards. Descriptors are indexed
//! in discovery order, except that `first` descriptors are indexed ahead of the
//! rest of their type.

mod endpoints;

#[cfg(test)]
mod registry_tests;

use descgen_core::Location;
use indexmap::IndexMap;

use crate::tree::{Forest, NodeId};
use crate::{Error, Result};

pub use endpoints::{EndpointAllocator, IN_DIRECTION, MAX_ENDPOINTS};

/// Position of a descriptor in discovery order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorId(u32);

impl DescriptorId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptorEntry {
    pub node: NodeId,
    pub id: Option<String>,
    pub descriptor_type: u8,
    pub parent_id: Option<String>,
    pub top: bool,
    pub windex: u16,
    /// Dense per-type index, starting at 0.
    pub index: u32,
    pub location: Location,
}

impl DescriptorEntry {
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("{:#04x}#{}", self.descriptor_type, self.index),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Registry {
    /// Indexed by `DescriptorId`.
    entries: Vec<DescriptorEntry>,
    by_id: IndexMap<String, DescriptorId>,
    /// Per type, in index order.
    by_type: IndexMap<u8, Vec<DescriptorId>>,
    /// Per type, top-level descriptors in index order.
    top: IndexMap<u8, Vec<DescriptorId>>,
    max_endpoints: u8,
}

impl Registry {
    /// Index every descriptor in the forest.
    ///
    /// Fails with `DuplicateId` when any two nodes share an id.
    pub fn index(forest: &Forest, max_endpoints: u8) -> Result<Self> {
        check_unique_ids(forest)?;

        let mut entries = Vec::with_capacity(forest.descriptor_count());
        let mut by_id = IndexMap::new();
        for (descriptor, node_id) in forest.descriptors() {
            let node = forest.node(node_id);
            let d = node
                .as_descriptor()
                .expect("descriptor list holds descriptor nodes");
            if let Some(id) = &node.id {
                by_id.insert(id.clone(), descriptor);
            }
            entries.push(DescriptorEntry {
                node: node_id,
                id: node.id.clone(),
                descriptor_type: d.descriptor_type,
                parent_id: d.parent_id.clone(),
                top: d.top,
                windex: d.windex,
                index: 0,
                location: node.location,
            });
        }

        // `first` descriptors go ahead of the others; ties keep discovery order.
        let mut order: Vec<DescriptorId> = (0..entries.len()).map(DescriptorId::new).collect();
        order.sort_by_key(|&d| {
            let node = forest.node(entries[d.index()].node);
            let first = node.as_descriptor().is_some_and(|d| d.first);
            !first
        });

        // Types keep first-seen order; `first` only reorders within a type.
        let mut by_type: IndexMap<u8, Vec<DescriptorId>> = IndexMap::new();
        let mut top: IndexMap<u8, Vec<DescriptorId>> = IndexMap::new();
        for entry in &entries {
            by_type.entry(entry.descriptor_type).or_default();
            if entry.top {
                top.entry(entry.descriptor_type).or_default();
            }
        }
        for descriptor in order {
            let entry = &mut entries[descriptor.index()];
            let of_type = by_type.entry(entry.descriptor_type).or_default();
            entry.index = of_type.len() as u32;
            of_type.push(descriptor);
            if entry.top {
                top.entry(entry.descriptor_type).or_default().push(descriptor);
            }
            log::trace!(
                "indexed {} as type {:#04x} index {}",
                entry.label(),
                entry.descriptor_type,
                entry.index
            );
        }

        log::debug!(
            "registry: {} descriptors across {} types",
            entries.len(),
            by_type.len()
        );

        Ok(Self {
            entries,
            by_id,
            by_type,
            top,
            max_endpoints,
        })
    }

    pub fn get(&self, descriptor: DescriptorId) -> &DescriptorEntry {
        &self.entries[descriptor.index()]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_id(&self, id: &str) -> Option<DescriptorId> {
        self.by_id.get(id).copied()
    }

    /// Descriptors of a type, in index order.
    pub fn of_type(&self, descriptor_type: u8) -> &[DescriptorId] {
        self.by_type
            .get(&descriptor_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Descriptors of a type declared as children of `parent`.
    ///
    /// A parent without an id cannot be named by `childof`, so it has none.
    pub fn children_of(&self, descriptor_type: u8, parent: Option<&str>) -> Vec<DescriptorId> {
        let Some(parent) = parent else {
            return Vec::new();
        };
        self.of_type(descriptor_type)
            .iter()
            .copied()
            .filter(|&d| self.get(d).parent_id.as_deref() == Some(parent))
            .collect()
    }

    /// Types with top-level descriptors, in first-seen order, each with its
    /// descriptors in index order.
    pub fn top(&self) -> impl Iterator<Item = (u8, &[DescriptorId])> {
        self.top.iter().map(|(&t, ids)| (t, ids.as_slice()))
    }

    pub fn types(&self) -> impl Iterator<Item = (u8, &[DescriptorId])> {
        self.by_type.iter().map(|(&t, ids)| (t, ids.as_slice()))
    }

    /// A fresh allocator bounded by this run's endpoint limit.
    pub fn endpoint_allocator(&self) -> EndpointAllocator {
        EndpointAllocator::new(self.max_endpoints)
    }

    /// The single descriptor of a type, for types the firmware needs exactly once.
    pub fn expect_exactly_one(&self, descriptor_type: u8) -> Result<DescriptorId> {
        match self.of_type(descriptor_type) {
            [only] => Ok(*only),
            found => Err(Error::ExpectedExactlyOneOfType {
                descriptor_type,
                found: found.len(),
            }),
        }
    }
}

fn check_unique_ids(forest: &Forest) -> Result<()> {
    let mut seen: IndexMap<&str, Location> = IndexMap::new();
    for (_, node) in forest.iter() {
        let Some(id) = node.id.as_deref() else {
            continue;
        };
        if let Some(&previous) = seen.get(id) {
            return Err(Error::DuplicateId {
                id: id.to_string(),
                location: node.location,
                previous,
            });
        }
        seen.insert(id, node.location);
    }
    Ok(())
}
