//! Emission: descriptor buffers, the descriptor table, and C text.
//!
//! `DescriptorTable::build` turns a resolved forest into plain data. The C
//! writers in `c_writer` only format that data.

mod c_writer;
mod render;

#[cfg(test)]
mod emit_tests;

use crate::layout::Layout;
use crate::registry::{DescriptorEntry, Registry};
use crate::resolve::Resolutions;
use crate::tree::{Forest, NodeKind};
use crate::value::{ByteValue, fits};
use crate::{Error, Result};

pub use c_writer::{BANNER, TABLE_NAME, header_guard, write_deps, write_header, write_source};
pub use render::Chunk;

/// Bytes of one top-level descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Buffer {
    /// C identifier of the buffer.
    pub name: String,
    pub label: String,
    pub chunks: Vec<Chunk>,
}

impl Buffer {
    pub fn bytes(&self) -> impl Iterator<Item = &ByteValue> {
        self.chunks.iter().flat_map(Chunk::bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One row of the descriptor table. The sentinel row has no buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRow {
    pub descriptor_type: u8,
    pub index: u8,
    pub windex: u16,
    pub size: usize,
    pub buffer: Option<String>,
}

impl TableRow {
    pub const SENTINEL: TableRow = TableRow {
        descriptor_type: 0,
        index: 0,
        windex: 0,
        size: 0,
        buffer: None,
    };

    /// Type in the high byte, index in the low byte, as `wValue` carries them.
    pub fn type_index(&self) -> u16 {
        (u16::from(self.descriptor_type) << 8) | u16::from(self.index)
    }

    pub fn is_sentinel(&self) -> bool {
        self.buffer.is_none()
    }
}

/// A `#define` for an endpoint address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointDefine {
    pub name: String,
    pub address: u8,
}

/// Everything the C writers need.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DescriptorTable {
    pub includes: Vec<String>,
    pub buffers: Vec<Buffer>,
    /// Ends with the sentinel row.
    pub rows: Vec<TableRow>,
    pub endpoints: Vec<EndpointDefine>,
    pub endpoint_count: u8,
}

impl DescriptorTable {
    pub fn build(forest: &Forest, registry: &Registry, resolutions: &Resolutions) -> Result<Self> {
        let renderer = render::Renderer {
            layout: Layout::new(forest, registry),
            resolutions,
        };

        let mut table = DescriptorTable {
            endpoint_count: resolutions.endpoints_allocated(),
            ..Default::default()
        };
        for include in forest.includes() {
            if !table.includes.contains(include) {
                table.includes.push(include.clone());
            }
        }

        for (descriptor_type, descriptors) in registry.top() {
            for &descriptor in descriptors {
                let entry = registry.get(descriptor);
                if !fits(u64::from(entry.index), 1) {
                    return Err(Error::ValueOutOfRange {
                        what: "descriptor index".to_string(),
                        value: u64::from(entry.index),
                        size: 1,
                        location: entry.location,
                    });
                }
                let buffer = Buffer {
                    name: buffer_name(entry),
                    label: entry.label(),
                    chunks: renderer.descriptor(descriptor)?,
                };
                log::debug!("buffer {} is {} bytes", buffer.name, buffer.len());
                table.rows.push(TableRow {
                    descriptor_type,
                    index: entry.index as u8,
                    windex: entry.windex,
                    size: buffer.len(),
                    buffer: Some(buffer.name.clone()),
                });
                table.buffers.push(buffer);
            }
        }
        table.rows.push(TableRow::SENTINEL);

        for (node_id, node) in forest.iter() {
            if let NodeKind::Endpoint {
                define: Some(define),
                ..
            } = &node.kind
            {
                let address = resolutions
                    .address(node_id)
                    .expect("endpoints resolve to an address");
                table.endpoints.push(EndpointDefine {
                    name: define.clone(),
                    address,
                });
            }
        }

        Ok(table)
    }

    /// Rows other than the sentinel.
    pub fn descriptor_rows(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter().filter(|row| !row.is_sentinel())
    }
}

/// `descriptor_<id>`, or `descriptor_<type>_<index>` for anonymous descriptors.
fn buffer_name(entry: &DescriptorEntry) -> String {
    match &entry.id {
        Some(id) => {
            let id: String = id
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect();
            format!("descriptor_{id}")
        }
        None => format!("descriptor_{:02x}_{}", entry.descriptor_type, entry.index),
    }
}
