//! Element tree to content tree.
//!
//! Each element is looked up in the schema, checked against its parent's legal
//! children, and converted to a node. Children are built in document order.

use descgen_core::{Element, SourceMap};

use super::attrs::Attrs;
use super::{ContentNode, DescriptorNode, Direction, Forest, NodeId, NodeKind};
use crate::registry::DescriptorId;
use crate::schema::{self, NodeTag, ROOT_CHILDREN, ROOT_NAME};
use crate::value::utf16_le;
use crate::{Error, Result};

/// Build the content tree for every root-level element, in input order.
pub fn build_forest(sources: &SourceMap, elements: &[Element]) -> Result<Forest> {
    let mut builder = ForestBuilder {
        sources,
        forest: Forest::default(),
    };
    for el in elements {
        builder.root_element(el)?;
    }
    Ok(builder.forest)
}

struct ForestBuilder<'s> {
    sources: &'s SourceMap,
    forest: Forest,
}

impl ForestBuilder<'_> {
    fn root_element(&mut self, el: &Element) -> Result<()> {
        let Some(entry) = schema::lookup(&el.tag) else {
            log::warn!(
                "{}:{}: skipping unknown element `<{}>`",
                self.sources.name(el.location.source),
                el.location.line,
                el.tag
            );
            return Ok(());
        };

        if !ROOT_CHILDREN.contains(&entry.node) {
            return Err(Error::IllegalChild {
                parent: ROOT_NAME.to_string(),
                child: el.tag.clone(),
                location: el.location,
            });
        }

        match entry.node {
            NodeTag::Include => {
                let file = el.trimmed_text();
                if file.is_empty() {
                    return Err(Error::InvalidAttribute {
                        tag: el.tag.clone(),
                        attribute: "value".to_string(),
                        value: String::new(),
                        reason: "expected a header file name".to_string(),
                        location: el.location,
                    });
                }
                self.forest.includes.push(file.to_string());
            }
            _ => {
                self.descriptor(el)?;
            }
        }
        Ok(())
    }

    fn descriptor(&mut self, el: &Element) -> Result<NodeId> {
        let attrs = Attrs::new(el);
        let descriptor_type = attrs.descriptor_type("type")?;
        let parent_id = attrs.optional("childof").map(str::to_string);
        let top = attrs.explicit_flag("top")?.unwrap_or(parent_id.is_none());
        let first = attrs.flag("first")?;
        let windex = attrs.int("wIndex", u64::from(u16::MAX))?.unwrap_or_default() as u16;

        let owner = DescriptorId::new(self.forest.descriptors.len());
        let node = self.forest.push(ContentNode {
            id: attrs.optional("id").map(str::to_string),
            name: attrs.optional("name").map(str::to_string),
            owner,
            children: Vec::new(),
            kind: NodeKind::Descriptor(DescriptorNode {
                descriptor_type,
                parent_id,
                top,
                first,
                windex,
            }),
            location: el.location,
        });
        self.forest.descriptors.push(node);

        let children = self.children(el, NodeTag::Descriptor, owner)?;
        self.forest.node_mut(node).children = children;
        Ok(node)
    }

    fn children(
        &mut self,
        el: &Element,
        parent: NodeTag,
        owner: DescriptorId,
    ) -> Result<Vec<NodeId>> {
        el.children
            .iter()
            .map(|child| self.content(child, parent, owner))
            .collect()
    }

    fn content(&mut self, el: &Element, parent: NodeTag, owner: DescriptorId) -> Result<NodeId> {
        let Some(entry) = schema::lookup(&el.tag) else {
            return Err(Error::UnknownTag {
                tag: el.tag.clone(),
                location: el.location,
            });
        };

        if entry.node == NodeTag::Descriptor {
            return Err(Error::DescriptorMustBeTopLevelInput {
                parent: parent.tag_name().to_string(),
                location: el.location,
            });
        }
        if !parent.allows(entry.node) {
            return Err(Error::IllegalChild {
                parent: parent.tag_name().to_string(),
                child: el.tag.clone(),
                location: el.location,
            });
        }

        let attrs = Attrs::new(el);
        let kind = content_kind(entry.node, el, &attrs)?;
        let children = self.children(el, entry.node, owner)?;

        Ok(self.forest.push(ContentNode {
            id: attrs.optional("id").map(str::to_string),
            name: attrs.optional("name").map(str::to_string),
            owner,
            children,
            kind,
            location: el.location,
        }))
    }
}

fn content_kind(tag: NodeTag, el: &Element, attrs: &Attrs<'_>) -> Result<NodeKind> {
    let kind = match tag {
        NodeTag::Hidden => {
            let size = attrs.size(1)?;
            NodeKind::Hidden {
                value: attrs.value(size)?,
                size,
            }
        }
        NodeTag::Byte => NodeKind::Byte(attrs.value(1)?),
        NodeTag::Word => NodeKind::Word(attrs.value(2)?),
        NodeTag::String => NodeKind::StringConst(utf16_le(el.text.as_deref().unwrap_or_default())),
        NodeTag::Length => NodeKind::Length {
            size: attrs.size(1)?,
            count_all: attrs.flag("all")?,
        },
        NodeTag::Type => NodeKind::TypeField {
            size: attrs.size(1)?,
        },
        NodeTag::Index => NodeKind::IndexField {
            size: attrs.size(1)?,
        },
        NodeTag::Ref => NodeKind::Ref {
            target: attrs.required("refid")?.to_string(),
            expected_type: attrs.optional_descriptor_type("type")?,
            size: attrs.size(1)?,
        },
        NodeTag::Count => NodeKind::Count {
            descriptor_type: attrs.descriptor_type("type")?,
            associated: attrs.flag("associated")?,
            size: attrs.size(1)?,
        },
        NodeTag::Foreach => NodeKind::Foreach {
            descriptor_type: attrs.descriptor_type("type")?,
            associated: attrs.flag("associated")?,
            unique: attrs.flag("unique")?,
        },
        NodeTag::Echo => NodeKind::Echo {
            name: attrs.required("name")?.to_string(),
        },
        NodeTag::Children => NodeKind::Children {
            descriptor_type: attrs.descriptor_type("type")?,
        },
        NodeTag::InEndpoint | NodeTag::OutEndpoint => NodeKind::Endpoint {
            direction: if tag == NodeTag::InEndpoint {
                Direction::In
            } else {
                Direction::Out
            },
            define: attrs.optional("define").map(str::to_string),
        },
        NodeTag::Raw => NodeKind::Raw(el.text.clone().unwrap_or_default()),
        NodeTag::Descriptor | NodeTag::Include => {
            unreachable!("`<{}>` is never a content child", el.tag)
        }
    };
    Ok(kind)
}
