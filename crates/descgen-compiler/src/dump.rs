//! Human-readable dumps of a resolved run.

use std::fmt::Write;

use descgen_core::Colors;

use crate::registry::DescriptorId;
use crate::resolve::Resolution;
use crate::stages::Resolved;
use crate::tree::{NodeId, NodeKind};
use crate::value::Value;

pub struct TreePrinter<'r> {
    resolved: &'r Resolved,
    registry: bool,
    colors: Colors,
}

impl<'r> TreePrinter<'r> {
    pub fn new(resolved: &'r Resolved) -> Self {
        Self {
            resolved,
            registry: false,
            colors: Colors::OFF,
        }
    }

    /// Print the registry (per-type indices) instead of the node tree.
    pub fn registry(mut self, value: bool) -> Self {
        self.registry = value;
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colors = Colors::new(value);
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        if self.registry {
            return self.format_registry(w);
        }
        for (_, node) in self.resolved.forest().descriptors() {
            self.format_node(node, 0, w)?;
        }
        Ok(())
    }

    fn format_registry(&self, w: &mut impl Write) -> std::fmt::Result {
        let c = self.colors;
        let registry = self.resolved.registry();
        for (descriptor_type, descriptors) in registry.types() {
            writeln!(w, "{}type{} {descriptor_type:#04x}", c.dim, c.reset)?;
            for &descriptor in descriptors {
                let entry = registry.get(descriptor);
                write!(
                    w,
                    "  {}{}{} {}{}{}",
                    c.value, entry.index, c.reset, c.name, entry.label(), c.reset
                )?;
                if entry.top {
                    write!(w, " {}top{}", c.dim, c.reset)?;
                }
                if let Some(parent) = &entry.parent_id {
                    write!(w, " {}childof{} {parent}", c.dim, c.reset)?;
                }
                if entry.windex != 0 {
                    write!(w, " {}wIndex{} {:#06x}", c.dim, c.reset, entry.windex)?;
                }
                writeln!(w)?;
            }
        }
        Ok(())
    }

    fn format_node(&self, node: NodeId, indent: usize, w: &mut impl Write) -> std::fmt::Result {
        let c = self.colors;
        let forest = self.resolved.forest();
        let n = forest.node(node);
        let prefix = "  ".repeat(indent);

        write!(w, "{prefix}{}{}{}", c.dim, n.kind.tag_name(), c.reset)?;
        if let Some(label) = n.id.as_deref().or(n.name.as_deref()) {
            write!(w, " {}{label}{}", c.name, c.reset)?;
        }

        match &n.kind {
            NodeKind::Descriptor(d) => {
                let index = self.resolved.resolutions().value(node).unwrap_or_default();
                write!(w, " type={:#04x} index={index}", d.descriptor_type)?;
                if d.top {
                    write!(w, " {}top{}", c.dim, c.reset)?;
                }
            }
            NodeKind::Hidden { value, .. } | NodeKind::Byte(value) | NodeKind::Word(value) => {
                write!(w, " {}{}{}", c.value, format_value(value), c.reset)?;
            }
            NodeKind::StringConst(bytes) => write!(w, " ({} bytes)", bytes.len())?,
            NodeKind::Ref { target, .. } => write!(w, " -> {target}")?,
            NodeKind::Endpoint {
                define: Some(define),
                ..
            } => write!(w, " {define}")?,
            _ => {}
        }

        match self.resolved.resolutions().get(node) {
            Resolution::Value(_) if n.as_descriptor().is_some() => {}
            Resolution::Value(v) => write!(w, " = {}{v}{}", c.value, c.reset)?,
            Resolution::Address(a) => write!(w, " = {}{a:#04x}{}", c.value, c.reset)?,
            Resolution::Matched(ids) => {
                write!(w, " = [{}]", self.labels(ids))?;
            }
            Resolution::Static | Resolution::Pending => {}
        }
        writeln!(w)?;

        for &child in &n.children {
            self.format_node(child, indent + 1, w)?;
        }
        Ok(())
    }

    fn labels(&self, ids: &[DescriptorId]) -> String {
        let registry = self.resolved.registry();
        ids.iter()
            .map(|&d| registry.get(d).label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Literal(v) => format!("{v:#x}"),
        Value::Expr(expr) => expr.clone(),
    }
}

impl Resolved {
    pub fn printer(&self) -> TreePrinter<'_> {
        TreePrinter::new(self)
    }
}
