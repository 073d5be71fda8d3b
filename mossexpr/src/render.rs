//! Line-oriented view of a query tree, as handed to terminal front-ends.

use smallvec::SmallVec;

use crate::node::{NodeId, NodeKind};
use crate::tree::QueryTree;

/// One display line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderLine {
    pub indent: usize,
    pub label: String,
    pub node: NodeId,
}

impl QueryTree {
    /// Display text of a single node.
    pub fn label(&self, id: NodeId) -> String {
        let Some(node) = self.get(id) else {
            return "<dangling>".to_string();
        };
        match node.kind() {
            NodeKind::Placeholder => format!("<?:{}>", node.produced_type()),
            NodeKind::Substring { .. } => "SUBSTRING".to_string(),
            NodeKind::And(_) => "AND".to_string(),
            NodeKind::Or(_) => "OR".to_string(),
            NodeKind::ForAll(q) => format!("FOR ALL {}:{}", q.var_name, q.var_type),
            NodeKind::Exists(q) => format!("EXISTS {}:{}", q.var_name, q.var_type),
            NodeKind::Const(value) => value.to_string(),
            NodeKind::Variable { name } => format!("{name} : {}", node.produced_type()),
            NodeKind::CustomHeader { name: None } => "HEADER ?".to_string(),
            NodeKind::CustomHeader { name: Some(name) } => format!("HEADER: {name}"),
            NodeKind::AllAttachments => "ALL ATTACHMENTS".to_string(),
            NodeKind::AttachmentSize { .. } => "ATTACHMENT SIZE".to_string(),
            NodeKind::GreaterThan { .. } => "GREATER THAN".to_string(),
        }
    }

    /// The whole tree in display order.
    ///
    /// Children sit one level deeper than their parent, except quantifier values which
    /// sit two levels deeper so the body stands out.
    pub fn render(&self) -> Vec<RenderLine> {
        let mut lines = Vec::with_capacity(self.len());
        let mut stack: SmallVec<[(NodeId, usize); 16]> = SmallVec::new();
        stack.push((self.root(), 0));
        while let Some((id, indent)) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            lines.push(RenderLine {
                indent,
                label: self.label(id),
                node: id,
            });
            match node.kind() {
                NodeKind::ForAll(q) | NodeKind::Exists(q) => {
                    stack.push((q.body, indent + 1));
                    stack.extend(q.values.iter().rev().map(|v| (*v, indent + 2)));
                }
                kind => stack.extend(kind.children().into_iter().rev().map(|c| (c, indent + 1))),
            }
        }
        lines
    }

    /// Node to select right after `id` was created.
    pub fn selection_hint(&self, id: NodeId) -> NodeId {
        match self.get(id).map(|n| n.kind()) {
            Some(NodeKind::Substring { needle, .. }) => *needle,
            Some(NodeKind::And(children) | NodeKind::Or(children)) => children[0],
            Some(NodeKind::ForAll(q) | NodeKind::Exists(q)) => q.values[0],
            Some(NodeKind::AttachmentSize { attachment }) => *attachment,
            Some(NodeKind::GreaterThan { lhs, .. }) => *lhs,
            _ => id,
        }
    }

    /// Display line of `id`, if it is reachable from the root.
    pub fn line_of(&self, id: NodeId) -> Option<usize> {
        self.flatten(self.root()).iter().position(|n| *n == id)
    }
}
