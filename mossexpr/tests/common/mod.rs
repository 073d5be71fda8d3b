#![allow(dead_code)]

use mossexpr::prelude::*;

/// In-memory message with explicit parts and headers.
#[derive(Debug, Clone, Default)]
pub struct FakeMessage {
    pub multipart: bool,
    pub parts: Vec<Attachment>,
    pub headers: Vec<(String, String)>,
}

impl FakeMessage {
    pub fn plain() -> Self {
        Self::default()
    }

    /// A multipart message with a text body followed by one binary part per size.
    pub fn with_attachments(sizes: &[u64]) -> Self {
        let mut parts = vec![Attachment {
            index: 0,
            content_type: "text/plain".to_string(),
            multipart: false,
            payload_len: 3_000_000,
        }];
        parts.extend(sizes.iter().enumerate().map(|(i, size)| Attachment {
            index: i + 1,
            content_type: "application/octet-stream".to_string(),
            multipart: false,
            payload_len: *size,
        }));
        FakeMessage {
            multipart: true,
            parts,
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

impl Message for FakeMessage {
    fn is_multipart(&self) -> bool {
        self.multipart
    }

    fn parts(&self) -> Vec<Attachment> {
        self.parts.clone()
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }
}

pub fn child(tree: &QueryTree, id: NodeId, index: usize) -> NodeId {
    tree[id].children()[index]
}

pub fn int_const(tree: &mut QueryTree, at: NodeId, value: i64) -> NodeId {
    let id = tree.install(at, Variant::Const, &[]).unwrap();
    tree.set_param(id, "value", Literal::Int(value)).unwrap();
    id
}

pub fn string_const(tree: &mut QueryTree, at: NodeId, value: &str) -> NodeId {
    let id = tree.install(at, Variant::Const, &[]).unwrap();
    tree.set_param(id, "value", Literal::String(value.to_string()))
        .unwrap();
    id
}

pub fn header(tree: &mut QueryTree, at: NodeId, name: &str) -> NodeId {
    let id = tree.install(at, Variant::CustomHeader, &[]).unwrap();
    tree.set_param(id, "name", Literal::String(name.to_string()))
        .unwrap();
    id
}

/// `<quantifier> _: Attachment in [attachments] . size(_) > threshold`
pub fn attachment_size_query(quantifier: Variant, threshold: i64) -> QueryTree {
    let mut tree = QueryTree::new(ValueType::Bool);
    let root = tree.root();
    let q = tree
        .install(root, quantifier, &[Literal::Type(ValueType::Attachment)])
        .unwrap();
    tree.install(child(&tree, q, 0), Variant::AllAttachments, &[])
        .unwrap();
    let gt = tree
        .install(child(&tree, q, 1), Variant::GreaterThan, &[])
        .unwrap();
    let size = tree
        .install(child(&tree, gt, 0), Variant::AttachmentSize, &[])
        .unwrap();
    tree.install(child(&tree, size, 0), Variant::Variable, &[])
        .unwrap();
    let rhs = child(&tree, gt, 1);
    int_const(&mut tree, rhs, threshold);
    tree
}

/// `<quantifier> _: Int in [values...] . _ > threshold`
pub fn int_domain_query(quantifier: Variant, values: &[i64], threshold: i64) -> QueryTree {
    let mut tree = QueryTree::new(ValueType::Bool);
    let root = tree.root();
    let q = tree
        .install(root, quantifier, &[Literal::Type(ValueType::Int)])
        .unwrap();
    for _ in 1..values.len() {
        tree.add_value(q).unwrap();
    }
    for (i, value) in values.iter().enumerate() {
        let slot = child(&tree, q, i);
        int_const(&mut tree, slot, *value);
    }
    let body = child(&tree, q, values.len());
    let gt = tree.install(body, Variant::GreaterThan, &[]).unwrap();
    tree.install(child(&tree, gt, 0), Variant::Variable, &[])
        .unwrap();
    let rhs = child(&tree, gt, 1);
    int_const(&mut tree, rhs, threshold);
    tree
}

/// Every allocated node is reachable from the root.
pub fn assert_no_leaks(tree: &QueryTree) {
    assert_eq!(tree.len(), tree.flatten(tree.root()).len());
}
