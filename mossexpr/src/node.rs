//! Node representation.
//!
//! Nodes live in the arena owned by [`QueryTree`](crate::tree::QueryTree) and refer to
//! their children by [`NodeId`]. Parent links are kept by the tree, not by the node.

use slotmap::new_key_type;
use smallvec::{SmallVec, smallvec};

use crate::types::{Literal, ValueType};
use crate::variant::{
    PARAM_HEADER_NAME, PARAM_ID, PARAM_VALUE, PARAM_VAR_NAME, ParamSpecs, Variant,
};

new_key_type! {
    /// Stable handle of a node inside a [`QueryTree`](crate::tree::QueryTree).
    pub struct NodeId;
}

/// Children of a node in positional order.
pub type Children = SmallVec<[NodeId; 4]>;

/// Payload shared by `ForAll` and `Exists`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantifier {
    /// Fixed at construction.
    pub var_type: ValueType,
    pub var_name: String,
    /// Candidate producers, never fewer than one.
    pub values: SmallVec<[NodeId; 2]>,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Placeholder,
    Substring { needle: NodeId, haystack: NodeId },
    And(Children),
    Or(Children),
    ForAll(Quantifier),
    Exists(Quantifier),
    Const(Literal),
    Variable { name: String },
    CustomHeader { name: Option<String> },
    AllAttachments,
    AttachmentSize { attachment: NodeId },
    GreaterThan { lhs: NodeId, rhs: NodeId },
}

impl NodeKind {
    pub fn variant(&self) -> Variant {
        match self {
            NodeKind::Placeholder => Variant::Placeholder,
            NodeKind::Substring { .. } => Variant::Substring,
            NodeKind::And(_) => Variant::And,
            NodeKind::Or(_) => Variant::Or,
            NodeKind::ForAll(_) => Variant::ForAll,
            NodeKind::Exists(_) => Variant::Exists,
            NodeKind::Const(_) => Variant::Const,
            NodeKind::Variable { .. } => Variant::Variable,
            NodeKind::CustomHeader { .. } => Variant::CustomHeader,
            NodeKind::AllAttachments => Variant::AllAttachments,
            NodeKind::AttachmentSize { .. } => Variant::AttachmentSize,
            NodeKind::GreaterThan { .. } => Variant::GreaterThan,
        }
    }

    pub fn quantifier(&self) -> Option<&Quantifier> {
        match self {
            NodeKind::ForAll(q) | NodeKind::Exists(q) => Some(q),
            _ => None,
        }
    }

    pub(crate) fn quantifier_mut(&mut self) -> Option<&mut Quantifier> {
        match self {
            NodeKind::ForAll(q) | NodeKind::Exists(q) => Some(q),
            _ => None,
        }
    }

    /// Structural children in positional order. Quantifier values precede the body.
    pub fn children(&self) -> Children {
        match self {
            NodeKind::Substring { needle, haystack } => smallvec![*needle, *haystack],
            NodeKind::And(children) | NodeKind::Or(children) => children.clone(),
            NodeKind::ForAll(q) | NodeKind::Exists(q) => {
                q.values.iter().copied().chain(Some(q.body)).collect()
            }
            NodeKind::AttachmentSize { attachment } => smallvec![*attachment],
            NodeKind::GreaterThan { lhs, rhs } => smallvec![*lhs, *rhs],
            NodeKind::Placeholder
            | NodeKind::Const(_)
            | NodeKind::Variable { .. }
            | NodeKind::CustomHeader { .. }
            | NodeKind::AllAttachments => SmallVec::new(),
        }
    }

    pub(crate) fn slots_mut(&mut self) -> SmallVec<[&mut NodeId; 4]> {
        match self {
            NodeKind::Substring { needle, haystack } => smallvec![needle, haystack],
            NodeKind::And(children) | NodeKind::Or(children) => children.iter_mut().collect(),
            NodeKind::ForAll(q) | NodeKind::Exists(q) => q
                .values
                .iter_mut()
                .chain(std::iter::once(&mut q.body))
                .collect(),
            NodeKind::AttachmentSize { attachment } => smallvec![attachment],
            NodeKind::GreaterThan { lhs, rhs } => smallvec![lhs, rhs],
            _ => SmallVec::new(),
        }
    }

    pub(crate) fn slot_mut(&mut self, child: NodeId) -> Option<&mut NodeId> {
        self.slots_mut().into_iter().find(|slot| **slot == child)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) ty: ValueType,
    pub(crate) kind: NodeKind,
}

impl Node {
    #[inline]
    pub fn produced_type(&self) -> ValueType {
        self.ty
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[inline]
    pub fn variant(&self) -> Variant {
        self.kind.variant()
    }

    #[inline]
    pub fn children(&self) -> Children {
        self.kind.children()
    }

    #[inline]
    pub fn is_placeholder(&self) -> bool {
        matches!(self.kind, NodeKind::Placeholder)
    }

    /// Constant parameters as they were given at construction.
    pub fn const_params(&self) -> SmallVec<[Literal; 1]> {
        match &self.kind {
            NodeKind::ForAll(q) | NodeKind::Exists(q) => smallvec![Literal::Type(q.var_type)],
            _ => SmallVec::new(),
        }
    }

    /// Settable parameters of this concrete node.
    pub fn params(&self) -> ParamSpecs {
        self.variant().param_types(self.ty, &self.const_params())
    }

    /// Current value of a settable parameter; `None` if unknown or unset.
    pub fn param(&self, name: &str) -> Option<Literal> {
        match (&self.kind, name) {
            (NodeKind::Const(value), PARAM_VALUE) => Some(value.clone()),
            (NodeKind::Variable { name: id }, PARAM_ID) => Some(Literal::Var(id.clone())),
            (NodeKind::CustomHeader { name: header }, PARAM_HEADER_NAME) => {
                header.clone().map(Literal::String)
            }
            (NodeKind::ForAll(q) | NodeKind::Exists(q), PARAM_VAR_NAME) => {
                Some(Literal::Var(q.var_name.clone()))
            }
            _ => None,
        }
    }
}
