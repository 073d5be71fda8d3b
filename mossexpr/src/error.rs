use strum::EnumIs;
use thiserror::Error;

use crate::{node::NodeId, types::ValueType, variant::Variant};

#[derive(Debug, Clone, PartialEq, Eq, Error, EnumIs)]
pub enum ExprError {
    #[error("'{variant}' cannot produce a value of type {ty}")]
    WrongType { variant: Variant, ty: ValueType },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Cannot expand: {0}")]
    CannotExpand(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("The query is incomplete")]
    IncompleteQuery,

    #[error("Node {child:?} is not a child of {parent:?}")]
    NotMyChild { parent: NodeId, child: NodeId },

    #[error("Node {0:?} is already attached to a parent")]
    AlreadyAttached(NodeId),

    #[error("Node {0:?} does not exist")]
    UnknownNode(NodeId),

    #[error("Variable '{name}' ({ty}) is not bound by an enclosing quantifier of that type")]
    FreeVariable { name: String, ty: ValueType },

    #[error("Variable '{0}' is not bound")]
    UnboundVariable(String),

    #[error("Evaluation error: {0}")]
    EvaluationError(String),
}

impl ExprError {
    /// Errors that can only come from a malformed tree, never from user input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ExprError::NotMyChild { .. }
                | ExprError::AlreadyAttached(_)
                | ExprError::UnknownNode(_)
                | ExprError::UnboundVariable(_)
                | ExprError::EvaluationError(_)
        )
    }

    pub(crate) fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ExprError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type ExprResult<T> = Result<T, ExprError>;
