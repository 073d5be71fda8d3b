//! Evaluation of query trees against a mail message.
//!
//! Role
//! - Define the view of a message the evaluator needs ([`Message`]) and the runtime
//!   values nodes produce ([`Value`]).
//! - Evaluate a subtree by structural recursion under a scoped variable environment.
//!
//! Quantifiers splice list-typed producers: `forall a in [attachments]` ranges over each
//! attachment of the message, and an empty splice is vacuously true (`forall`) or false
//! (`exists`).

use either::Either;
use log::trace;

use crate::error::{ExprError, ExprResult};
use crate::node::{NodeId, NodeKind, Quantifier};
use crate::tree::QueryTree;
use crate::types::{Literal, ValueType};

/// One top-level part of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Position among the message's parts.
    pub index: usize,
    pub content_type: String,
    /// The part is itself a multipart container.
    pub multipart: bool,
    /// Length of the encoded payload in bytes.
    pub payload_len: u64,
}

impl Attachment {
    /// Size used by queries: 0 for containers.
    #[inline]
    pub fn size(&self) -> u64 {
        if self.multipart { 0 } else { self.payload_len }
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        self.content_type.to_ascii_lowercase().starts_with("text")
    }
}

/// What the evaluator can ask of a message.
pub trait Message {
    fn is_multipart(&self) -> bool;

    /// Top-level parts in document order. Empty for single-part messages.
    fn parts(&self) -> Vec<Attachment>;

    /// Decoded value of the first header called `name`, if any.
    fn header(&self, name: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    String(String),
    Size(u64),
    Attachment(Attachment),
    /// Produced by list-typed nodes only.
    List(Vec<Value>),
}

impl Value {
    pub fn value_type(&self) -> Option<ValueType> {
        Some(match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::String(_) => ValueType::String,
            Value::Size(_) => ValueType::Size,
            Value::Attachment(_) => ValueType::Attachment,
            Value::List(_) => return None,
        })
    }

    fn describe(&self) -> String {
        self.value_type()
            .map_or_else(|| "a list".to_string(), |ty| ty.to_string())
    }

    fn as_number(&self) -> Option<i128> {
        match self {
            Value::Int(i) => Some(*i as i128),
            Value::Size(s) => Some(*s as i128),
            _ => None,
        }
    }
}

impl From<&Literal> for Value {
    fn from(lit: &Literal) -> Self {
        match lit {
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::Int(*i),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Size(s) => Value::Size(*s),
            Literal::Var(name) => Value::String(name.clone()),
            Literal::Type(ty) => Value::String(ty.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
struct Binding {
    name: String,
    ty: ValueType,
    value: Value,
}

/// Type and value environment, innermost binding last.
#[derive(Debug, Clone, Default)]
pub struct Env {
    bindings: Vec<Binding>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, ty: ValueType, value: Value) {
        self.bindings.push(Binding {
            name: name.into(),
            ty,
            value,
        });
    }

    pub fn unbind(&mut self) {
        self.bindings.pop();
    }

    pub fn value_of(&self, name: &str) -> Option<&Value> {
        self.lookup(name).map(|b| &b.value)
    }

    pub fn type_of(&self, name: &str) -> Option<ValueType> {
        self.lookup(name).map(|b| b.ty)
    }

    fn lookup(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().rev().find(|b| b.name == name)
    }
}

/// Whether the whole query matches `message`.
///
/// Incomplete queries are rejected before anything is evaluated.
pub fn matches<M: Message + ?Sized>(tree: &QueryTree, message: &M) -> ExprResult<bool> {
    let root = tree.root();
    if !tree.is_complete(root) {
        return Err(ExprError::IncompleteQuery);
    }
    let mut env = Env::new();
    expect_bool(evaluate(tree, root, message, &mut env)?)
}

/// Evaluate the subtree at `id`.
///
/// Does not check completeness; hitting a placeholder is an [`ExprError::EvaluationError`].
pub fn evaluate<M: Message + ?Sized>(
    tree: &QueryTree,
    id: NodeId,
    message: &M,
    env: &mut Env,
) -> ExprResult<Value> {
    let node = tree.node(id)?;
    match &node.kind {
        NodeKind::Placeholder => Err(ExprError::EvaluationError(format!(
            "placeholder {id:?} reached during evaluation"
        ))),
        NodeKind::Substring { needle, haystack } => {
            let needle = expect_string(evaluate(tree, *needle, message, env)?)?;
            let haystack = expect_string(evaluate(tree, *haystack, message, env)?)?;
            Ok(Value::Bool(haystack.contains(&needle)))
        }
        NodeKind::And(children) => {
            for child in children {
                if !expect_bool(evaluate(tree, *child, message, env)?)? {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        }
        NodeKind::Or(children) => {
            for child in children {
                if expect_bool(evaluate(tree, *child, message, env)?)? {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        NodeKind::ForAll(q) => quantify(tree, q, message, env, true),
        NodeKind::Exists(q) => quantify(tree, q, message, env, false),
        NodeKind::Const(lit) => Ok(Value::from(lit)),
        NodeKind::Variable { name } => env
            .value_of(name)
            .cloned()
            .ok_or_else(|| ExprError::UnboundVariable(name.clone())),
        NodeKind::CustomHeader { name } => Ok(Value::String(
            name.as_deref()
                .and_then(|name| message.header(name))
                .unwrap_or_default(),
        )),
        NodeKind::AllAttachments => {
            if !message.is_multipart() {
                return Ok(Value::List(Vec::new()));
            }
            Ok(Value::List(
                message
                    .parts()
                    .into_iter()
                    .filter(|part| !part.is_text())
                    .map(Value::Attachment)
                    .collect(),
            ))
        }
        NodeKind::AttachmentSize { attachment } => {
            match evaluate(tree, *attachment, message, env)? {
                Value::Attachment(part) => {
                    Ok(Value::Int(i64::try_from(part.size()).unwrap_or(i64::MAX)))
                }
                other => Err(mismatch(ValueType::Attachment, &other)),
            }
        }
        NodeKind::GreaterThan { lhs, rhs } => {
            let lhs = evaluate(tree, *lhs, message, env)?;
            let rhs = evaluate(tree, *rhs, message, env)?;
            match (lhs.as_number(), rhs.as_number()) {
                (Some(l), Some(r)) => Ok(Value::Bool(l > r)),
                (None, _) => Err(mismatch(ValueType::Int, &lhs)),
                (_, None) => Err(mismatch(ValueType::Int, &rhs)),
            }
        }
    }
}

fn quantify<M: Message + ?Sized>(
    tree: &QueryTree,
    q: &Quantifier,
    message: &M,
    env: &mut Env,
    universal: bool,
) -> ExprResult<Value> {
    // Value producers see the outer scope only.
    let mut candidates = Vec::with_capacity(q.values.len());
    for value in &q.values {
        let produced = evaluate(tree, *value, message, env)?;
        candidates.extend(match produced {
            Value::List(items) => Either::Left(items.into_iter()),
            single => Either::Right(std::iter::once(single)),
        });
    }
    trace!(
        "Quantifying '{}' over {} candidate(s)",
        q.var_name,
        candidates.len()
    );

    for candidate in candidates {
        env.bind(q.var_name.clone(), q.var_type, candidate);
        let outcome = evaluate(tree, q.body, message, env).and_then(expect_bool);
        env.unbind();
        if outcome? != universal {
            return Ok(Value::Bool(!universal));
        }
    }
    Ok(Value::Bool(universal))
}

fn mismatch(expected: ValueType, found: &Value) -> ExprError {
    ExprError::EvaluationError(format!("expected {expected}, found {}", found.describe()))
}

fn expect_bool(value: Value) -> ExprResult<bool> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(mismatch(ValueType::Bool, &other)),
    }
}

fn expect_string(value: Value) -> ExprResult<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(mismatch(ValueType::String, &other)),
    }
}
