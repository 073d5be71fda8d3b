//! Capture-respecting substitution and quantifier expansion.
//!
//! Substituting a bound variable never shares a subtree: the first occurrence moves the
//! bound expression out of its old slot (leaving a placeholder behind) and re-parents it
//! into the copy, later occurrences get an independent deep copy. [`Substituted`] records
//! which of the two happened.

use log::debug;
use smallvec::SmallVec;

use crate::error::{ExprError, ExprResult};
use crate::node::{Children, NodeId, NodeKind};
use crate::tree::QueryTree;
use crate::variant::Variant;

/// Result of copying one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substituted {
    /// A newly allocated, detached subtree.
    Fresh(NodeId),
    /// An existing subtree moved out of its slot; now detached.
    Relocated(NodeId),
}

impl Substituted {
    #[inline]
    pub fn node(self) -> NodeId {
        match self {
            Substituted::Fresh(id) | Substituted::Relocated(id) => id,
        }
    }

    #[inline]
    pub fn is_relocated(self) -> bool {
        matches!(self, Substituted::Relocated(_))
    }
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    /// `None` hides outer bindings of `name`.
    target: Option<NodeId>,
    used: bool,
}

/// Variable name to expression bindings used by [`QueryTree::copy_with_env`].
#[derive(Debug, Clone, Default)]
pub struct BindingEnv {
    entries: Vec<Entry>,
}

impl BindingEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment with a single binding.
    pub fn single(name: impl Into<String>, target: NodeId) -> Self {
        let mut env = Self::new();
        env.bind(name, target);
        env
    }

    pub fn bind(&mut self, name: impl Into<String>, target: NodeId) {
        self.entries.push(Entry {
            name: name.into(),
            target: Some(target),
            used: false,
        });
    }

    fn shadow(&mut self, name: &str) {
        self.entries.push(Entry {
            name: name.to_string(),
            target: None,
            used: false,
        });
    }

    fn pop(&mut self) {
        self.entries.pop();
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().rev().find(|e| e.name == name)
    }
}

impl QueryTree {
    /// Copy the subtree at `id`, substituting variables bound in `env`.
    ///
    /// The result is detached. A nested quantifier rebinding a name hides that name in
    /// its body but not in its value list.
    pub fn copy_with_env(&mut self, id: NodeId, env: &mut BindingEnv) -> ExprResult<Substituted> {
        let node = self.node(id)?.clone();

        if let NodeKind::Variable { name } = &node.kind {
            if let Some(entry) = env.lookup_mut(name) {
                if let Some(target) = entry.target {
                    if !entry.used {
                        entry.used = true;
                        self.detach(target)?;
                        return Ok(Substituted::Relocated(target));
                    }
                    return self.deep_copy(target).map(Substituted::Fresh);
                }
            }
            return Ok(Substituted::Fresh(self.alloc(node.ty, node.kind.clone())));
        }

        let mut kind = node.kind;
        match &mut kind {
            NodeKind::ForAll(q) | NodeKind::Exists(q) => {
                for value in q.values.iter_mut() {
                    *value = self.copy_with_env(*value, env)?.node();
                }
                env.shadow(&q.var_name);
                let body = self.copy_with_env(q.body, env);
                env.pop();
                q.body = body?.node();
            }
            other => {
                for slot in other.slots_mut() {
                    *slot = self.copy_with_env(*slot, env)?.node();
                }
            }
        }
        Ok(Substituted::Fresh(self.alloc(node.ty, kind)))
    }

    /// Plain structural copy of the subtree at `id`; the result is detached.
    pub fn deep_copy(&mut self, id: NodeId) -> ExprResult<NodeId> {
        self.copy_with_env(id, &mut BindingEnv::new())
            .map(Substituted::node)
    }

    /// Take `id` out of its slot, leaving a placeholder of the same type behind.
    fn detach(&mut self, id: NodeId) -> ExprResult<()> {
        if id != self.root() && self.parent(id).is_none() {
            return Ok(());
        }
        let ty = self.node(id)?.produced_type();
        let hole = self.placeholder(ty);
        if let Err(err) = self.replace(id, hole) {
            self.discard(hole);
            return Err(err);
        }
        Ok(())
    }

    /// Replace the quantifier at `id` by its quantifier-free expansion.
    ///
    /// One value yields the substituted body, N values yield an `And` (`forall`) or `Or`
    /// (`exists`) of N substituted bodies.
    pub fn expand(&mut self, id: NodeId) -> ExprResult<NodeId> {
        let node = self.node(id)?;
        let ty = node.produced_type();
        let universal = node.variant() == Variant::ForAll;
        let q = node
            .kind
            .quantifier()
            .ok_or_else(|| {
                ExprError::CannotExpand(format!("'{}' is not a quantifier", node.variant()))
            })?
            .clone();
        for value in &q.values {
            let variant = self.node(*value)?.variant();
            if variant.is_list_typed() {
                return Err(ExprError::CannotExpand(format!(
                    "'{variant}' does not have a literal set of values"
                )));
            }
        }

        let result = if let [value] = q.values.as_slice() {
            let mut env = BindingEnv::single(q.var_name.clone(), *value);
            self.copy_with_env(q.body, &mut env)?.node()
        } else {
            let mut copies: Children = SmallVec::with_capacity(q.values.len());
            for value in &q.values {
                let mut env = BindingEnv::single(q.var_name.clone(), *value);
                copies.push(self.copy_with_env(q.body, &mut env)?.node());
            }
            let kind = if universal {
                NodeKind::And(copies)
            } else {
                NodeKind::Or(copies)
            };
            self.alloc(ty, kind)
        };

        self.replace(id, result)?;
        self.discard(id);
        debug!("Expanded quantifier {id:?} over {} value(s)", q.values.len());
        Ok(result)
    }
}
