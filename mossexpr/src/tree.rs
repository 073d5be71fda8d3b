//! Arena-backed query tree and its mutation contract.
//!
//! Role
//! - Own every node of one query in a `SlotMap`, addressed by stable [`NodeId`] handles.
//! - Keep parent links in a separate `SecondaryMap` so that replacing or removing a node
//!   is an index rebind.
//! - Provide the structural edits the editor is built from (install, push-down,
//!   push-far-down, sibling and value insertion, removal).
//!
//! Every public operation either succeeds completely or leaves the tree untouched, and no
//! public operation leaves detached nodes behind in the arena, except
//! [`QueryTree::create_detached`] and [`QueryTree::replace_child`] whose results the
//! caller owns.
//!
//! Example
//! ```
//! use mossexpr::prelude::*;
//!
//! let mut tree = QueryTree::new(ValueType::Bool);
//! let and = tree.install(tree.root(), Variant::And, &[]).unwrap();
//! assert_eq!(tree.flatten(and).len(), 3);
//! assert!(!tree.is_complete(and));
//! ```

use std::ops::Index;

use log::debug;
use slotmap::{SecondaryMap, SlotMap};
use smallvec::SmallVec;

use crate::error::{ExprError, ExprResult};
use crate::node::{Children, Node, NodeId, NodeKind, Quantifier};
use crate::types::{DEFAULT_VAR_NAME, Literal, ValueType};
use crate::variant::{
    PARAM_HEADER_NAME, PARAM_ID, PARAM_VALUE, PARAM_VAR_NAME, PARAM_VAR_TYPE, Variant,
};

#[derive(Debug, Clone)]
pub struct QueryTree {
    nodes: SlotMap<NodeId, Node>,
    parents: SecondaryMap<NodeId, NodeId>,
    root: NodeId,
}

impl QueryTree {
    /// A tree holding a single placeholder of type `ty`.
    pub fn new(ty: ValueType) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node {
            ty,
            kind: NodeKind::Placeholder,
        });
        QueryTree {
            nodes,
            parents: SecondaryMap::new(),
            root,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id).copied()
    }

    /// Number of nodes currently allocated.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn node(&self, id: NodeId) -> ExprResult<&Node> {
        self.nodes.get(id).ok_or(ExprError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> ExprResult<&mut Node> {
        self.nodes.get_mut(id).ok_or(ExprError::UnknownNode(id))
    }

    #[inline]
    fn is_detached(&self, id: NodeId) -> bool {
        id != self.root && !self.parents.contains_key(id)
    }

    /// Whether `id` occupies an entry of a quantifier value list.
    pub fn is_value_slot(&self, id: NodeId) -> bool {
        self.parent(id)
            .and_then(|p| self.nodes.get(p))
            .and_then(|p| p.kind.quantifier())
            .is_some_and(|q| q.values.contains(&id))
    }

    /// Preorder listing of the subtree rooted at `id`, `id` first.
    pub fn flatten(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: SmallVec<[NodeId; 16]> = SmallVec::new();
        stack.push(id);
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.kind.children().into_iter().rev());
        }
        out
    }

    /// True iff no placeholder is reachable from `id`.
    pub fn is_complete(&self, id: NodeId) -> bool {
        let mut stack: SmallVec<[NodeId; 16]> = SmallVec::new();
        stack.push(id);
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                return false;
            };
            if node.is_placeholder() {
                return false;
            }
            stack.extend(node.kind.children());
        }
        true
    }

    /// Quantifiers whose body contains `id`, innermost first.
    fn binders(&self, id: NodeId) -> SmallVec<[&Quantifier; 4]> {
        let mut out = SmallVec::new();
        let mut child = id;
        while let Some(parent) = self.parent(child) {
            if let Some(q) = self.nodes.get(parent).and_then(|n| n.kind.quantifier()) {
                if q.body == child {
                    out.push(q);
                }
            }
            child = parent;
        }
        out
    }

    /// The quantifier binding `name` at `id`.
    pub fn binding_of(&self, id: NodeId, name: &str) -> Option<&Quantifier> {
        self.binders(id).into_iter().find(|q| q.var_name == name)
    }

    /// Name of the innermost unshadowed variable of type `ty` in scope at `id`.
    pub fn visible_variable(&self, id: NodeId, ty: ValueType) -> Option<String> {
        let mut shadowed: SmallVec<[&str; 4]> = SmallVec::new();
        for q in self.binders(id) {
            if q.var_type == ty && !shadowed.contains(&q.var_name.as_str()) {
                return Some(q.var_name.clone());
            }
            shadowed.push(q.var_name.as_str());
        }
        None
    }

    /// Fails on the first variable under `id` that no enclosing quantifier of its type
    /// binds.
    pub fn check_bindings(&self, id: NodeId) -> ExprResult<()> {
        for current in self.flatten(id) {
            let node = &self.nodes[current];
            if let NodeKind::Variable { name } = &node.kind {
                match self.binding_of(current, name) {
                    Some(q) if q.var_type == node.ty => {}
                    _ => {
                        return Err(ExprError::FreeVariable {
                            name: name.clone(),
                            ty: node.ty,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// A variable name used neither inside `scope` nor by the quantifiers around it.
    fn fresh_var_name(&self, scope: NodeId) -> String {
        let mut taken: Vec<&str> = self
            .binders(scope)
            .into_iter()
            .map(|q| q.var_name.as_str())
            .collect();
        for id in self.flatten(scope) {
            match &self.nodes[id].kind {
                NodeKind::Variable { name } => taken.push(name.as_str()),
                NodeKind::ForAll(q) | NodeKind::Exists(q) => taken.push(q.var_name.as_str()),
                _ => {}
            }
        }

        let mut name = DEFAULT_VAR_NAME.to_string();
        let mut suffix = 0;
        while taken.contains(&name.as_str()) {
            suffix += 1;
            name = format!("{DEFAULT_VAR_NAME}{suffix}");
        }
        name
    }

    // ---------------------------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------------------------

    pub(crate) fn alloc(&mut self, ty: ValueType, kind: NodeKind) -> NodeId {
        let children = kind.children();
        let id = self.nodes.insert(Node { ty, kind });
        for child in children {
            self.parents.insert(child, id);
        }
        id
    }

    pub(crate) fn placeholder(&mut self, ty: ValueType) -> NodeId {
        self.alloc(ty, NodeKind::Placeholder)
    }

    /// Check that `variant` can be built as `ty` from `consts` and resolve the bound
    /// variable type of quantifiers. Missing constant parameters take their defaults.
    fn check_construction(
        variant: Variant,
        ty: ValueType,
        consts: &[Literal],
    ) -> ExprResult<Option<ValueType>> {
        if !variant.can_produce(ty) {
            return Err(ExprError::WrongType { variant, ty });
        }

        let expected = variant.const_param_types(ty);
        let mut resolved: SmallVec<[Literal; 1]> = SmallVec::new();
        if consts.is_empty() {
            resolved.extend(expected.iter().filter_map(|p| Literal::default_for(p.ty)));
        } else if consts.len() == expected.len() {
            resolved.extend(consts.iter().cloned());
        } else {
            let name = expected.first().map_or(variant.command(), |p| p.name);
            return Err(ExprError::invalid_parameter(
                name,
                format!(
                    "'{variant}' takes {} constant parameter(s), {} given",
                    expected.len(),
                    consts.len()
                ),
            ));
        }
        for (spec, value) in expected.iter().zip(&resolved) {
            if value.value_type() != spec.ty {
                return Err(ExprError::invalid_parameter(
                    spec.name,
                    format!("expected {}, found {}", spec.ty, value.value_type()),
                ));
            }
        }

        match (variant.is_quantifier(), resolved.first()) {
            (true, Some(Literal::Type(var_type))) if var_type.is_meta() => Err(
                ExprError::invalid_parameter(PARAM_VAR_TYPE, format!("cannot bind {var_type}")),
            ),
            (true, Some(Literal::Type(var_type))) => Ok(Some(*var_type)),
            _ => Ok(None),
        }
    }

    /// Allocate a detached node of `variant` producing `ty`, every slot filled with a
    /// placeholder of the right type.
    ///
    /// The caller must attach the result (see [`QueryTree::replace`]) or
    /// [`QueryTree::discard`] it.
    pub fn create_detached(
        &mut self,
        variant: Variant,
        ty: ValueType,
        consts: &[Literal],
    ) -> ExprResult<NodeId> {
        let var_type = Self::check_construction(variant, ty, consts)?;

        let kind = match variant {
            Variant::Placeholder => NodeKind::Placeholder,
            Variant::Substring => NodeKind::Substring {
                needle: self.placeholder(ValueType::String),
                haystack: self.placeholder(ValueType::String),
            },
            Variant::And | Variant::Or => {
                let children: Children = (0..2)
                    .map(|_| self.placeholder(ValueType::Bool))
                    .collect();
                if variant == Variant::And {
                    NodeKind::And(children)
                } else {
                    NodeKind::Or(children)
                }
            }
            Variant::ForAll | Variant::Exists => {
                let var_type = var_type.unwrap_or(ValueType::String);
                let q = Quantifier {
                    var_type,
                    var_name: DEFAULT_VAR_NAME.to_string(),
                    values: SmallVec::from_elem(self.placeholder(var_type), 1),
                    body: self.placeholder(ValueType::Bool),
                };
                if variant == Variant::ForAll {
                    NodeKind::ForAll(q)
                } else {
                    NodeKind::Exists(q)
                }
            }
            Variant::Const => match Literal::default_for(ty) {
                Some(value) => NodeKind::Const(value),
                None => return Err(ExprError::WrongType { variant, ty }),
            },
            Variant::Variable => NodeKind::Variable {
                name: DEFAULT_VAR_NAME.to_string(),
            },
            Variant::CustomHeader => NodeKind::CustomHeader { name: None },
            Variant::AllAttachments => NodeKind::AllAttachments,
            Variant::AttachmentSize => NodeKind::AttachmentSize {
                attachment: self.placeholder(ValueType::Attachment),
            },
            Variant::GreaterThan => NodeKind::GreaterThan {
                lhs: self.placeholder(ValueType::Int),
                rhs: self.placeholder(ValueType::Int),
            },
        };

        Ok(self.alloc(ty, kind))
    }

    /// Free a detached subtree.
    pub fn discard(&mut self, id: NodeId) {
        debug_assert!(self.is_detached(id), "discarding an attached node");
        let mut stack: SmallVec<[NodeId; 16]> = SmallVec::new();
        stack.push(id);
        while let Some(current) = stack.pop() {
            self.parents.remove(current);
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.kind.children());
            }
        }
    }

    /// Set a mutable parameter.
    pub fn set_param(&mut self, id: NodeId, name: &str, value: Literal) -> ExprResult<()> {
        let node = self.node_mut(id)?;
        let ty = node.ty;
        let mismatch = |expected: ValueType, value: &Literal| {
            ExprError::invalid_parameter(
                name,
                format!("expected {expected}, found {}", value.value_type()),
            )
        };

        match (&mut node.kind, name) {
            (NodeKind::Const(slot), PARAM_VALUE) => {
                if value.value_type() != ty {
                    return Err(mismatch(ty, &value));
                }
                *slot = value;
            }
            (NodeKind::Variable { name: id }, PARAM_ID) => match value {
                Literal::Var(new) => *id = new,
                other => return Err(mismatch(ValueType::Var, &other)),
            },
            (NodeKind::CustomHeader { name: header }, PARAM_HEADER_NAME) => match value {
                Literal::String(new) => *header = Some(new),
                other => return Err(mismatch(ValueType::String, &other)),
            },
            (NodeKind::ForAll(q) | NodeKind::Exists(q), PARAM_VAR_NAME) => match value {
                Literal::Var(new) => q.var_name = new,
                other => return Err(mismatch(ValueType::Var, &other)),
            },
            (kind, _) => {
                return Err(ExprError::invalid_parameter(
                    name,
                    format!("not a parameter of '{}'", kind.variant()),
                ));
            }
        }
        debug!("Set parameter '{name}' of {id:?}");
        Ok(())
    }

    // ---------------------------------------------------------------------------------
    // Structural contract
    // ---------------------------------------------------------------------------------

    /// Put the detached node `new` into the slot of `parent` currently holding `child`.
    ///
    /// `child` becomes detached and is owned by the caller.
    pub fn replace_child(&mut self, parent: NodeId, child: NodeId, new: NodeId) -> ExprResult<()> {
        if !self.contains(new) {
            return Err(ExprError::UnknownNode(new));
        }
        if !self.is_detached(new) {
            return Err(ExprError::AlreadyAttached(new));
        }
        let slot = self
            .node_mut(parent)?
            .kind
            .slot_mut(child)
            .ok_or(ExprError::NotMyChild { parent, child })?;
        *slot = new;
        self.parents.remove(child);
        self.parents.insert(new, parent);
        Ok(())
    }

    /// Put the detached node `new` where `old` is, root included.
    ///
    /// `old` becomes detached and is owned by the caller.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> ExprResult<()> {
        match self.parent(old) {
            Some(parent) => self.replace_child(parent, old, new),
            None if old == self.root => {
                if !self.is_detached(new) {
                    return Err(ExprError::AlreadyAttached(new));
                }
                self.root = new;
                Ok(())
            }
            None => Err(ExprError::UnknownNode(old)),
        }
    }

    /// Remove `child` from `parent`.
    ///
    /// Fixed slots get a fresh placeholder of the child's type, variadic lists drop the
    /// entry. Returns `Ok(false)` without touching anything when a minimum arity would
    /// be violated.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> ExprResult<bool> {
        let child_ty = self.node(child)?.ty;
        let not_mine = ExprError::NotMyChild { parent, child };

        if matches!(
            self.node(parent)?.variant(),
            Variant::Substring | Variant::AttachmentSize | Variant::GreaterThan
        ) {
            let fresh = self.placeholder(child_ty);
            if let Err(err) = self.replace_child(parent, child, fresh) {
                self.discard(fresh);
                return Err(err);
            }
            self.discard(child);
            return Ok(true);
        }

        match &mut self.node_mut(parent)?.kind {
            NodeKind::And(children) | NodeKind::Or(children) => {
                let pos = children.iter().position(|c| *c == child).ok_or(not_mine)?;
                if children.len() <= 2 {
                    return Ok(false);
                }
                children.remove(pos);
            }
            NodeKind::ForAll(q) | NodeKind::Exists(q) => {
                if q.body == child {
                    return Ok(false);
                }
                let pos = q.values.iter().position(|c| *c == child).ok_or(not_mine)?;
                if q.values.len() <= 1 {
                    return Ok(false);
                }
                q.values.remove(pos);
            }
            _ => return Err(not_mine),
        }

        self.parents.remove(child);
        self.discard(child);
        Ok(true)
    }

    /// Remove `id` from its parent; the root cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> ExprResult<bool> {
        match self.parent(id) {
            Some(parent) => self.remove_child(parent, id),
            None => Ok(false),
        }
    }

    // ---------------------------------------------------------------------------------
    // Editing moves
    // ---------------------------------------------------------------------------------

    /// Replace `at` (and its subtree) by a new node of `variant` with `at`'s type.
    ///
    /// List producers are only accepted in quantifier value slots.
    pub fn install(&mut self, at: NodeId, variant: Variant, consts: &[Literal]) -> ExprResult<NodeId> {
        let ty = self.node(at)?.ty;
        if variant.is_list_typed() && !self.is_value_slot(at) {
            return Err(ExprError::WrongType { variant, ty });
        }
        let new = self.create_detached(variant, ty, consts)?;
        self.replace(at, new)?;
        self.discard(at);
        debug!("Installed '{variant}' at {at:?} as {new:?}");
        Ok(new)
    }

    /// Wrap `at` in a new `And`, `Or`, `ForAll` or `Exists`.
    ///
    /// `at` becomes the first operand of a connective or the body of a quantifier. A new
    /// quantifier binds a name that captures nothing inside `at`.
    pub fn push_down(&mut self, at: NodeId, variant: Variant, consts: &[Literal]) -> ExprResult<NodeId> {
        let ty = self.node(at)?.ty;
        if !(variant.is_connective() || variant.is_quantifier()) {
            return Err(ExprError::NotImplemented(format!(
                "'{variant}' cannot wrap an expression"
            )));
        }
        if ty != ValueType::Bool {
            return Err(ExprError::WrongType { variant, ty });
        }

        let new = self.create_detached(variant, ty, consts)?;
        if variant.is_quantifier() {
            let name = self.fresh_var_name(at);
            self.set_param(new, PARAM_VAR_NAME, Literal::Var(name))?;
        }
        let hole = match &self.node(new)?.kind {
            NodeKind::And(children) | NodeKind::Or(children) => children[0],
            NodeKind::ForAll(q) | NodeKind::Exists(q) => q.body,
            _ => unreachable!("checked above"),
        };
        self.replace(at, new)?;
        self.replace_child(new, hole, at)?;
        self.discard(hole);
        debug!("Pushed {at:?} down under '{variant}' {new:?}");
        Ok(new)
    }

    /// Quantify over the scalar `at` by inserting a quantifier above its Bool parent.
    ///
    /// `at` moves into the quantifier's value list and its old slot receives a variable
    /// bound by the new quantifier, under a name that captures nothing in the parent.
    pub fn push_far_down(&mut self, at: NodeId, variant: Variant) -> ExprResult<NodeId> {
        let ty = self.node(at)?.ty;
        if !variant.is_quantifier() {
            return Err(ExprError::NotImplemented(format!(
                "'{variant}' cannot quantify an expression"
            )));
        }
        let parent = self.parent(at).ok_or(ExprError::WrongType { variant, ty })?;
        if self.node(parent)?.ty != ValueType::Bool || !Variant::Variable.can_produce(ty) {
            return Err(ExprError::WrongType { variant, ty });
        }

        let var_name = self.fresh_var_name(parent);
        let quantifier = self.create_detached(variant, ValueType::Bool, &[Literal::Type(ty)])?;
        let var = self.create_detached(Variant::Variable, ty, &[])?;
        let (value_hole, body_hole) = match self.node(quantifier)?.kind.quantifier() {
            Some(q) => (q.values[0], q.body),
            None => unreachable!("quantifier variant"),
        };
        self.set_param(quantifier, PARAM_VAR_NAME, Literal::Var(var_name.clone()))?;
        self.set_param(var, PARAM_ID, Literal::Var(var_name))?;

        self.replace(parent, quantifier)?;
        self.replace_child(quantifier, body_hole, parent)?;
        self.discard(body_hole);
        self.replace_child(parent, at, var)?;
        self.replace_child(quantifier, value_hole, at)?;
        self.discard(value_hole);
        debug!("Pushed {at:?} far down under '{variant}' {quantifier:?}");
        Ok(quantifier)
    }

    /// Append a Bool placeholder to the `And`/`Or` that is the parent of `at`.
    pub fn add_sibling(&mut self, at: NodeId) -> ExprResult<NodeId> {
        let parent = self
            .parent(at)
            .ok_or_else(|| ExprError::NotImplemented("the root has no siblings".to_string()))?;
        if !self.node(parent)?.variant().is_connective() {
            return Err(ExprError::NotImplemented(
                "siblings can only be added under 'and' or 'or'".to_string(),
            ));
        }
        let fresh = self.placeholder(ValueType::Bool);
        match &mut self.node_mut(parent)?.kind {
            NodeKind::And(children) | NodeKind::Or(children) => children.push(fresh),
            _ => unreachable!("checked above"),
        }
        self.parents.insert(fresh, parent);
        Ok(fresh)
    }

    /// Append a placeholder of the bound type to a quantifier's value list.
    pub fn add_value(&mut self, quantifier: NodeId) -> ExprResult<NodeId> {
        let var_type = match self.node(quantifier)?.kind.quantifier() {
            Some(q) => q.var_type,
            None => {
                return Err(ExprError::NotImplemented(
                    "values can only be added to quantifiers".to_string(),
                ));
            }
        };
        let fresh = self.placeholder(var_type);
        if let Some(q) = self.node_mut(quantifier)?.kind.quantifier_mut() {
            q.values.push(fresh);
        }
        self.parents.insert(fresh, quantifier);
        Ok(fresh)
    }
}

impl Index<NodeId> for QueryTree {
    type Output = Node;

    /// Panics if `id` is not part of this tree.
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

impl Default for QueryTree {
    fn default() -> Self {
        QueryTree::new(ValueType::Bool)
    }
}
