//! The query editor: a selection over a [`QueryTree`] plus the two-state command
//! protocol that turns short commands into tree edits.
//!
//! In [`EditorState::Normal`] the editor accepts commands about the selected node. A
//! command that needs a parameter value it was not given moves the editor to
//! [`EditorState::AwaitingParameter`]; the next line of input is then parsed as that
//! value (or cancels the edit when empty) and the editor returns to `Normal`.
//!
//! Every command either succeeds completely or leaves the tree untouched.

use log::debug;
use mossexpr::prelude::*;
use mossexpr::variant::{PARAM_ID, PARAM_VAR_TYPE};

use crate::command::Edit;
use crate::error::{MossError, MossResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Normal,
    AwaitingParameter {
        node: NodeId,
        name: &'static str,
        ty: ValueType,
    },
}

/// What the front-end should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Done,
    /// Read one line and hand it to [`Editor::feed_input`].
    AwaitParameter { name: &'static str, ty: ValueType },
}

impl Response {
    /// Prompt text for parameter input.
    pub fn prompt(&self) -> Option<String> {
        match self {
            Response::Done => None,
            Response::AwaitParameter { name, ty } => {
                Some(format!("Enter parameter '{name}' ({ty}): "))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Editor {
    query: QueryTree,
    selected: NodeId,
    state: EditorState,
    revision: u64,
}

impl Editor {
    /// An editor over the empty query, a single Bool placeholder.
    pub fn new() -> Self {
        let query = QueryTree::new(ValueType::Bool);
        let selected = query.root();
        Editor {
            query,
            selected,
            state: EditorState::Normal,
            revision: 0,
        }
    }

    #[inline]
    pub fn query(&self) -> &QueryTree {
        &self.query
    }

    #[inline]
    pub fn selected(&self) -> NodeId {
        self.selected
    }

    #[inline]
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Bumped by every successful mutation of the query.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_complete(&self) -> bool {
        self.query.is_complete(self.query.root())
    }

    // ---------------------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------------------

    /// Select `id` if it is part of the query.
    pub fn select(&mut self, id: NodeId) -> bool {
        if self.query.line_of(id).is_some() {
            self.selected = id;
            true
        } else {
            false
        }
    }

    /// Move the selection one display line down. Returns false at the last line.
    pub fn select_next(&mut self) -> bool {
        let lines = self.query.flatten(self.query.root());
        match lines.iter().position(|n| *n == self.selected) {
            Some(pos) if pos + 1 < lines.len() => {
                self.selected = lines[pos + 1];
                true
            }
            _ => false,
        }
    }

    /// Move the selection one display line up. Returns false at the first line.
    pub fn select_prev(&mut self) -> bool {
        let lines = self.query.flatten(self.query.root());
        match lines.iter().position(|n| *n == self.selected) {
            Some(pos) if pos > 0 => {
                self.selected = lines[pos - 1];
                true
            }
            _ => false,
        }
    }

    /// Display line of the selection.
    pub fn selected_line(&self) -> usize {
        self.query.line_of(self.selected).unwrap_or(0)
    }

    // ---------------------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------------------

    /// The edit a blank command stands for: `mod` on single-parameter nodes.
    pub fn default_edit(&self) -> Option<Edit> {
        (self.query[self.selected].params().len() == 1).then_some(Edit::Modify)
    }

    /// Run a blank command.
    pub fn apply_default(&mut self) -> MossResult<Response> {
        match self.default_edit() {
            Some(edit) => self.apply(edit, false, None),
            None => Ok(Response::Done),
        }
    }

    /// Run `edit` on the selected node.
    pub fn apply(&mut self, edit: Edit, force: bool, arg: Option<&str>) -> MossResult<Response> {
        self.state = EditorState::Normal;
        debug!("Applying {edit:?} (force: {force}, arg: {arg:?}) to {:?}", self.selected);
        let response = match edit {
            Edit::Create(variant) => self.create(variant, force, arg).map(|_| Response::Done),
            Edit::Remove => self.remove().map(|_| Response::Done),
            Edit::Modify => self.modify(arg),
            Edit::More => self.more().map(|_| Response::Done),
            Edit::Expand => self.expand().map(|_| Response::Done),
        }?;
        Ok(response)
    }

    /// Supply the parameter value requested by the last command.
    ///
    /// Empty input cancels. Parse failures leave the node unchanged; either way the
    /// editor is back in `Normal` afterwards.
    pub fn feed_input(&mut self, text: &str) -> MossResult<()> {
        let EditorState::AwaitingParameter { node, name, ty } =
            std::mem::replace(&mut self.state, EditorState::Normal)
        else {
            return Err(MossError::NotAwaitingInput);
        };
        if text.trim().is_empty() {
            debug!("Parameter input for {node:?} cancelled");
            return Ok(());
        }
        let value = parse_param(name, ty, text)?;
        self.query.set_param(node, name, value)?;
        self.touched(node);
        Ok(())
    }

    fn create(&mut self, variant: Variant, force: bool, arg: Option<&str>) -> MossResult<()> {
        let current = self.selected;
        let ty = self.query[current].produced_type();
        let replaceable = self.query[current].variant().replaceable_without_warning();

        if variant.is_connective() && !force {
            let parent_variant = self.query.parent(current).map(|p| self.query[p].variant());
            if parent_variant == Some(variant) {
                let sibling = self.query.add_sibling(current)?;
                self.touched(sibling);
                return Ok(());
            }
        }
        if variant.is_connective() && !(force || replaceable) {
            if ty != ValueType::Bool {
                return Err(MossError::MustForceReplace);
            }
            let new = self.query.push_down(current, variant, &[])?;
            self.touched(new);
            return Ok(());
        }

        if variant.is_quantifier() && !force {
            if ty == ValueType::Bool {
                let consts = Self::const_args(variant, ty, arg)?;
                let new = self.query.push_down(current, variant, &consts)?;
                self.touched(new);
                return Ok(());
            }
            let parent_ty = self.query.parent(current).map(|p| self.query[p].produced_type());
            if parent_ty == Some(ValueType::Bool) {
                if let Some(text) = arg {
                    let bound = parse_param(PARAM_VAR_TYPE, ValueType::Type, text)?;
                    if bound != Literal::Type(ty) {
                        return Err(ExprError::InvalidParameter {
                            name: PARAM_VAR_TYPE.to_string(),
                            reason: format!("the quantified expression has type {ty}"),
                        }
                        .into());
                    }
                }
                let new = self.query.push_far_down(current, variant)?;
                self.touched(new);
                return Ok(());
            }
            return Err(ExprError::WrongType { variant, ty }.into());
        }

        if !(force || replaceable) {
            return Err(MossError::MustForceReplace);
        }
        if !variant.can_produce(ty) {
            return Err(ExprError::WrongType { variant, ty }.into());
        }

        // Without constant parameters the argument fills the single mutable one.
        let consts = Self::const_args(variant, ty, arg)?;
        let inline = match (arg, variant.const_param_types(ty).is_empty()) {
            (Some(text), true) => match variant.param_types(ty, &consts).as_slice() {
                [spec] => Some((spec.name, parse_param(spec.name, spec.ty, text)?)),
                _ => None,
            },
            _ => None,
        };

        let new = self.query.install(current, variant, &consts)?;
        let inline = match inline {
            // A fresh variable refers to the innermost binder of its type.
            None if variant == Variant::Variable => self
                .query
                .visible_variable(new, ty)
                .map(|name| (PARAM_ID, Literal::Var(name))),
            other => other,
        };
        if let Some((name, value)) = inline {
            self.query.set_param(new, name, value)?;
        }
        self.touched(new);
        Ok(())
    }

    fn const_args(variant: Variant, ty: ValueType, arg: Option<&str>) -> MossResult<Vec<Literal>> {
        let specs = variant.const_param_types(ty);
        match (specs.as_slice(), arg) {
            ([], _) | ([_], None) => Ok(Vec::new()),
            ([spec], Some(text)) => Ok(vec![parse_param(spec.name, spec.ty, text)?]),
            _ => Err(ExprError::NotImplemented("multiple constant parameters".to_string()).into()),
        }
    }

    fn remove(&mut self) -> MossResult<()> {
        let current = self.selected;
        let parent = self.query.parent(current).ok_or(MossError::CannotRemove)?;
        if !self.query.remove_child(parent, current)? {
            return Err(MossError::CannotRemove);
        }
        self.revision += 1;
        self.selected = parent;
        debug!("Removed {current:?} from {parent:?}");
        Ok(())
    }

    fn modify(&mut self, arg: Option<&str>) -> MossResult<Response> {
        let current = self.selected;
        let params = self.query[current].params();
        let spec = match params.as_slice() {
            [] => {
                return Err(ExprError::InvalidParameter {
                    name: self.query[current].variant().command().to_string(),
                    reason: "this expression takes no parameters".to_string(),
                }
                .into());
            }
            [spec] => *spec,
            _ => return Err(ExprError::NotImplemented("multiple parameters".to_string()).into()),
        };

        match arg {
            Some(text) => {
                let value = parse_param(spec.name, spec.ty, text)?;
                self.query.set_param(current, spec.name, value)?;
                self.touched(current);
                Ok(Response::Done)
            }
            None => {
                self.state = EditorState::AwaitingParameter {
                    node: current,
                    name: spec.name,
                    ty: spec.ty,
                };
                Ok(Response::AwaitParameter {
                    name: spec.name,
                    ty: spec.ty,
                })
            }
        }
    }

    fn more(&mut self) -> MossResult<()> {
        let quantifier = self
            .query
            .parent(self.selected)
            .filter(|p| self.query[*p].variant().is_quantifier())
            .ok_or(MossError::CannotAddValue)?;
        let value = self.query.add_value(quantifier)?;
        self.touched(value);
        Ok(())
    }

    fn expand(&mut self) -> MossResult<()> {
        let new = self.query.expand(self.selected)?;
        self.touched(new);
        Ok(())
    }

    /// Record a mutation and move the selection to `id`'s hint.
    fn touched(&mut self, id: NodeId) {
        self.revision += 1;
        let hint = self.query.selection_hint(id);
        if !self.select(hint) {
            self.selected = self.query.root();
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Editor::new()
    }
}

fn parse_param(name: &str, ty: ValueType, text: &str) -> MossResult<Literal> {
    Literal::parse(ty, text).map_err(|reason| {
        MossError::Expr(ExprError::InvalidParameter {
            name: name.to_string(),
            reason: format!("incorrect value >{text}< for type {ty}: {reason}"),
        })
    })
}
