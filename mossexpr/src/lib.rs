//! Mossexpr: typed, editable query trees over mail messages.
//!
//! A query is a boolean predicate built from a small closed set of node variants
//! (substring tests, connectives, bounded quantifiers, constants, variables, header and
//! attachment accessors). Trees may be *incomplete*: every slot is always filled, but
//! unfinished slots hold typed placeholders. Incomplete trees can be edited and rendered
//! but not evaluated.
//!
//! Layout
//!  - [`types`]: value types and literal parameters.
//!  - [`variant`]: the variant registry (possible types, parameters, command names).
//!  - [`node`] and [`tree`]: the arena, handles and the structural mutation contract.
//!  - [`eval`]: evaluation against a [`eval::Message`].
//!  - [`subst`]: substitution and quantifier expansion.
//!  - [`render`] and [`pretty`]: line-oriented and infix displays.
//!
//! Example
//! ```
//! use mossexpr::prelude::*;
//!
//! struct Plain;
//! impl Message for Plain {
//!     fn is_multipart(&self) -> bool { false }
//!     fn parts(&self) -> Vec<Attachment> { Vec::new() }
//!     fn header(&self, name: &str) -> Option<String> {
//!         (name == "Subject").then(|| "weekly report".to_string())
//!     }
//! }
//!
//! let mut tree = QueryTree::new(ValueType::Bool);
//! let sub = tree.install(tree.root(), Variant::Substring, &[]).unwrap();
//! let [needle, haystack] = tree[sub].children()[..] else { unreachable!() };
//! let needle = tree.install(needle, Variant::Const, &[]).unwrap();
//! tree.set_param(needle, "value", Literal::String("report".into())).unwrap();
//! let header = tree.install(haystack, Variant::CustomHeader, &[]).unwrap();
//! tree.set_param(header, "name", Literal::String("Subject".into())).unwrap();
//!
//! assert!(matches(&tree, &Plain).unwrap());
//! assert_eq!(tree.pretty_string(tree.root(), 80), "\"report\" in header(\"Subject\")");
//! ```

pub mod error;
pub mod eval;
pub mod node;
pub mod pretty;
pub mod render;
pub mod subst;
pub mod tree;
pub mod types;
pub mod variant;

pub mod prelude {
    pub use crate::error::{ExprError, ExprResult};
    pub use crate::eval::{Attachment, Env, Message, Value, evaluate, matches};
    pub use crate::node::{Node, NodeId, NodeKind, Quantifier};
    pub use crate::pretty::{PrettyQuery, Style};
    pub use crate::render::RenderLine;
    pub use crate::subst::{BindingEnv, Substituted};
    pub use crate::tree::QueryTree;
    pub use crate::types::{Literal, ValueType};
    pub use crate::variant::{ParamSpec, Variant};
}
