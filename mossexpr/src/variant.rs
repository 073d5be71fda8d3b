use smallvec::{SmallVec, smallvec};
use strum::{Display, EnumIter, IntoStaticStr};

use crate::types::{Literal, ValueType};

/// The closed set of node variants.
///
/// The `Display`/`IntoStaticStr` form is the editor command that creates the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, IntoStaticStr)]
pub enum Variant {
    #[strum(serialize = "null")]
    Placeholder,
    #[strum(serialize = "substring")]
    Substring,
    #[strum(serialize = "and")]
    And,
    #[strum(serialize = "or")]
    Or,
    #[strum(serialize = "forall")]
    ForAll,
    #[strum(serialize = "exists")]
    Exists,
    #[strum(serialize = "const")]
    Const,
    #[strum(serialize = "var")]
    Variable,
    #[strum(serialize = "header")]
    CustomHeader,
    #[strum(serialize = "attachments")]
    AllAttachments,
    #[strum(serialize = "size")]
    AttachmentSize,
    #[strum(serialize = "gt")]
    GreaterThan,
}

/// A named, typed parameter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: ValueType,
}

pub type ParamSpecs = SmallVec<[ParamSpec; 1]>;

pub const PARAM_VALUE: &str = "value";
pub const PARAM_ID: &str = "id";
pub const PARAM_HEADER_NAME: &str = "name";
pub const PARAM_VAR_NAME: &str = "variable name";
pub const PARAM_VAR_TYPE: &str = "variable type";

use ValueType as T;

impl Variant {
    #[inline]
    pub fn command(self) -> &'static str {
        self.into()
    }

    /// Types this variant can be constructed to produce.
    pub fn possible_types(self) -> &'static [ValueType] {
        match self {
            Variant::Placeholder => &[T::Bool, T::Int, T::String, T::Size, T::Attachment],
            Variant::Substring
            | Variant::And
            | Variant::Or
            | Variant::ForAll
            | Variant::Exists
            | Variant::GreaterThan => &[T::Bool],
            Variant::Const => &[T::Int, T::String, T::Size],
            Variant::Variable => &[T::Int, T::String, T::Size, T::Attachment],
            Variant::CustomHeader => &[T::String],
            Variant::AllAttachments => &[T::Attachment],
            Variant::AttachmentSize => &[T::Int],
        }
    }

    #[inline]
    pub fn can_produce(self, ty: ValueType) -> bool {
        self.possible_types().contains(&ty)
    }

    /// Parameters fixed at construction time.
    pub fn const_param_types(self, _ty: ValueType) -> ParamSpecs {
        match self {
            Variant::ForAll | Variant::Exists => smallvec![ParamSpec {
                name: PARAM_VAR_TYPE,
                ty: T::Type,
            }],
            _ => SmallVec::new(),
        }
    }

    /// Parameters that may be set after construction.
    pub fn param_types(self, ty: ValueType, _consts: &[Literal]) -> ParamSpecs {
        let spec = |name: &'static str, ty: ValueType| -> ParamSpecs {
            smallvec![ParamSpec { name, ty }]
        };
        match self {
            Variant::ForAll | Variant::Exists => spec(PARAM_VAR_NAME, T::Var),
            Variant::Const => spec(PARAM_VALUE, ty),
            Variant::Variable => spec(PARAM_ID, T::Var),
            Variant::CustomHeader => spec(PARAM_HEADER_NAME, T::String),
            _ => SmallVec::new(),
        }
    }

    /// Produces several values at once; only meaningful inside a quantifier value list.
    #[inline]
    pub fn is_list_typed(self) -> bool {
        matches!(self, Variant::AllAttachments)
    }

    #[inline]
    pub fn is_quantifier(self) -> bool {
        matches!(self, Variant::ForAll | Variant::Exists)
    }

    #[inline]
    pub fn is_connective(self) -> bool {
        matches!(self, Variant::And | Variant::Or)
    }

    /// Only holes may be overwritten without an explicit force.
    #[inline]
    pub fn replaceable_without_warning(self) -> bool {
        matches!(self, Variant::Placeholder)
    }
}
