//! Value types and literal parameter values.
//!
//! Role
//! - `ValueType` is the closed set of types a node can produce, plus two meta-types
//!   (`Var`, `Type`) that only ever describe parameters.
//! - `Literal` is a parameter value (constants, variable names, bound types) together
//!   with the text parsers used by the interactive editor.

use std::fmt;

use chumsky::prelude::*;
use strum::{Display, EnumIs, EnumIter, EnumString, IntoStaticStr};

/// Types a node (or a node parameter) can have.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumIs, Display, EnumString, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum ValueType {
    Bool,
    Int,
    String,
    Size,
    Attachment,
    /// Names a variable. Parameter-only.
    Var,
    /// Names a value type. Parameter-only.
    Type,
}

impl ValueType {
    /// `Var` and `Type` never flow through evaluation.
    #[inline]
    pub fn is_meta(self) -> bool {
        matches!(self, ValueType::Var | ValueType::Type)
    }

    /// Parse a user-facing type name (`bool`, `int`, `string`, `size`, `attachment`).
    ///
    /// Meta-types are rejected.
    pub fn from_name(name: &str) -> Option<ValueType> {
        name.trim()
            .parse::<ValueType>()
            .ok()
            .filter(|ty| !ty.is_meta())
    }
}

/// A parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    String(String),
    /// Size in bytes.
    Size(u64),
    /// A variable name.
    Var(String),
    Type(ValueType),
}

impl Literal {
    pub fn value_type(&self) -> ValueType {
        match self {
            Literal::Bool(_) => ValueType::Bool,
            Literal::Int(_) => ValueType::Int,
            Literal::String(_) => ValueType::String,
            Literal::Size(_) => ValueType::Size,
            Literal::Var(_) => ValueType::Var,
            Literal::Type(_) => ValueType::Type,
        }
    }

    /// The value a freshly created parameter of type `ty` starts with.
    ///
    /// `Attachment` has no literal form and therefore no default.
    pub fn default_for(ty: ValueType) -> Option<Literal> {
        Some(match ty {
            ValueType::Bool => Literal::Bool(true),
            ValueType::Int => Literal::Int(0),
            ValueType::String => Literal::String(String::new()),
            ValueType::Size => Literal::Size(0),
            ValueType::Var => Literal::Var(DEFAULT_VAR_NAME.to_string()),
            ValueType::Type => Literal::Type(ValueType::String),
            ValueType::Attachment => return None,
        })
    }

    /// Parse `text` as a literal of type `ty`.
    ///
    /// Strings are taken verbatim. On failure the error is a human readable reason.
    pub fn parse(ty: ValueType, text: &str) -> Result<Literal, String> {
        match ty {
            ValueType::String => Ok(Literal::String(text.to_string())),
            ValueType::Bool => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" => Ok(Literal::Bool(true)),
                "false" | "no" => Ok(Literal::Bool(false)),
                other => Err(format!("'{other}' is not a boolean")),
            },
            ValueType::Int => run(int_parser(), text).map(Literal::Int),
            ValueType::Size => run(size_parser(), text).map(Literal::Size),
            ValueType::Var => run(var_name_parser(), text).map(|s| Literal::Var(s.to_string())),
            ValueType::Type => ValueType::from_name(text)
                .map(Literal::Type)
                .ok_or_else(|| format!("'{}' is not a type name", text.trim())),
            ValueType::Attachment => Err("attachments have no literal form".to_string()),
        }
    }
}

/// Name given to freshly bound variables.
pub const DEFAULT_VAR_NAME: &str = "_";

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::String(s) => write!(f, "{s:?}"),
            Literal::Size(bytes) => write!(f, "{}", SizeDisplay(*bytes)),
            Literal::Var(name) => write!(f, "{name}"),
            Literal::Type(ty) => write!(f, "{ty}"),
        }
    }
}

/// Formats a byte count with the largest exact decimal unit (`1500`, `2k`, `3M`, `1G`).
pub struct SizeDisplay(pub u64);

impl fmt::Display for SizeDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0;
        for (scale, unit) in [(1_000_000_000, "G"), (1_000_000, "M"), (1_000, "k")] {
            if n != 0 && n % scale == 0 {
                return write!(f, "{}{unit}", n / scale);
            }
        }
        write!(f, "{n}")
    }
}

fn run<'a, O>(
    parser: impl Parser<'a, &'a str, O, extra::Err<Rich<'a, char>>>,
    text: &'a str,
) -> Result<O, String> {
    parser
        .padded()
        .then_ignore(end())
        .parse(text)
        .into_result()
        .map_err(|errs| {
            errs.into_iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        })
}

fn int_parser<'a>() -> impl Parser<'a, &'a str, i64, extra::Err<Rich<'a, char>>> {
    just('-')
        .or_not()
        .then(text::int(10))
        .to_slice()
        .try_map(|digits: &str, span| {
            digits
                .parse::<i64>()
                .map_err(|e| Rich::custom(span, e.to_string()))
        })
}

/// Decimal byte counts with an optional `k`, `M` or `G` suffix.
fn size_parser<'a>() -> impl Parser<'a, &'a str, u64, extra::Err<Rich<'a, char>>> {
    let number = text::int(10).try_map(|digits: &str, span| {
        digits
            .parse::<u64>()
            .map_err(|e| Rich::custom(span, e.to_string()))
    });
    let unit = one_of("kKmMgG").or_not().map(|unit| match unit {
        Some('k' | 'K') => 1_000,
        Some('m' | 'M') => 1_000_000,
        Some('g' | 'G') => 1_000_000_000,
        _ => 1,
    });

    number.then(unit).try_map(|(n, scale): (u64, u64), span| {
        n.checked_mul(scale)
            .ok_or_else(|| Rich::custom(span, "size is too large"))
    })
}

fn var_name_parser<'a>() -> impl Parser<'a, &'a str, &'a str, extra::Err<Rich<'a, char>>> {
    text::ident()
}
