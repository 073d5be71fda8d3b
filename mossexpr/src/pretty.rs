//! RcDoc-based pretty-printer with termcolor annotations for query trees.
//!
//! Role
//! - Convert a subtree into a compact infix document suitable for width-aware rendering.
//! - Provide colored output for terminals and plain strings for logs and tests.
//!
//! Performance
//! - Building the doc is O(n) in the subtree size; rendering is linear in the size of the
//!   resulting document.

use std::io::{self, Write};

use pretty::{RcDoc, RenderAnnotated};
use termcolor::{Color, ColorSpec, WriteColor};

use crate::node::{NodeId, NodeKind};
use crate::tree::QueryTree;
use crate::variant::Variant;

/// Styles used to annotate parts of the pretty-printed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Punct, // commas, colons, periods, brackets
    /// Parentheses are colored by nesting depth so matching pairs share a color.
    Paren(u8),
    Keyword,  // forall, exists, header, attachments
    Operator, // /\, \/, >, in
    Ident,    // variables and header names
    Literal,  // constants
    Type,
    Hole, // placeholders
}

impl Style {
    pub fn to_color_spec(self) -> ColorSpec {
        let mut s = ColorSpec::new();
        match self {
            Style::Punct => {
                s.set_dimmed(true);
            }
            Style::Paren(depth) => {
                let fg = match depth % 6 {
                    0 => Color::Blue,
                    1 => Color::Green,
                    2 => Color::White,
                    3 => Color::Yellow,
                    4 => Color::Red,
                    _ => Color::Magenta,
                };
                s.set_fg(Some(fg)).set_dimmed(true);
            }
            Style::Keyword => {
                s.set_fg(Some(Color::Cyan)).set_bold(true);
            }
            Style::Operator => {
                s.set_fg(Some(Color::Yellow)).set_bold(true);
            }
            Style::Ident => {
                s.set_fg(Some(Color::Green)).set_bold(true);
            }
            Style::Literal => {
                s.set_fg(Some(Color::White)).set_intense(true);
            }
            Style::Type => {
                s.set_fg(Some(Color::Magenta));
            }
            Style::Hole => {
                s.set_fg(Some(Color::Red)).set_bold(true);
            }
        }
        s
    }

    /// Style of a node's label in line-oriented displays.
    pub fn for_variant(variant: Variant) -> Style {
        match variant {
            Variant::Placeholder => Style::Hole,
            Variant::And | Variant::Or | Variant::GreaterThan | Variant::Substring => {
                Style::Operator
            }
            Variant::ForAll | Variant::Exists => Style::Keyword,
            Variant::Const => Style::Literal,
            Variant::Variable | Variant::CustomHeader => Style::Ident,
            Variant::AllAttachments | Variant::AttachmentSize => Style::Keyword,
        }
    }
}

fn styled(style: Style, s: impl Into<String>) -> RcDoc<'static, Style> {
    RcDoc::text(s.into()).annotate(style)
}

fn punct(s: &'static str) -> RcDoc<'static, Style> {
    styled(Style::Punct, s)
}

fn kw(s: &'static str) -> RcDoc<'static, Style> {
    styled(Style::Keyword, s)
}

fn op(s: &'static str) -> RcDoc<'static, Style> {
    styled(Style::Operator, s)
}

#[inline]
fn lparen(depth: u8) -> RcDoc<'static, Style> {
    RcDoc::text("(").annotate(Style::Paren(depth))
}

#[inline]
fn rparen(depth: u8) -> RcDoc<'static, Style> {
    RcDoc::text(")").annotate(Style::Paren(depth))
}

fn precedence(variant: Variant) -> u8 {
    match variant {
        Variant::ForAll | Variant::Exists => 1,
        Variant::Or => 2,
        Variant::And => 3,
        Variant::GreaterThan | Variant::Substring => 4,
        _ => 255,
    }
}

struct Printer<'t> {
    tree: &'t QueryTree,
}

impl Printer<'_> {
    fn child(&self, id: NodeId, parent: Variant, depth: u8) -> RcDoc<'static, Style> {
        let Some(node) = self.tree.get(id) else {
            return styled(Style::Hole, "<dangling>");
        };
        let current = node.variant();
        let (cp, pp) = (precedence(current), precedence(parent));
        if pp > cp || (pp == cp && current != parent) {
            lparen(depth)
                .append(self.doc(id, depth + 1))
                .append(rparen(depth))
                .group()
        } else {
            self.doc(id, depth)
        }
    }

    fn infix(
        &self,
        operands: &[NodeId],
        sep: &'static str,
        parent: Variant,
        depth: u8,
    ) -> RcDoc<'static, Style> {
        RcDoc::intersperse(
            operands.iter().map(|c| self.child(*c, parent, depth)),
            RcDoc::line().append(op(sep)).append(RcDoc::space()),
        )
        .group()
    }

    fn doc(&self, id: NodeId, depth: u8) -> RcDoc<'static, Style> {
        let Some(node) = self.tree.get(id) else {
            return styled(Style::Hole, "<dangling>");
        };
        let variant = node.variant();
        match node.kind() {
            NodeKind::Placeholder => styled(Style::Hole, format!("?{}", node.produced_type())),
            NodeKind::Substring { needle, haystack } => self.infix(
                &[*needle, *haystack],
                "in",
                variant,
                depth,
            ),
            NodeKind::And(children) => self.infix(children, "/\\", variant, depth),
            NodeKind::Or(children) => self.infix(children, "\\/", variant, depth),
            NodeKind::ForAll(q) | NodeKind::Exists(q) => {
                let keyword = if variant == Variant::ForAll { "forall" } else { "exists" };
                let values = RcDoc::intersperse(
                    q.values.iter().map(|v| self.doc(*v, depth)),
                    punct(",").append(RcDoc::space()),
                );
                kw(keyword)
                    .append(RcDoc::space())
                    .append(styled(Style::Ident, q.var_name.clone()))
                    .append(punct(":"))
                    .append(RcDoc::space())
                    .append(styled(Style::Type, q.var_type.to_string()))
                    .append(RcDoc::space())
                    .append(op("in"))
                    .append(RcDoc::space())
                    .append(punct("["))
                    .append(values)
                    .append(punct("]"))
                    .append(RcDoc::space())
                    .append(punct("."))
                    .append(RcDoc::line())
                    .append(self.child(q.body, variant, depth))
                    .nest(2)
                    .group()
            }
            NodeKind::Const(value) => styled(Style::Literal, value.to_string()),
            NodeKind::Variable { name } => styled(Style::Ident, name.clone()),
            NodeKind::CustomHeader { name } => kw("header")
                .append(lparen(depth))
                .append(match name {
                    Some(name) => styled(Style::Ident, format!("{name:?}")),
                    None => styled(Style::Hole, "?"),
                })
                .append(rparen(depth)),
            NodeKind::AllAttachments => kw("attachments"),
            NodeKind::AttachmentSize { attachment } => kw("size")
                .append(lparen(depth))
                .append(self.doc(*attachment, depth + 1))
                .append(rparen(depth)),
            NodeKind::GreaterThan { lhs, rhs } => self.infix(&[*lhs, *rhs], ">", variant, depth),
        }
    }
}

// A writer that maps Style annotations to termcolor ColorSpec on a WriteColor sink.
struct ColorWriter<'w, W: WriteColor + Write> {
    out: &'w mut W,
}

impl<'a, W: WriteColor + Write> RenderAnnotated<'a, Style> for ColorWriter<'_, W> {
    fn push_annotation(&mut self, ann: &'a Style) -> io::Result<()> {
        self.out.set_color(&ann.to_color_spec())
    }
    fn pop_annotation(&mut self) -> io::Result<()> {
        self.out.reset()
    }
}

impl<W: WriteColor + Write> pretty::Render for ColorWriter<'_, W> {
    type Error = io::Error;
    fn write_str(&mut self, s: &str) -> io::Result<usize> {
        self.out.write_all(s.as_bytes())?;
        Ok(s.len())
    }
    fn write_str_all(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }
    fn fail_doc(&self) -> Self::Error {
        io::Error::other("render failed")
    }
}

/// Retrieve the width of the terminal, or 80 if it cannot be determined.
pub fn terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Pretty-printing conveniences for a query tree.
pub trait PrettyQuery {
    /// Build an annotated document for the subtree at `id`.
    fn pretty_doc(&self, id: NodeId) -> RcDoc<'static, Style>;

    /// Render the subtree at `id` with colors to any termcolor writer at the given width.
    fn pretty_render_to<W: WriteColor + Write>(
        &self,
        id: NodeId,
        width: usize,
        out: &mut W,
    ) -> io::Result<()>;

    /// Format the subtree at `id` into a plain string (no colors).
    fn pretty_string(&self, id: NodeId, width: usize) -> String;
}

impl PrettyQuery for QueryTree {
    #[inline]
    fn pretty_doc(&self, id: NodeId) -> RcDoc<'static, Style> {
        Printer { tree: self }.doc(id, 0)
    }

    fn pretty_render_to<W: WriteColor + Write>(
        &self,
        id: NodeId,
        width: usize,
        out: &mut W,
    ) -> io::Result<()> {
        let mut cw = ColorWriter { out };
        self.pretty_doc(id).render_raw(width, &mut cw)
    }

    fn pretty_string(&self, id: NodeId, width: usize) -> String {
        let mut buf = String::new();
        let _ = self.pretty_doc(id).render_fmt(width, &mut buf);
        buf
    }
}
