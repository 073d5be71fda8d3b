//! Colored, line-oriented display of the query being edited.

use std::io::{self, IsTerminal, Write};

use mossexpr::pretty::{PrettyQuery, Style};
use mossexpr::tree::QueryTree;
use mosscore::prelude::*;
use termcolor::{Color, ColorChoice, ColorSpec, WriteColor};

/// Marker in front of the selected line, readable without colors.
pub const SELECTION_MARKER: &str = "> ";

/// Commands handled by the terminal itself rather than the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCommand {
    Next,
    Prev,
    Print,
    Help,
}

impl LocalCommand {
    pub fn parse(line: &str) -> Option<LocalCommand> {
        match line.trim() {
            "j" => Some(LocalCommand::Next),
            "k" => Some(LocalCommand::Prev),
            "print" => Some(LocalCommand::Print),
            "help" | "?" => Some(LocalCommand::Help),
            _ => None,
        }
    }
}

pub fn color_choice(mode: ColorMode, no_color: bool) -> ColorChoice {
    match mode {
        _ if no_color => ColorChoice::Never,
        ColorMode::Always => ColorChoice::Always,
        ColorMode::Never => ColorChoice::Never,
        ColorMode::Auto if io::stdout().is_terminal() => ColorChoice::Auto,
        ColorMode::Auto => ColorChoice::Never,
    }
}

/// One line per node in display order, `indent` spaces per level.
pub fn print_tree<W: WriteColor>(out: &mut W, editor: &Editor, indent: usize) -> io::Result<()> {
    let query = editor.query();
    for line in query.render() {
        let selected = line.node == editor.selected();
        let marker = if selected { SELECTION_MARKER } else { "  " };
        write!(out, "{marker}{:width$}", "", width = line.indent * indent)?;

        let mut spec = query
            .get(line.node)
            .map(|node| Style::for_variant(node.variant()).to_color_spec())
            .unwrap_or_default();
        if selected {
            spec.set_bg(Some(Color::Blue));
        }
        out.set_color(&spec)?;
        write!(out, "{}", line.label)?;
        out.reset()?;
        writeln!(out)?;
    }
    Ok(())
}

pub fn print_status<W: WriteColor>(out: &mut W, status: &str) -> io::Result<()> {
    if status.is_empty() {
        return Ok(());
    }
    let mut spec = ColorSpec::new();
    spec.set_dimmed(true);
    out.set_color(&spec)?;
    write!(out, "[{status}]")?;
    out.reset()?;
    writeln!(out)
}

pub fn print_error<W: WriteColor>(out: &mut W, err: &MossError) -> io::Result<()> {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Red)).set_intense(true);
    out.set_color(&spec)?;
    write!(out, "Error: {err}")?;
    out.reset()?;
    writeln!(out)
}

/// The whole query as one infix expression, wrapped at `width`.
pub fn print_pretty<W: WriteColor>(out: &mut W, query: &QueryTree, width: usize) -> io::Result<()> {
    query.pretty_render_to(query.root(), width, out)?;
    writeln!(out)
}

pub fn print_help<W: WriteColor>(out: &mut W, registry: &Registry) -> io::Result<()> {
    let mut spec = ColorSpec::new();
    spec.set_bold(true);
    let local = [
        ("j", "select the next line"),
        ("k", "select the previous line"),
        ("print", "show the query as a single expression"),
        ("help", "list commands"),
    ];
    let commands = registry.help();
    let rows = local
        .iter()
        .map(|(word, text)| (*word, text.to_string()))
        .chain(commands);

    for (word, text) in rows {
        out.set_color(&spec)?;
        write!(out, "  {word:<12}")?;
        out.reset()?;
        writeln!(out, "{text}")?;
    }
    writeln!(out, "  Prefix a command with r, repl or replace to overwrite the selection.")
}
