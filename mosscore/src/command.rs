//! Command line parsing and the command registry.
//!
//! A command line is a sequence of whitespace separated words, where a word may be
//! double-quoted to contain spaces. Accepted shapes are `cmd`, `cmd arg`, `r cmd` and
//! `r cmd arg`, the leading `r` (also `repl` or `replace`) forcing replacement of a
//! non-placeholder node.

use std::collections::HashMap;

use chumsky::prelude::*;
use log::debug;
use mossexpr::variant::Variant;
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::error::{MossError, MossResult};

/// Words that force replacement when they prefix a command.
pub const FORCE_PREFIXES: [&str; 3] = ["r", "repl", "replace"];

/// Tree edits, carried out by the [`Editor`](crate::editor::Editor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edit {
    /// Build a node of the given variant at the selection.
    Create(Variant),
    Remove,
    Modify,
    More,
    Expand,
}

/// Commands that are not tree edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, IntoStaticStr)]
pub enum Builtin {
    #[strum(serialize = "quit")]
    Quit,
    #[strum(serialize = "search")]
    Search,
    #[strum(serialize = "show")]
    Show,
    #[strum(serialize = "show!")]
    ShowForced,
    #[strum(serialize = "rm")]
    Remove,
    #[strum(serialize = "mod")]
    Modify,
    #[strum(serialize = "more")]
    More,
    #[strum(serialize = "expand")]
    Expand,
}

impl Builtin {
    pub fn summary(self) -> &'static str {
        match self {
            Builtin::Quit => "leave moss",
            Builtin::Search => "evaluate the query over every message",
            Builtin::Show => "open the last results in the viewer",
            Builtin::ShowForced => "open the last results even if the query changed",
            Builtin::Remove => "remove the selected expression",
            Builtin::Modify => "set the parameter of the selected expression",
            Builtin::More => "add a value to the enclosing quantifier",
            Builtin::Expand => "replace the selected quantifier by its expansion",
        }
    }
}

/// What a command word resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Edit(Edit),
    Search,
    Show { force: bool },
    Quit,
}

impl From<Builtin> for Action {
    fn from(builtin: Builtin) -> Self {
        match builtin {
            Builtin::Quit => Action::Quit,
            Builtin::Search => Action::Search,
            Builtin::Show => Action::Show { force: false },
            Builtin::ShowForced => Action::Show { force: true },
            Builtin::Remove => Action::Edit(Edit::Remove),
            Builtin::Modify => Action::Edit(Edit::Modify),
            Builtin::More => Action::Edit(Edit::More),
            Builtin::Expand => Action::Edit(Edit::Expand),
        }
    }
}

/// A parsed, resolved command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub force: bool,
    pub action: Action,
    pub arg: Option<String>,
}

/// Raw shape of a command line, before the command word is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    Blank,
    Command {
        force: bool,
        name: String,
        arg: Option<String>,
    },
}

fn words<'a>() -> impl Parser<'a, &'a str, Vec<String>, extra::Err<Rich<'a, char>>> {
    let quoted = none_of('"')
        .repeated()
        .to_slice()
        .delimited_by(just('"'), just('"'))
        .map(str::to_string);
    let bare = any()
        .filter(|c: &char| !c.is_whitespace() && *c != '"')
        .repeated()
        .at_least(1)
        .to_slice()
        .map(str::to_string);

    quoted
        .or(bare)
        .padded()
        .repeated()
        .collect::<Vec<_>>()
        .padded()
}

impl CommandLine {
    pub fn parse(line: &str) -> MossResult<CommandLine> {
        let words = words()
            .then_ignore(end())
            .parse(line)
            .into_result()
            .map_err(|errs| {
                MossError::SyntaxError(
                    errs.into_iter()
                        .map(|e| e.to_string())
                        .collect::<Vec<_>>()
                        .join("; "),
                )
            })?;

        let is_force = |word: &str| FORCE_PREFIXES.contains(&word);
        let mut words = words.into_iter();
        let parsed = match (words.next(), words.next(), words.next(), words.next()) {
            (None, ..) => CommandLine::Blank,
            (Some(name), None, ..) => CommandLine::Command {
                force: false,
                name,
                arg: None,
            },
            (Some(prefix), Some(name), None, _) if is_force(&prefix) => CommandLine::Command {
                force: true,
                name,
                arg: None,
            },
            (Some(name), Some(arg), None, _) => CommandLine::Command {
                force: false,
                name,
                arg: Some(arg),
            },
            (Some(prefix), Some(name), Some(arg), None) if is_force(&prefix) => {
                CommandLine::Command {
                    force: true,
                    name,
                    arg: Some(arg),
                }
            }
            _ => return Err(MossError::SyntaxError(line.trim().to_string())),
        };
        Ok(parsed)
    }
}

/// Closed mapping from command words to actions, built once per session.
#[derive(Debug, Clone)]
pub struct Registry {
    commands: HashMap<&'static str, Action>,
}

impl Registry {
    pub fn new() -> Self {
        let mut commands: HashMap<&'static str, Action> = HashMap::new();
        for builtin in Builtin::iter() {
            commands.insert(builtin.into(), builtin.into());
        }
        for variant in Variant::iter() {
            commands.insert(variant.command(), Action::Edit(Edit::Create(variant)));
        }
        Registry { commands }
    }

    pub fn lookup(&self, name: &str) -> Option<Action> {
        self.commands.get(name).copied()
    }

    /// Parse and resolve a command line; `None` for a blank line.
    pub fn parse(&self, line: &str) -> MossResult<Option<Command>> {
        match CommandLine::parse(line)? {
            CommandLine::Blank => Ok(None),
            CommandLine::Command { force, name, arg } => {
                let action = self
                    .lookup(&name)
                    .ok_or_else(|| MossError::UnknownCommand(line.trim().to_string()))?;
                debug!("Parsed command '{name}' (force: {force}, arg: {arg:?})");
                Ok(Some(Command { force, action, arg }))
            }
        }
    }

    /// Every command word with a one-line description, sorted by word.
    pub fn help(&self) -> Vec<(&'static str, String)> {
        let mut lines: Vec<(&'static str, String)> = self
            .commands
            .iter()
            .map(|(word, action)| {
                let text = match action {
                    Action::Edit(Edit::Create(variant)) => {
                        let types: Vec<String> =
                            variant.possible_types().iter().map(|t| t.to_string()).collect();
                        format!("create '{word}' ({})", types.join(", "))
                    }
                    _ => Builtin::iter()
                        .find(|b| <&'static str>::from(*b) == *word)
                        .map(|b| b.summary().to_string())
                        .unwrap_or_default(),
                };
                (*word, text)
            })
            .collect();
        lines.sort();
        lines
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}
