//! The interactive loop: read a line, hand it to the session, redraw.

use std::io::Write;
use std::ops::ControlFlow;

use log::debug;
use mossexpr::pretty::terminal_width;
use mosscore::prelude::*;
use rustyline::error::ReadlineError;
use rustyline::{Config as LineConfig, DefaultEditor};
use termcolor::{ColorChoice, StandardStream};

use crate::display::{self, LocalCommand};
use crate::error::ReplResult;

pub const PROMPT: &str = "moss> ";

pub struct Repl<S: MailStore, V: ResultViewer> {
    session: Session<S, V>,
    line_editor: DefaultEditor,
    out: StandardStream,
    indent: usize,
    /// Prompt of the parameter value the session is waiting for.
    pending: Option<String>,
}

impl<S: MailStore, V: ResultViewer> Repl<S, V> {
    pub fn new(session: Session<S, V>, config: &Config, color: ColorChoice) -> ReplResult<Self> {
        let line_config = LineConfig::builder()
            .auto_add_history(config.history)
            .build();
        Ok(Repl {
            session,
            line_editor: DefaultEditor::with_config(line_config)?,
            out: StandardStream::stdout(color),
            indent: config.indent,
            pending: None,
        })
    }

    pub fn session(&self) -> &Session<S, V> {
        &self.session
    }

    /// Run until `quit` or end of input.
    ///
    /// User mistakes are printed and the loop goes on; an internal error ends it.
    pub fn run(&mut self) -> ReplResult<()> {
        self.redraw()?;
        loop {
            let prompt = self.pending.as_deref().unwrap_or(PROMPT).to_string();
            let line = match self.line_editor.readline(&prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    // Ctrl-C drops a pending parameter input.
                    if self.pending.take().is_some() {
                        self.session.feed("")?;
                        self.redraw()?;
                    }
                    continue;
                }
                Err(ReadlineError::Eof) => return Ok(()),
                Err(err) => return Err(err.into()),
            };
            if self.step(&line)?.is_break() {
                return Ok(());
            }
        }
    }

    fn step(&mut self, line: &str) -> ReplResult<ControlFlow<()>> {
        if self.pending.is_none() {
            if let Some(local) = LocalCommand::parse(line) {
                self.local(local)?;
                return Ok(ControlFlow::Continue(()));
            }
        }

        self.pending = None;
        match self.session.feed(line) {
            Ok(Feedback::Quit) => return Ok(ControlFlow::Break(())),
            Ok(Feedback::Input(prompt)) => {
                self.pending = Some(prompt);
                return Ok(ControlFlow::Continue(()));
            }
            Ok(Feedback::Continue) => {}
            Err(err) if err.is_internal() => return Err(err.into()),
            Err(err) => {
                debug!("Command '{line}' failed: {err:?}");
                display::print_error(&mut self.out, &err)?;
            }
        }
        self.redraw()?;
        Ok(ControlFlow::Continue(()))
    }

    fn local(&mut self, command: LocalCommand) -> ReplResult<()> {
        match command {
            LocalCommand::Next => {
                self.session.editor_mut().select_next();
            }
            LocalCommand::Prev => {
                self.session.editor_mut().select_prev();
            }
            LocalCommand::Print => {
                let query = self.session.editor().query();
                display::print_pretty(&mut self.out, query, terminal_width())?;
                return Ok(());
            }
            LocalCommand::Help => {
                display::print_help(&mut self.out, self.session.registry())?;
                return Ok(());
            }
        }
        self.redraw()
    }

    fn redraw(&mut self) -> ReplResult<()> {
        writeln!(self.out)?;
        display::print_tree(&mut self.out, self.session.editor(), self.indent)?;
        display::print_status(&mut self.out, &self.session.status())?;
        Ok(())
    }
}
