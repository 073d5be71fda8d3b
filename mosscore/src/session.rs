//! One interactive session: the editor, a mail store, a viewer and the last results.

use log::{debug, info, warn};
use mossexpr::eval::matches;

use crate::command::{Action, Registry};
use crate::editor::{Editor, EditorState, Response};
use crate::error::{MossError, MossResult};
use crate::export::ResultViewer;
use crate::mailstore::{MailStore, StoredMessage};
use crate::message::ParsedMessage;

/// Messages matched by a search, and the query revision they were computed for.
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub messages: Vec<StoredMessage>,
    pub revision: u64,
}

/// What the front-end should do after a line was fed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Continue,
    /// The next line is a parameter value; show this prompt.
    Input(String),
    Quit,
}

pub struct Session<S: MailStore, V: ResultViewer> {
    editor: Editor,
    registry: Registry,
    store: S,
    viewer: V,
    results: Option<SearchResults>,
}

impl<S: MailStore, V: ResultViewer> Session<S, V> {
    pub fn new(store: S, viewer: V) -> Self {
        Session {
            editor: Editor::new(),
            registry: Registry::new(),
            store,
            viewer,
            results: None,
        }
    }

    #[inline]
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Selection moves only; use [`Session::feed`] for edits.
    #[inline]
    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[inline]
    pub fn viewer(&self) -> &V {
        &self.viewer
    }

    pub fn results(&self) -> Option<&SearchResults> {
        self.results.as_ref()
    }

    /// `None` before the first search, else whether the query is unchanged since.
    pub fn results_fresh(&self) -> Option<bool> {
        self.results
            .as_ref()
            .map(|r| r.revision == self.editor.revision())
    }

    /// Process one line of input: a parameter value when the editor asked for one, a
    /// command otherwise.
    pub fn feed(&mut self, line: &str) -> MossResult<Feedback> {
        if matches!(self.editor.state(), EditorState::AwaitingParameter { .. }) {
            self.editor.feed_input(line)?;
            return Ok(Feedback::Continue);
        }

        let response = match self.registry.parse(line)? {
            None => self.editor.apply_default()?,
            Some(command) => match command.action {
                Action::Quit => return Ok(Feedback::Quit),
                Action::Search => {
                    self.search()?;
                    Response::Done
                }
                Action::Show { force } => {
                    self.show(force)?;
                    Response::Done
                }
                Action::Edit(edit) => {
                    self.editor
                        .apply(edit, command.force, command.arg.as_deref())?
                }
            },
        };
        Ok(match response.prompt() {
            Some(prompt) => Feedback::Input(prompt),
            None => Feedback::Continue,
        })
    }

    /// Evaluate the query over every message of the store, replacing the results.
    ///
    /// Messages that cannot be read or parsed are logged and count as non-matching.
    pub fn search(&mut self) -> MossResult<usize> {
        let query = self.editor.query();
        if !query.is_complete(query.root()) {
            return Err(mossexpr::error::ExprError::IncompleteQuery.into());
        }
        query.check_bindings(query.root())?;

        let mut found = Vec::new();
        let mut scanned = 0usize;
        for stored in self.store.messages() {
            let stored = match stored {
                Ok(stored) => stored,
                Err(err) => {
                    warn!("Skipping unreadable message: {err}");
                    continue;
                }
            };
            scanned += 1;
            let hit = match ParsedMessage::parse(&stored.raw) {
                Ok(message) => matches(query, &message)?,
                Err(err) => {
                    warn!("Skipping message {}: {err}", stored.key);
                    false
                }
            };
            if hit {
                found.push(stored);
            }
        }

        info!("Search matched {} of {scanned} messages", found.len());
        let count = found.len();
        self.results = Some(SearchResults {
            messages: found,
            revision: self.editor.revision(),
        });
        Ok(count)
    }

    /// Hand the last results to the viewer.
    pub fn show(&mut self, force: bool) -> MossResult<()> {
        let results = self.results.as_ref().ok_or(MossError::NoResults)?;
        if results.revision != self.editor.revision() && !force {
            return Err(MossError::StaleResults);
        }
        debug!("Exporting {} messages", results.messages.len());
        self.viewer.show(&results.messages)
    }

    pub fn status(&self) -> String {
        let complete = self.editor.is_complete();
        match (&self.results, self.results_fresh(), complete) {
            (None, _, true) => String::new(),
            (None, _, false) => "query incomplete".to_string(),
            (Some(r), Some(true), _) => format!("{} messages found", r.messages.len()),
            (Some(r), _, true) => {
                format!("query changed (previously: {} messages found)", r.messages.len())
            }
            (Some(r), _, false) => format!(
                "query changed and incomplete (was: {} messages found)",
                r.messages.len()
            ),
        }
    }
}
