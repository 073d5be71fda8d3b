//! Mosscore: the interactive side of moss.
//!
//! Layout
//!  - [`command`]: command line syntax and the closed command registry.
//!  - [`editor`]: the selection and the two-state edit protocol over a query tree.
//!  - [`session`]: search, export and the status line around an editor.
//!  - [`mailstore`], [`message`]: reading maildir and mbox mailboxes.
//!  - [`export`]: showing results in an external mail reader.
//!  - [`config`]: user configuration.

pub mod command;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod mailstore;
pub mod message;
pub mod session;

pub mod prelude {
    pub use crate::command::{Action, Builtin, Command, CommandLine, Edit, Registry};
    pub use crate::config::{ColorMode, Config};
    pub use crate::editor::{Editor, EditorState, Response};
    pub use crate::error::{MossError, MossResult};
    pub use crate::export::{ExternalViewer, ResultViewer};
    pub use crate::mailstore::{MailStore, Maildir, Mbox, MemoryStore, StoredMessage, open_mailbox};
    pub use crate::message::{ParsedMessage, decode_header_text};
    pub use crate::session::{Feedback, SearchResults, Session};
}
