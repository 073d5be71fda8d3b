//! Read-only access to the messages of a mailbox.
//!
//! Messages are handed out as raw bytes; parsing is left to
//! [`ParsedMessage`](crate::message::ParsedMessage).

use std::path::Path;

use crate::error::{MossError, MossResult};

mod maildir;
mod mbox;
mod memory;

pub use maildir::Maildir;
pub use mbox::{Mbox, split_mbox};
pub use memory::MemoryStore;

/// One message as stored, with a key unique within its store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub key: String,
    pub raw: Vec<u8>,
}

pub type MessageIter<'a> = Box<dyn Iterator<Item = MossResult<StoredMessage>> + 'a>;

pub trait MailStore {
    /// Iterate over every message, in a stable order.
    fn messages(&self) -> MessageIter<'_>;
}

impl<S: MailStore + ?Sized> MailStore for Box<S> {
    fn messages(&self) -> MessageIter<'_> {
        (**self).messages()
    }
}

/// Open `path` as a maildir if it is a directory, as an mbox file otherwise.
pub fn open_mailbox(path: &Path) -> MossResult<Box<dyn MailStore>> {
    if path.is_dir() {
        Ok(Box::new(Maildir::open(path)?))
    } else {
        Ok(Box::new(Mbox::open(path)?))
    }
}

pub(crate) fn mailbox_error(path: &Path, reason: impl Into<String>) -> MossError {
    MossError::Mailbox {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}
