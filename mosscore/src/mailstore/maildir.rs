use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use super::{MailStore, MessageIter, StoredMessage, mailbox_error};
use crate::error::MossResult;

/// A maildir: messages are the regular files of `cur/` and `new/`.
#[derive(Debug, Clone)]
pub struct Maildir {
    path: PathBuf,
}

impl Maildir {
    pub fn open(path: &Path) -> MossResult<Self> {
        for sub in ["cur", "new"] {
            if !path.join(sub).is_dir() {
                return Err(mailbox_error(path, format!("not a maildir (missing '{sub}/')")));
            }
        }
        Ok(Maildir {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Message files of both subdirectories, sorted by file name.
    fn entries(&self) -> MossResult<Vec<(String, PathBuf)>> {
        let mut entries = Vec::new();
        for sub in ["cur", "new"] {
            for entry in fs::read_dir(self.path.join(sub))? {
                let entry = entry?;
                if !entry.file_type()?.is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                entries.push((name, entry.path()));
            }
        }
        entries.sort();
        debug!("Maildir {} holds {} messages", self.path.display(), entries.len());
        Ok(entries)
    }
}

impl MailStore for Maildir {
    fn messages(&self) -> MessageIter<'_> {
        let entries = match self.entries() {
            Ok(entries) => entries,
            Err(err) => return Box::new(std::iter::once(Err(err))),
        };
        Box::new(
            entries
                .into_iter()
                .map(|(key, path)| -> MossResult<StoredMessage> {
                    let raw = fs::read(&path)?;
                    Ok(StoredMessage { key, raw })
                }),
        )
    }
}
