use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use super::{MailStore, MessageIter, StoredMessage, mailbox_error};
use crate::error::MossResult;

/// A single-file mbox mailbox.
#[derive(Debug, Clone)]
pub struct Mbox {
    path: PathBuf,
}

impl Mbox {
    pub fn open(path: &Path) -> MossResult<Self> {
        if !path.is_file() {
            return Err(mailbox_error(path, "no such mbox file or maildir"));
        }
        Ok(Mbox {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MailStore for Mbox {
    fn messages(&self) -> MessageIter<'_> {
        match fs::read(&self.path) {
            Ok(data) => {
                let messages = split_mbox(&data);
                debug!("Mbox {} holds {} messages", self.path.display(), messages.len());
                Box::new(messages.into_iter().map(Ok))
            }
            Err(err) => Box::new(std::iter::once(Err(err.into()))),
        }
    }
}

fn is_blank(line: &[u8]) -> bool {
    line == b"\n" || line == b"\r\n"
}

/// Split mbox data into messages keyed by their 1-based position.
///
/// A message starts at a `From ` line found at the start of the data or right after a
/// blank line. The separator line and the blank line before it are dropped, and one
/// level of `>From ` quoting is removed.
pub fn split_mbox(data: &[u8]) -> Vec<StoredMessage> {
    let mut messages: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<Vec<u8>> = None;
    let mut previous_blank = true;

    for line in data.split_inclusive(|b| *b == b'\n') {
        if previous_blank && line.starts_with(b"From ") {
            if let Some(mut body) = current.take() {
                strip_trailing_blank(&mut body);
                messages.push(body);
            }
            current = Some(Vec::new());
            previous_blank = false;
            continue;
        }
        previous_blank = is_blank(line);

        let Some(body) = current.as_mut() else {
            continue;
        };
        let unquoted = match line.iter().position(|b| *b != b'>') {
            Some(n) if n > 0 && line[n..].starts_with(b"From ") => &line[1..],
            _ => line,
        };
        body.extend_from_slice(unquoted);
    }
    if let Some(mut body) = current {
        strip_trailing_blank(&mut body);
        messages.push(body);
    }

    messages
        .into_iter()
        .enumerate()
        .map(|(i, raw)| StoredMessage {
            key: (i + 1).to_string(),
            raw,
        })
        .collect()
}

/// Drop the blank line that separates a message from the next `From ` line.
fn strip_trailing_blank(body: &mut Vec<u8>) {
    if body.ends_with(b"\n\r\n") {
        body.truncate(body.len() - 2);
    } else if body.ends_with(b"\n\n") {
        body.truncate(body.len() - 1);
    }
}
