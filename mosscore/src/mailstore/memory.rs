use super::{MailStore, MessageIter, StoredMessage};

/// Messages held in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    messages: Vec<StoredMessage>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, raw: impl Into<Vec<u8>>) {
        self.messages.push(StoredMessage {
            key: key.into(),
            raw: raw.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl FromIterator<StoredMessage> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = StoredMessage>>(iter: I) -> Self {
        MemoryStore {
            messages: iter.into_iter().collect(),
        }
    }
}

impl MailStore for MemoryStore {
    fn messages(&self) -> MessageIter<'_> {
        Box::new(self.messages.iter().cloned().map(Ok))
    }
}
