//! Conversation history with turn checkpoints

use crate::types::Message;

/// Position in the history a turn can be rolled back to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Ordered, append-only message log
///
/// The only way to remove messages is `rollback_to`, and a configured system
/// prompt is never removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationHistory {
    messages: Vec<Message>,
    pinned: usize,
}

impl ConversationHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history seeded with a system prompt
    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(prompt)],
            pinned: 1,
        }
    }

    /// Create a history from earlier messages
    ///
    /// A leading system message is pinned like one from `with_system_prompt`.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        let pinned = match messages.first() {
            Some(Message::System { .. }) => 1,
            _ => 0,
        };
        Self { messages, pinned }
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Mark the current end of the history
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.messages.len())
    }

    /// Drop everything appended after `checkpoint`
    pub fn rollback_to(&mut self, checkpoint: Checkpoint) {
        self.messages.truncate(checkpoint.0.max(self.pinned));
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
