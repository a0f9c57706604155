//! Append-only message sequence owned by one orchestration call

use crate::llm::Message;

/// Ordered conversation. Messages can only be appended, or the last one
/// swapped out while it is still being assembled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Replace the last message, returning the previous one. Pushes when empty.
    pub fn replace_last(&mut self, message: Message) -> Option<Message> {
        match self.messages.last_mut() {
            Some(last) => Some(std::mem::replace(last, message)),
            None => {
                self.messages.push(message);
                None
            }
        }
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self::from_messages(messages)
    }
}
