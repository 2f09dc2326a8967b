//! In-memory conversation history for a single chat session.

use std::slice;

use crate::types::Message;

/// Greeting every new conversation starts with.
pub const GREETING: &str = "Hey there! 👋 I’m your Streak Fitness Tracker. Ask me anything about workouts, diet, or fitness progress!";

/// Notice a conversation is reseeded with when it is cleared.
pub const CLEARED_NOTICE: &str = "Chat cleared! Ready to help with your fitness journey! 💪";

/// Ordered, append-only sequence of messages.
///
/// The only mutations are [`Conversation::append`] and
/// [`Conversation::reset`]; stored messages are never edited.  A conversation
/// is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Creates a conversation seeded with the assistant greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
        }
    }

    /// Adds `message` to the end of the conversation.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Replaces the whole history with the single cleared notice.
    pub fn reset(&mut self) {
        self.messages = vec![Message::assistant(CLEARED_NOTICE)];
    }

    /// Returns the current messages, oldest first.
    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Iterates the messages, oldest first.
    pub fn iter(&self) -> slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
