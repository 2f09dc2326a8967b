use serde::{Deserialize, Serialize};

/// Role of a chat message on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction; only ever sent, never stored in a conversation.
    System,

    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

impl MessageRole {
    /// Lowercase name, as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A single role-tagged message.
///
/// Messages are immutable once built: the fields are private and there is no
/// way to edit content in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: MessageRole,
    content: String,
}

impl Message {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    pub(crate) fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// The role of this message.
    pub fn role(&self) -> MessageRole {
        self.role
    }

    /// The text of this message.
    pub fn content(&self) -> &str {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_role_and_content() {
        let json = serde_json::to_value(Message::user("How many push-ups?")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"role": "user", "content": "How many push-ups?"})
        );
        let json = serde_json::to_value(Message::system("rules")).unwrap();
        assert_eq!(json["role"], "system");
    }
}
