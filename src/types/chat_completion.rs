use serde::{Deserialize, Serialize};

use crate::types::{KnownModel, Message};

/// Body of a `POST chat/completions` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    /// The model that should answer.
    pub model: KnownModel,

    /// System instruction followed by the conversation, oldest first.
    pub messages: Vec<Message>,

    /// Sampling temperature in `[0.0, 1.0]`.
    pub temperature: f32,
}

/// The parts of a chat-completions response the client reads.
///
/// Extra fields (ids, usage, provider metadata) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatCompletionResponse {
    /// Candidate completions; only the first is used.
    pub choices: Vec<ChatCompletionChoice>,
}

/// One candidate completion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatCompletionChoice {
    /// The generated message.
    pub message: ChatCompletionMessage,
}

/// The generated message of a choice.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatCompletionMessage {
    /// Generated text.
    pub content: String,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if there is one.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}
