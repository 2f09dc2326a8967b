// Public modules
pub mod chat_completion;
pub mod message;
pub mod model;

// Re-exports
pub use chat_completion::{
    ChatCompletionChoice, ChatCompletionMessage, ChatCompletionRequest, ChatCompletionResponse,
};
pub use message::{Message, MessageRole};
pub use model::KnownModel;
