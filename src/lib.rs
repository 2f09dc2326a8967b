// Public modules
pub mod chat;
pub mod client;
pub mod conversation;
pub mod error;
pub mod fetcher;
pub mod observability;
pub mod render;
pub mod reveal;
pub mod types;

// Re-exports
pub use client::{Completer, OpenRouter};
pub use conversation::Conversation;
pub use error::{Error, Result};
pub use fetcher::{Outcome, Reply, ReplyFetcher, RequestConfig, RetryPolicy};
pub use observability::register_biometrics;
pub use reveal::Reveal;
pub use types::*;
