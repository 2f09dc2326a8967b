//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation
//! and drives one turn at a time: record the user's message, fetch the reply,
//! reveal it, record it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;

use crate::chat::config::ChatConfig;
use crate::client::{Completer, OpenRouter};
use crate::conversation::Conversation;
use crate::error::Result;
use crate::fetcher::{Outcome, ReplyFetcher, RetryPolicy};
use crate::observability::{SESSION_CLEARS, SESSION_TURNS};
use crate::render::Renderer;
use crate::types::{KnownModel, Message};

/// A chat session that manages conversation state and API interactions.
///
/// The conversation starts with the greeting and is only ever appended to,
/// except by [`ChatSession::clear`].
pub struct ChatSession<C: Completer = OpenRouter> {
    fetcher: ReplyFetcher<C>,
    config: ChatConfig,
    conversation: Conversation,
    turns: u64,
    failed_turns: u64,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: KnownModel,
    /// The number of messages in the conversation.
    pub message_count: usize,
    /// The sampling temperature.
    pub temperature: f32,
    /// The attempt budget.
    pub max_retries: u32,
    /// How the attempt budget is spent.
    pub retry_policy: RetryPolicy,
    /// Whether an API key is set.
    pub has_credential: bool,
    /// Number of messages submitted.
    pub turns: u64,
    /// Number of submissions that did not end in a reply from the API.
    pub failed_turns: u64,
}

impl ChatSession<OpenRouter> {
    /// Creates a new chat session against OpenRouter.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL does not parse or the HTTP
    /// client cannot be built.
    pub fn new(config: ChatConfig) -> Result<Self> {
        let client = OpenRouter::with_options(config.base_url.as_deref(), None)?;
        Ok(Self::with_completer(client, config))
    }
}

impl<C: Completer> ChatSession<C> {
    /// Creates a new chat session that sends requests through `completer`.
    pub fn with_completer(completer: C, config: ChatConfig) -> Self {
        let fetcher = ReplyFetcher::new(completer).with_retry_policy(config.retry_policy);
        Self {
            fetcher,
            config,
            conversation: Conversation::new(),
            turns: 0,
            failed_turns: 0,
        }
    }

    /// Submits one user message and reveals the reply.
    ///
    /// This method:
    /// 1. Appends the user message to the conversation
    /// 2. Fetches the reply with the current settings
    /// 3. Prints an inline error if the fetch failed
    /// 4. Reveals the reply text word by word
    /// 5. Appends the reply to the conversation
    ///
    /// A missing API key stops after step 3, leaving the user message in
    /// place.  Setting `interrupted` stops the reveal early; the full reply is
    /// still recorded.
    pub async fn submit(
        &mut self,
        user_input: &str,
        renderer: &mut dyn Renderer,
        interrupted: Arc<AtomicBool>,
    ) -> Outcome {
        SESSION_TURNS.click();
        self.turns += 1;
        self.conversation.append(Message::user(user_input));

        let request = self.config.request_config();
        let reply = self
            .fetcher
            .fetch_reply(self.conversation.snapshot(), &request)
            .await;

        if let Some(error) = reply.outcome().error_message() {
            self.failed_turns += 1;
            renderer.print_error(&error);
        }

        let Some(message) = reply.to_message() else {
            return reply.outcome().clone();
        };

        renderer.start_reply();
        let chunks = reply.reveal().stream(self.config.chunk_delay);
        futures::pin_mut!(chunks);
        let mut completed = true;
        while let Some((prefix, is_final)) = chunks.next().await {
            if interrupted.load(Ordering::Relaxed) {
                renderer.print_interrupted();
                completed = false;
                break;
            }
            renderer.print_chunk(&prefix, is_final);
        }
        if completed {
            renderer.finish_reply();
        }

        self.conversation.append(message);
        reply.outcome().clone()
    }

    /// Resets the conversation to the cleared notice.
    pub fn clear(&mut self) {
        SESSION_CLEARS.click();
        self.conversation.reset();
    }

    /// The conversation so far.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }

    /// The live settings.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Sets the API key; an empty key clears it.
    pub fn set_credential(&mut self, credential: impl Into<String>) {
        self.config.credential = Some(credential.into()).filter(|c| !c.is_empty());
    }

    /// Forgets the API key.
    pub fn clear_credential(&mut self) {
        self.config.credential = None;
    }

    /// Returns true if an API key is set.
    pub fn has_credential(&self) -> bool {
        self.config.credential.is_some()
    }

    /// Changes the model used for responses.
    pub fn set_model(&mut self, model: KnownModel) {
        self.config.model = model;
    }

    /// Returns the current model.
    pub fn model(&self) -> KnownModel {
        self.config.model
    }

    /// Sets the sampling temperature.
    ///
    /// # Errors
    ///
    /// Returns a validation error for values outside `[0.0, 1.0]`.
    pub fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        self.config.temperature = crate::fetcher::validate_temperature(temperature)?;
        Ok(())
    }

    /// Sets the attempt budget.
    ///
    /// # Errors
    ///
    /// Returns a validation error for values outside `[1, 5]`.
    pub fn set_max_retries(&mut self, max_retries: u32) -> Result<()> {
        self.config.max_retries = crate::fetcher::validate_max_retries(max_retries)?;
        Ok(())
    }

    /// Sets the retry policy.
    pub fn set_retry_policy(&mut self, retry_policy: RetryPolicy) {
        self.config.retry_policy = retry_policy;
        self.fetcher.set_retry_policy(retry_policy);
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model,
            message_count: self.message_count(),
            temperature: self.config.temperature,
            max_retries: self.config.max_retries,
            retry_policy: self.fetcher.retry_policy(),
            has_credential: self.has_credential(),
            turns: self.turns,
            failed_turns: self.failed_turns,
        }
    }
}
