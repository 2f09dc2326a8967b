//! Turning a conversation into an assistant reply.
//!
//! [`ReplyFetcher::fetch_reply`] never fails: every problem is folded into a
//! [`Reply`] whose [`Outcome`] says what happened and whose text is what the
//! conversation should record.

use std::time::Duration;

use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::client::{Completer, OpenRouter};
use crate::error::{Error, Result};
use crate::observability::{
    FETCH_MISSING_CREDENTIAL, FETCH_NETWORK_ERRORS, FETCH_RETRIES, FETCH_SUCCESS,
    FETCH_UNEXPECTED_ERRORS,
};
use crate::reveal::{Reveal, normalize_whitespace};
use crate::types::{ChatCompletionRequest, KnownModel, Message};

/// Text recorded when the transport fails.
pub const NETWORK_FALLBACK: &str = "Error: Connection issue - try again later";

/// Text recorded when anything else goes wrong.
pub const UNEXPECTED_FALLBACK: &str = "Error: Please check your input and try again";

/// Text shown when no credential is configured.
pub const MISSING_CREDENTIAL_NOTICE: &str = "🔑 API key required! Set one with /key or --api-key";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.6;

/// Default attempt budget.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Bounds for the sampling temperature.
pub const TEMPERATURE_RANGE: (f32, f32) = (0.0, 1.0);

/// Bounds for the attempt budget.
pub const MAX_RETRIES_RANGE: (u32, u32) = (1, 5);

/// Pause before re-issuing a retryable request under [`RetryPolicy::RetryTransient`].
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

////////////////////////////////////////////// RequestConfig /////////////////////////////////////

/// Settings for one outbound call.
///
/// Rebuilt from the current chat settings on every submission.  Construction
/// validates the ranges, so a `RequestConfig` always holds a temperature in
/// `[0.0, 1.0]` and an attempt budget in `[1, 5]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    credential: Option<String>,
    model: KnownModel,
    temperature: f32,
    max_retries: u32,
}

impl RequestConfig {
    /// Creates a config, rejecting out-of-range values.
    pub fn new(
        credential: Option<String>,
        model: KnownModel,
        temperature: f32,
        max_retries: u32,
    ) -> Result<Self> {
        validate_temperature(temperature)?;
        validate_max_retries(max_retries)?;
        Ok(Self {
            credential,
            model,
            temperature,
            max_retries,
        })
    }

    /// Creates a config, clamping out-of-range values into range.
    pub fn clamped(
        credential: Option<String>,
        model: KnownModel,
        temperature: f32,
        max_retries: u32,
    ) -> Self {
        Self {
            credential,
            model,
            temperature: clamp_temperature(temperature),
            max_retries: clamp_max_retries(max_retries),
        }
    }

    /// The credential, if a non-empty one is set.
    ///
    /// The key is sent exactly as entered.
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref().filter(|c| !c.is_empty())
    }

    /// The model to ask.
    pub fn model(&self) -> KnownModel {
        self.model
    }

    /// The sampling temperature.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// The attempt budget.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            credential: None,
            model: KnownModel::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Rejects temperatures outside `[0.0, 1.0]` (and NaN).
pub fn validate_temperature(temperature: f32) -> Result<f32> {
    let (min, max) = TEMPERATURE_RANGE;
    if temperature.is_finite() && (min..=max).contains(&temperature) {
        Ok(temperature)
    } else {
        Err(Error::validation(
            format!("expects a value between {min} and {max}"),
            Some("temperature".to_string()),
        ))
    }
}

/// Rejects attempt budgets outside `[1, 5]`.
pub fn validate_max_retries(max_retries: u32) -> Result<u32> {
    let (min, max) = MAX_RETRIES_RANGE;
    if (min..=max).contains(&max_retries) {
        Ok(max_retries)
    } else {
        Err(Error::validation(
            format!("expects an integer between {min} and {max}"),
            Some("max_retries".to_string()),
        ))
    }
}

/// Clamps a temperature into `[0.0, 1.0]`; NaN becomes the default.
pub fn clamp_temperature(temperature: f32) -> f32 {
    if temperature.is_nan() {
        DEFAULT_TEMPERATURE
    } else {
        temperature.clamp(TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1)
    }
}

/// Clamps an attempt budget into `[1, 5]`.
pub fn clamp_max_retries(max_retries: u32) -> u32 {
    max_retries.clamp(MAX_RETRIES_RANGE.0, MAX_RETRIES_RANGE.1)
}

////////////////////////////////////////////// Outcome ///////////////////////////////////////////

/// What happened to one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The API answered with a reply.
    Success,
    /// No credential was configured; nothing was sent.
    MissingCredential,
    /// The transport failed, timed out, or the API returned an error status.
    NetworkError {
        /// Human-readable detail.
        message: String,
    },
    /// Anything else: a request that could not be built or a reply that
    /// could not be understood.
    UnexpectedError {
        /// Human-readable detail.
        message: String,
    },
}

impl Outcome {
    fn from_error(err: &Error) -> Self {
        if err.is_missing_credential() {
            Outcome::MissingCredential
        } else if err.is_network() {
            Outcome::NetworkError {
                message: err.to_string(),
            }
        } else {
            Outcome::UnexpectedError {
                message: err.to_string(),
            }
        }
    }

    /// True for [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Detail to show in an inline error, if this outcome is an error.
    pub fn error_message(&self) -> Option<String> {
        match self {
            Outcome::Success => None,
            Outcome::MissingCredential => Some(MISSING_CREDENTIAL_NOTICE.to_string()),
            Outcome::NetworkError { message } => Some(format!("🌐 Network Error: {message}")),
            Outcome::UnexpectedError { message } => {
                Some(format!("❌ Unexpected error: {message}"))
            }
        }
    }
}

////////////////////////////////////////////// Reply /////////////////////////////////////////////

/// Result of [`ReplyFetcher::fetch_reply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    text: String,
    outcome: Outcome,
}

impl Reply {
    fn success(raw: &str) -> Self {
        Self {
            text: normalize_whitespace(raw),
            outcome: Outcome::Success,
        }
    }

    fn failure(outcome: Outcome) -> Self {
        let text = match outcome {
            Outcome::Success => String::new(),
            Outcome::MissingCredential => MISSING_CREDENTIAL_NOTICE.to_string(),
            Outcome::NetworkError { .. } => NETWORK_FALLBACK.to_string(),
            Outcome::UnexpectedError { .. } => UNEXPECTED_FALLBACK.to_string(),
        };
        Self { text, outcome }
    }

    /// The reply text, or the fallback text for an error outcome.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// What happened.
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// The message to record in the conversation.
    ///
    /// A missing credential aborts the turn, so it records nothing.
    pub fn to_message(&self) -> Option<Message> {
        match self.outcome {
            Outcome::MissingCredential => None,
            _ => Some(Message::assistant(self.text.clone())),
        }
    }

    /// The progressive reveal of the reply text.
    pub fn reveal(&self) -> Reveal {
        Reveal::new(&self.text)
    }
}

////////////////////////////////////////////// RetryPolicy ///////////////////////////////////////

/// How the attempt budget is spent.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Stop at the first outcome, success or error.  The attempt budget is
    /// an upper bound that a single attempt always satisfies.
    #[default]
    StopOnFirstOutcome,
    /// Re-issue the request after retryable network errors until the budget
    /// is spent.
    RetryTransient,
}

////////////////////////////////////////////// ReplyFetcher //////////////////////////////////////

/// Fetches assistant replies for a conversation.
pub struct ReplyFetcher<C: Completer = OpenRouter> {
    completer: C,
    retry_policy: RetryPolicy,
    retry_backoff: Duration,
}

impl<C: Completer> ReplyFetcher<C> {
    /// Creates a fetcher that sends requests through `completer`.
    pub fn new(completer: C) -> Self {
        Self {
            completer,
            retry_policy: RetryPolicy::default(),
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Sets the retry policy.
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Sets the pause before a retried request.
    pub fn with_retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    /// The retry policy in effect.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    /// Sets the retry policy in place.
    pub fn set_retry_policy(&mut self, retry_policy: RetryPolicy) {
        self.retry_policy = retry_policy;
    }

    /// The underlying completer.
    pub fn completer(&self) -> &C {
        &self.completer
    }

    /// Asks for the assistant's reply to `conversation`.
    ///
    /// Every outcome is logged before it is returned; error outcomes at
    /// error level.
    pub async fn fetch_reply(&self, conversation: &[Message], config: &RequestConfig) -> Reply {
        match self.try_fetch(conversation, config).await {
            Ok(raw) => {
                let reply = Reply::success(&raw);
                FETCH_SUCCESS.click();
                log::info!(
                    "reply from {} ({} words)",
                    config.model(),
                    reply.text().split(' ').filter(|w| !w.is_empty()).count()
                );
                reply
            }
            Err(err) => {
                let outcome = Outcome::from_error(&err);
                match &outcome {
                    Outcome::MissingCredential => {
                        FETCH_MISSING_CREDENTIAL.click();
                        log::error!("Missing credential: no request sent");
                    }
                    Outcome::NetworkError { message } => {
                        FETCH_NETWORK_ERRORS.click();
                        log::error!("Network Error: {message}");
                    }
                    Outcome::UnexpectedError { message } => {
                        FETCH_UNEXPECTED_ERRORS.click();
                        log::error!("Unexpected Error: {message}");
                    }
                    Outcome::Success => {}
                }
                Reply::failure(outcome)
            }
        }
    }

    async fn try_fetch(&self, conversation: &[Message], config: &RequestConfig) -> Result<String> {
        let credential = config.credential().ok_or_else(Error::missing_credential)?;
        let request = build_request(conversation, config, today());

        let mut attempt = 1;
        loop {
            let result = self.completer.complete(credential, &request).await;
            match result {
                Err(err)
                    if self.retry_policy == RetryPolicy::RetryTransient
                        && err.is_retryable()
                        && attempt < config.max_retries() =>
                {
                    FETCH_RETRIES.click();
                    log::warn!(
                        "attempt {attempt}/{} failed, retrying: {err}",
                        config.max_retries()
                    );
                    attempt += 1;
                    if !self.retry_backoff.is_zero() {
                        tokio::time::sleep(self.retry_backoff).await;
                    }
                }
                result => return result,
            }
        }
    }
}

/// Builds the outbound request: system instruction, then the conversation.
pub fn build_request(
    conversation: &[Message],
    config: &RequestConfig,
    date: Date,
) -> ChatCompletionRequest {
    let mut messages = Vec::with_capacity(conversation.len() + 1);
    messages.push(Message::system(system_instruction(date)));
    messages.extend(conversation.iter().cloned());
    ChatCompletionRequest {
        model: config.model(),
        messages,
        temperature: config.temperature(),
    }
}

/// The coaching rules sent ahead of every conversation.
pub fn system_instruction(date: Date) -> String {
    let format = format_description!("[month repr:long] [day], [year]");
    let date = date
        .format(&format)
        .unwrap_or_else(|_| date.to_string());
    format!(
        r#"You are a professional fitness coach chatbot for Streak Fitness Tracker. Follow these STRICT rules:
1. RESPOND ONLY IN PLAIN TEXT
2. NEVER USE JSON, MARKDOWN, OR CODE BLOCKS
3. ONLY answer questions related to fitness, workouts, health, diet, and motivation
4. If the query is NOT about fitness, say "I'm here only to talk about your fitness journey!"
5. Format all tips using hyphens (-) only
6. Be supportive and use friendly tone
7. Add line breaks for readability
8. Current date: {date}
"#
    )
}

fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}
