//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved
//! settings the session reads on every submission.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::fetcher::{
    DEFAULT_MAX_RETRIES, DEFAULT_TEMPERATURE, RequestConfig, RetryPolicy, clamp_max_retries,
    clamp_temperature,
};
use crate::reveal::DEFAULT_CHUNK_DELAY;
use crate::types::KnownModel;

/// Environment variable consulted when no API key is passed on the command line.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Where to get an OpenRouter API key.
pub const API_KEYS_URL: &str = "https://openrouter.ai/keys";

/// Command-line arguments for the streak-chat tool.
#[derive(CommandLine, Debug, Default, Eq, PartialEq)]
pub struct ChatArgs {
    /// OpenRouter API key.
    #[arrrg(optional, "OpenRouter API key (default: $OPENROUTER_API_KEY)", "KEY")]
    pub api_key: Option<String>,

    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: deepseek/deepseek-r1-zero:free)", "MODEL")]
    pub model: Option<String>,

    /// Sampling temperature.
    #[arrrg(optional, "Response creativity 0.0-1.0 (default: 0.6)", "TEMP")]
    pub temperature: Option<String>,

    /// Attempt budget per message.
    #[arrrg(optional, "Max retries 1-5 (default: 2)", "N")]
    pub max_retries: Option<u32>,

    /// API root to send requests to.
    #[arrrg(optional, "API base URL (default: https://openrouter.ai/api/v1/)", "URL")]
    pub base_url: Option<String>,

    /// Pause between revealed words.
    #[arrrg(optional, "Milliseconds between revealed words (default: 30)", "MS")]
    pub chunk_delay_ms: Option<u64>,

    /// Re-send requests after transient network errors.
    #[arrrg(flag, "Retry transient network errors up to the max retries")]
    pub retry_transient: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// Holds the live values of the settings.  Everything here is in range:
/// command-line values are clamped on the way in, and slash commands reject
/// out-of-range values before they get here.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// API key, if one is known.
    pub credential: Option<String>,

    /// The model to use for generating responses.
    pub model: KnownModel,

    /// Sampling temperature in `[0.0, 1.0]`.
    pub temperature: f32,

    /// Attempt budget in `[1, 5]`.
    pub max_retries: u32,

    /// Optional override of the API root.
    pub base_url: Option<String>,

    /// Pause between revealed words.
    pub chunk_delay: Duration,

    /// How the attempt budget is spent.
    pub retry_policy: RetryPolicy,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - No API key
    /// - Model: deepseek/deepseek-r1-zero:free
    /// - Temperature: 0.6
    /// - Max retries: 2
    /// - Reveal delay: 30 ms
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            credential: None,
            model: KnownModel::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_retries: DEFAULT_MAX_RETRIES,
            base_url: None,
            chunk_delay: DEFAULT_CHUNK_DELAY,
            retry_policy: RetryPolicy::default(),
            use_color: true,
        }
    }

    /// Resolves command-line arguments, falling back to `env_credential` for
    /// the API key.
    ///
    /// Arguments that cannot be used are replaced by their defaults.  Each
    /// replacement is logged and returned as a notice for the user.
    pub fn resolve(args: ChatArgs, env_credential: Option<String>) -> (Self, Vec<String>) {
        let mut notices = Vec::new();
        let model = match args.model.as_deref().map(str::parse::<KnownModel>) {
            Some(Ok(model)) => model,
            Some(Err(err)) => {
                notices.push(format!("{err}; using {}", KnownModel::default()));
                KnownModel::default()
            }
            None => KnownModel::default(),
        };
        let temperature = match args.temperature.as_deref().map(|t| t.trim().parse::<f32>()) {
            Some(Ok(temperature)) => clamp_temperature(temperature),
            Some(Err(_)) => {
                notices.push(format!(
                    "--temperature expects a number between 0 and 1; using {DEFAULT_TEMPERATURE}"
                ));
                DEFAULT_TEMPERATURE
            }
            None => DEFAULT_TEMPERATURE,
        };
        for notice in &notices {
            log::warn!("{notice}");
        }
        let credential = args.api_key.or(env_credential).filter(|key| !key.is_empty());

        let config = ChatConfig {
            credential,
            model,
            temperature,
            max_retries: clamp_max_retries(args.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)),
            base_url: args.base_url,
            chunk_delay: args
                .chunk_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_CHUNK_DELAY),
            retry_policy: if args.retry_transient {
                RetryPolicy::RetryTransient
            } else {
                RetryPolicy::StopOnFirstOutcome
            },
            use_color: !args.no_color,
        };
        (config, notices)
    }

    /// Sets the API key.
    pub fn with_credential(mut self, credential: Option<String>) -> Self {
        self.credential = credential;
        self
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: KnownModel) -> Self {
        self.model = model;
        self
    }

    /// Sets the sampling temperature, clamped into range.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = clamp_temperature(temperature);
        self
    }

    /// Sets the attempt budget, clamped into range.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = clamp_max_retries(max_retries);
        self
    }

    /// Sets the API root.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    /// Sets the pause between revealed words.
    pub fn with_chunk_delay(mut self, chunk_delay: Duration) -> Self {
        self.chunk_delay = chunk_delay;
        self
    }

    /// Sets the retry policy.
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Snapshot of the settings for one outbound call.
    pub fn request_config(&self) -> RequestConfig {
        RequestConfig::clamped(
            self.credential.clone(),
            self.model,
            self.temperature,
            self.max_retries,
        )
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        Self::resolve(args, std::env::var(API_KEY_ENV).ok()).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert!(config.credential.is_none());
        assert_eq!(config.model, KnownModel::DeepSeekR1ZeroFree);
        assert_eq!(config.temperature, 0.6);
        assert_eq!(config.max_retries, 2);
        assert!(config.base_url.is_none());
        assert_eq!(config.chunk_delay, Duration::from_millis(30));
        assert_eq!(config.retry_policy, RetryPolicy::StopOnFirstOutcome);
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_defaults() {
        let (config, notices) = ChatConfig::resolve(ChatArgs::default(), None);
        assert_eq!(config, ChatConfig::new());
        assert!(notices.is_empty());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            api_key: Some("sk-or-flag".to_string()),
            model: Some("google/palm-2-chat-bison".to_string()),
            temperature: Some("0.2".to_string()),
            max_retries: Some(4),
            base_url: Some("http://localhost:9999/v1/".to_string()),
            chunk_delay_ms: Some(0),
            retry_transient: true,
            no_color: true,
        };
        let (config, notices) = ChatConfig::resolve(args, Some("sk-or-env".to_string()));
        assert!(notices.is_empty());
        assert_eq!(config.credential.as_deref(), Some("sk-or-flag"));
        assert_eq!(config.model, KnownModel::Palm2ChatBison);
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:9999/v1/"));
        assert_eq!(config.chunk_delay, Duration::ZERO);
        assert_eq!(config.retry_policy, RetryPolicy::RetryTransient);
        assert!(!config.use_color);
    }

    #[test]
    fn env_credential_is_a_fallback() {
        let (config, _) = ChatConfig::resolve(ChatArgs::default(), Some("sk-or-env".to_string()));
        assert_eq!(config.credential.as_deref(), Some("sk-or-env"));
        let (config, _) = ChatConfig::resolve(ChatArgs::default(), Some(String::new()));
        assert!(config.credential.is_none());
        let args = ChatArgs {
            api_key: Some(String::new()),
            ..ChatArgs::default()
        };
        let (config, _) = ChatConfig::resolve(args, Some("sk-or-env".to_string()));
        assert!(config.credential.is_none());
    }

    #[test]
    fn out_of_range_args_are_clamped() {
        let args = ChatArgs {
            temperature: Some("7.5".to_string()),
            max_retries: Some(0),
            model: Some("unknown/model".to_string()),
            ..ChatArgs::default()
        };
        let (config, notices) = ChatConfig::resolve(args, None);
        assert_eq!(config.temperature, 1.0);
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.model, KnownModel::default());
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("unknown model"));
        assert!(notices[0].contains("deepseek/deepseek-r1-zero:free"));
    }

    #[test]
    fn unparsable_temperature_uses_default() {
        let args = ChatArgs {
            temperature: Some("warm".to_string()),
            ..ChatArgs::default()
        };
        let (config, notices) = ChatConfig::resolve(args, None);
        assert_eq!(config.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(notices.len(), 1);
        assert!(notices[0].starts_with("--temperature expects a number"));

        let args = ChatArgs {
            temperature: Some(" 0.35 ".to_string()),
            ..ChatArgs::default()
        };
        let (config, notices) = ChatConfig::resolve(args, None);
        assert_eq!(config.temperature, 0.35);
        assert!(notices.is_empty());
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_credential(Some("sk".to_string()))
            .with_model(KnownModel::Palm2ChatBison)
            .with_temperature(-1.0)
            .with_max_retries(10)
            .with_chunk_delay(Duration::from_millis(5))
            .with_retry_policy(RetryPolicy::RetryTransient)
            .without_color();
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_retries, 5);

        let request = config.request_config();
        assert_eq!(request.credential(), Some("sk"));
        assert_eq!(request.model(), KnownModel::Palm2ChatBison);
        assert_eq!(request.temperature(), 0.0);
        assert_eq!(request.max_retries(), 5);
    }
}
