//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`.
//! They stand in for the settings controls: they change the session without
//! sending anything to the API.  Values are validated here, so nothing out of
//! range ever reaches the fetcher.

use crate::fetcher::{validate_max_retries, validate_temperature};
use crate::types::KnownModel;

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Reset the conversation to the cleared notice.
    Clear,

    /// Print the conversation so far.
    History,

    /// Set the API key.
    Key(String),

    /// Forget the API key.
    ClearKey,

    /// Change the model.
    Model(KnownModel),

    /// List the selectable models.
    Models,

    /// Set the sampling temperature.
    Temperature(f32),

    /// Set the attempt budget.
    Retries(u32),

    /// Toggle retrying transient network errors.
    RetryTransient(bool),

    /// Show the current configuration.
    ShowConfig,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command (possibly an
/// invalid one), or `None` if it should be sent as a chat message.
///
/// # Examples
///
/// ```
/// # use streak::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/temperature 0.3").is_some());
/// assert!(parse_command("How do I start running?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, char::is_whitespace);
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "history" => ChatCommand::History,
        "key" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("clear") => ChatCommand::ClearKey,
            Some(arg) => ChatCommand::Key(arg.to_string()),
            None => ChatCommand::Invalid("/key requires an API key (or 'clear')".to_string()),
        },
        "model" => match argument {
            Some(arg) => match arg.parse::<KnownModel>() {
                Ok(model) => ChatCommand::Model(model),
                Err(err) => ChatCommand::Invalid(err.to_string()),
            },
            None => ChatCommand::Invalid("/model requires a model name".to_string()),
        },
        "models" => ChatCommand::Models,
        "temperature" | "temp" => match argument {
            Some(arg) => match arg.parse::<f32>() {
                Ok(value) => match validate_temperature(value) {
                    Ok(value) => ChatCommand::Temperature(value),
                    Err(_) => ChatCommand::Invalid(
                        "/temperature expects a value between 0 and 1".to_string(),
                    ),
                },
                Err(_) => {
                    ChatCommand::Invalid("/temperature expects a value between 0 and 1".to_string())
                }
            },
            None => ChatCommand::Invalid("/temperature requires a value".to_string()),
        },
        "retries" => match argument {
            Some(arg) => match arg.parse::<u32>() {
                Ok(value) => match validate_max_retries(value) {
                    Ok(value) => ChatCommand::Retries(value),
                    Err(_) => ChatCommand::Invalid(
                        "/retries expects an integer between 1 and 5".to_string(),
                    ),
                },
                Err(_) => {
                    ChatCommand::Invalid("/retries expects an integer between 1 and 5".to_string())
                }
            },
            None => ChatCommand::Invalid("/retries requires a value".to_string()),
        },
        "retry_transient" => match argument.and_then(parse_on_off) {
            Some(value) => ChatCommand::RetryTransient(value),
            None => ChatCommand::Invalid("/retry_transient expects 'on' or 'off'".to_string()),
        },
        "config" | "settings" => ChatCommand::ShowConfig,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /clear                 Clear the chat
  /history               Show the conversation so far
  /key <api-key>         Set the OpenRouter API key (use 'clear' to forget it)
                         Get a key at https://openrouter.ai/keys
  /model <name>          Choose the model (see /models)
  /models                List the available models
  /temperature <v>       Set response creativity 0.0-1.0
  /retries <n>           Set max retries 1-5
  /retry_transient on|off
                         Re-send after transient network errors
  /config                Show current settings
  /help                  Show this help message
  /quit                  Exit the chat"#
}
