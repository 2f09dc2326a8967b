//! Interactive fitness coach chat.
//!
//! This binary provides a REPL interface for chatting with the Streak coach
//! through the OpenRouter API.
//!
//! # Usage
//!
//! ```bash
//! # Key from the environment
//! OPENROUTER_API_KEY=sk-or-... streak-chat
//!
//! # Choose a model and temperature
//! streak-chat --api-key sk-or-... --model google/palm-2-chat-bison --temperature 0.3
//!
//! # Disable colors (useful for piping output)
//! streak-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/clear` - Clear the chat
//! - `/key <api-key>` - Set the API key
//! - `/model <name>` - Change the model
//! - `/temperature <v>` - Set response creativity
//! - `/retries <n>` - Set max retries
//! - `/quit` - Exit the application
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use streak::KnownModel;
use streak::RetryPolicy;
use streak::chat::{
    API_KEY_ENV, API_KEYS_URL, ChatArgs, ChatCommand, ChatConfig, ChatSession,
    PlainTextRenderer, Renderer, help_text, parse_command,
};

const TITLE: &str = "💪 Streak Fitness Tracker";
const CAPTION: &str = "Track your streaks, get fitness tips, and stay motivated!";

/// Main entry point for the streak-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();

    let (args, _) = ChatArgs::from_command_line_relaxed("streak-chat [OPTIONS]");
    let (config, notices) = ChatConfig::resolve(args, std::env::var(API_KEY_ENV).ok());
    let use_color = config.use_color;

    let mut session = ChatSession::new(config)?;
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    // Flag for interrupt handling during the reveal
    let interrupted = Arc::new(AtomicBool::new(false));

    // Set up Ctrl+C handler
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    for notice in &notices {
        renderer.print_error(notice);
    }

    println!("{TITLE}");
    println!("{CAPTION}");
    println!("Type /help for commands, /quit to exit\n");
    for message in session.conversation() {
        renderer.print_message(message);
    }
    if !session.has_credential() {
        renderer.print_info(&format!(
            "No API key set. Use /key <api-key> or --api-key to add one. Get a key at {API_KEYS_URL}"
        ));
    }

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye! Keep the streak alive!");
                            break;
                        }
                        ChatCommand::Clear => {
                            session.clear();
                            for message in session.conversation() {
                                renderer.print_message(message);
                            }
                        }
                        ChatCommand::History => {
                            for message in session.conversation() {
                                renderer.print_message(message);
                            }
                        }
                        ChatCommand::Key(key) => {
                            session.set_credential(key);
                            renderer.print_info("API key set.");
                        }
                        ChatCommand::ClearKey => {
                            session.clear_credential();
                            renderer.print_info("API key cleared.");
                        }
                        ChatCommand::Model(model) => {
                            session.set_model(model);
                            renderer.print_info(&format!("Model changed to: {model}"));
                        }
                        ChatCommand::Models => {
                            print_models(session.model());
                        }
                        ChatCommand::Temperature(value) => match session.set_temperature(value) {
                            Ok(()) => renderer.print_info(&format!("Temperature set to {value:.2}")),
                            Err(err) => renderer.print_error(&err.to_string()),
                        },
                        ChatCommand::Retries(value) => match session.set_max_retries(value) {
                            Ok(()) => renderer.print_info(&format!("Max retries set to {value}")),
                            Err(err) => renderer.print_error(&err.to_string()),
                        },
                        ChatCommand::RetryTransient(enabled) => {
                            if enabled {
                                session.set_retry_policy(RetryPolicy::RetryTransient);
                                renderer.print_info("Transient network errors will be retried.");
                            } else {
                                session.set_retry_policy(RetryPolicy::StopOnFirstOutcome);
                                renderer.print_info("Requests stop at the first outcome.");
                            }
                        }
                        ChatCommand::ShowConfig => {
                            print_config(&session);
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to API
                session
                    .submit(line, &mut renderer, interrupted.clone())
                    .await;
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye! Keep the streak alive!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn print_models(current: KnownModel) {
    println!("    Available models:");
    for model in KnownModel::ALL {
        let marker = if model == current { "*" } else { " " };
        println!("    {marker} {model}");
    }
}

fn print_config(session: &ChatSession) {
    let stats = session.stats();
    println!("    Current Configuration:");
    println!("      Model: {}", stats.model);
    println!("      Temperature: {:.2}", stats.temperature);
    println!("      Max retries: {}", stats.max_retries);
    println!(
        "      Retry transient errors: {}",
        match stats.retry_policy {
            RetryPolicy::RetryTransient => "on",
            RetryPolicy::StopOnFirstOutcome => "off",
        }
    );
    println!(
        "      API key: {}",
        if stats.has_credential { "set" } else { "(not set)" }
    );
    println!("      Messages: {}", stats.message_count);
    println!(
        "      Turns: {} ({} without a reply from the API)",
        stats.turns, stats.failed_turns
    );
}
