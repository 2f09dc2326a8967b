//! Chat application module for the fitness coach.
//!
//! This module provides a REPL chat interface built on top of the reply
//! fetcher. It supports:
//!
//! - Word-by-word reveal of replies with a cursor
//! - Inline error banners for failed requests
//! - Slash commands standing in for the settings controls
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Conversation ownership and the submit flow
//! - [`commands`]: Slash command parsing

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{API_KEY_ENV, API_KEYS_URL, ChatArgs, ChatConfig};
pub use session::{ChatSession, SessionStats};
