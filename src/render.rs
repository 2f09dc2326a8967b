//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction so the session
//! logic never writes to the terminal directly.  The default implementation
//! uses ANSI escape codes to tell the user's lines, the coach's lines and
//! errors apart.

use std::io::{self, Stdout, Write};

use crate::reveal::CURSOR;
use crate::types::{Message, MessageRole};

/// ANSI escape code for bold text (used for speaker labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for the reveal cursor).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the user label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for coral-ish red text (used for the coach label and errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for yellow text (used for informational lines).
const ANSI_YELLOW: &str = "\x1b[33m";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print a complete stored message, e.g. when replaying history.
    fn print_message(&mut self, message: &Message);

    /// Print the label that starts an assistant reply.
    fn start_reply(&mut self);

    /// Show the next prefix of a reply being revealed.
    ///
    /// `prefix` always extends the previous prefix; `is_final` is true for
    /// the complete text.
    fn print_chunk(&mut self, prefix: &str, is_final: bool);

    /// Called when a reply is complete.
    fn finish_reply(&mut self);

    /// Print an inline error banner.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when the reveal is interrupted by the user.
    fn print_interrupted(&mut self);
}

/// Plain text renderer with optional ANSI styling.
///
/// Revealed chunks are written as deltas: only the part of the prefix that
/// was not printed yet goes to stdout, followed by a cursor that the next
/// chunk erases.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    printed: usize,
    cursor_shown: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            printed: 0,
            cursor_shown: false,
        }
    }

    /// Flushes stdout to ensure immediate display of revealed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn label(&self, role: MessageRole) -> String {
        let (color, name) = match role {
            MessageRole::User => (ANSI_CYAN, "You"),
            MessageRole::Assistant => (ANSI_RED, "Coach"),
            MessageRole::System => (ANSI_YELLOW, "System"),
        };
        if self.use_color {
            format!("{ANSI_BOLD}{color}{name}:{ANSI_RESET}")
        } else {
            format!("{name}:")
        }
    }

    fn erase_cursor(&mut self) {
        if self.cursor_shown {
            // The cursor is one column wide.
            print!("\x08 \x08");
            self.cursor_shown = false;
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_message(&mut self, message: &Message) {
        println!("{} {}", self.label(message.role()), message.content());
    }

    fn start_reply(&mut self) {
        self.printed = 0;
        self.cursor_shown = false;
        print!("{} ", self.label(MessageRole::Assistant));
        self.flush();
    }

    fn print_chunk(&mut self, prefix: &str, is_final: bool) {
        self.erase_cursor();
        let delta = prefix.get(self.printed..).unwrap_or_default();
        print!("{delta}");
        self.printed = prefix.len();
        if !is_final {
            if self.use_color {
                print!("{ANSI_DIM}{CURSOR}{ANSI_RESET}");
            } else {
                print!("{CURSOR}");
            }
            self.cursor_shown = true;
        }
        self.flush();
    }

    fn finish_reply(&mut self) {
        self.erase_cursor();
        println!();
        self.printed = 0;
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        self.erase_cursor();
        if self.use_color {
            eprintln!("{ANSI_RED}{error}{ANSI_RESET}");
        } else {
            eprintln!("Error: {error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        if self.use_color {
            println!("{ANSI_YELLOW}{info}{ANSI_RESET}");
        } else {
            println!("{info}");
        }
    }

    fn print_interrupted(&mut self) {
        self.erase_cursor();
        println!("\n[interrupted]");
        self.printed = 0;
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
        assert_eq!(renderer.label(MessageRole::User), "You:");
        assert_eq!(renderer.label(MessageRole::Assistant), "Coach:");
    }

    #[test]
    fn chunks_track_printed_prefix() {
        let mut renderer = PlainTextRenderer::with_color(false);
        renderer.start_reply();
        renderer.print_chunk("Great", false);
        assert_eq!(renderer.printed, 5);
        assert!(renderer.cursor_shown);
        renderer.print_chunk("Great job", true);
        assert_eq!(renderer.printed, 9);
        assert!(!renderer.cursor_shown);
        renderer.finish_reply();
        assert_eq!(renderer.printed, 0);
    }
}
