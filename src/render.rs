//! Output rendering for chat streaming.
//!
//! This module provides the renderer trait and a plain-text implementation.  The completion
//! stream never prints anything itself; whoever drains it decides how events look.

use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// ANSI escape code for bold text (used for the assistant label).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for informational output).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Trait for rendering streaming output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Capturing output in tests
pub trait Renderer: Send {
    /// Called before the first fragment of a response.
    fn start_response(&mut self, label: &str) {
        _ = label;
    }

    /// Print a chunk of response text.
    ///
    /// This is called incrementally as fragments are streamed from the API, and once with the
    /// whole answer for blocking responses.
    fn print_text(&mut self, text: &str);

    /// Called for every framing line of the stream.
    ///
    /// Framing carries no text; most renderers ignore it.
    fn print_break(&mut self) {}

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when a response is complete.
    ///
    /// Used to ensure proper newlines and cleanup after streaming.
    fn finish_response(&mut self);

    /// Called when the stream is interrupted by the user.
    fn print_interrupted(&mut self) {}

    /// Returns true if streaming should be interrupted.
    fn should_interrupt(&self) -> bool {
        false
    }
}

/// Plain text renderer with optional ANSI styling.
///
/// This renderer outputs text directly to stdout, flushing after every fragment so that
/// streamed text appears as soon as it arrives.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    line_start: bool,
    interrupted: Option<Arc<AtomicBool>>,
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
            line_start: true,
            interrupted: None,
        }
    }

    /// Attaches an interrupt flag to the renderer.
    pub fn with_interrupt(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(interrupted);
        self
    }

    /// Creates a new PlainTextRenderer with specified color and interrupt flag.
    pub fn with_color_and_interrupt(use_color: bool, interrupted: Arc<AtomicBool>) -> Self {
        Self::with_color(use_color).with_interrupt(interrupted)
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        print!("{text}");
        self.line_start = text.ends_with('\n');
        self.flush();
    }

    fn end_line(&mut self) {
        if !self.line_start {
            self.write("\n");
        }
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn start_response(&mut self, label: &str) {
        self.end_line();
        let label = self.styled(ANSI_BOLD, &format!("{label}:"));
        self.write(&format!("{label} "));
    }

    fn print_text(&mut self, text: &str) {
        self.write(text);
    }

    fn print_error(&mut self, error: &str) {
        self.end_line();
        eprintln!("{}", self.styled(ANSI_RED, &format!("Error: {error}")));
        self.line_start = true;
    }

    fn print_info(&mut self, info: &str) {
        self.end_line();
        let info = self.styled(ANSI_DIM, info);
        self.write(&format!("{info}\n"));
    }

    fn finish_response(&mut self) {
        self.end_line();
    }

    fn print_interrupted(&mut self) {
        self.end_line();
        self.write("[interrupted]\n");
    }

    fn should_interrupt(&self) -> bool {
        self.interrupted
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
