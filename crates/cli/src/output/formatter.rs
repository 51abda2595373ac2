//! Human-readable and JSON output
//!
//! Results go to stdout and diagnostics to stderr. In JSON mode stdout only
//! ever carries JSON documents and nothing is colored.

use std::io::Write;

use serde::Serialize;

use super::OutputConfig;

const GREEN: &str = "32";
const RED: &str = "31";
const YELLOW: &str = "33";
const DIM: &str = "2";

/// Writes command output according to the global output flags
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn is_quiet(&self) -> bool {
        self.config.quiet
    }

    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    /// Wrap `text` in an ANSI style when colors are on
    fn paint(&self, style: &str, text: &str) -> String {
        if self.colors_enabled() {
            format!("\x1b[{style}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    /// Confirmation line; silent in quiet and JSON mode
    pub fn success(&self, message: &str) {
        if self.is_quiet() || self.is_json() {
            return;
        }
        println!("{} {message}", self.paint(GREEN, "✓"));
    }

    /// Error line on stderr, printed even in quiet mode.
    ///
    /// In JSON mode this is `{"error": message}`.
    pub fn error(&self, message: &str) {
        if self.is_json() {
            let error = serde_json::json!({ "error": message });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&error).unwrap_or_else(|_| message.to_string())
            );
        } else {
            eprintln!("{} {message}", self.paint(RED, "✗"));
        }
    }

    pub fn warning(&self, message: &str) {
        if self.is_quiet() || self.is_json() {
            return;
        }
        eprintln!("{} {message}", self.paint(YELLOW, "⚠"));
    }

    /// Pretty-printed JSON on stdout, regardless of mode
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    pub fn println(&self, message: &str) {
        if self.is_quiet() {
            return;
        }
        println!("{message}");
    }

    /// Write bytes to stdout unchanged, e.g. a response body
    pub fn raw(&self, bytes: &[u8]) {
        if self.is_quiet() {
            return;
        }
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(bytes).and_then(|()| stdout.flush()) {
            eprintln!("Error writing output: {e}");
        }
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }
}
