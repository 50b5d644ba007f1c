//! Terminal output for the CLI.
//!
//! Commands print either colored text or a single JSON document, chosen by the
//! global `--json` flag.

use colored::Colorize;
use serde::Serialize;

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl From<bool> for OutputFormat {
    fn from(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Indented `key: value` line
pub fn key_value(key: &str, value: &str) {
    println!("  {}: {}", key.bold(), value);
}

pub fn section(title: &str) {
    println!("\n{}", title.bold().underline());
}

/// Green or red dot followed by a label
pub fn status(label: &str, ok: bool) {
    let dot = if ok { "●".green() } else { "●".red() };
    println!("  {dot} {label}");
}

/// Pretty-printed JSON on stdout
pub fn json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Outcome of a state-changing command
///
/// Text mode prints only the message; JSON mode prints
/// `{ "message": ..., "data": ... }`.
#[derive(Debug, Serialize)]
pub struct Report<T: Serialize> {
    /// One-line summary
    pub message: String,
    /// Machine-readable details
    pub data: T,
}

impl<T: Serialize> Report<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }

    pub fn print(&self, format: OutputFormat) -> anyhow::Result<()> {
        match format {
            OutputFormat::Json => json(self),
            OutputFormat::Text => {
                success(&self.message);
                Ok(())
            }
        }
    }
}
