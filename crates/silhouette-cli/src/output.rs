//! Output formatting utilities for the CLI.

use colored::Colorize;
use serde::Serialize;

use crate::OutputFormat;

/// Print a value as pretty JSON; text output is handled by the caller.
pub fn print<T: Serialize>(value: &T, format: OutputFormat, quiet: bool) {
    if quiet || format != OutputFormat::Json {
        return;
    }
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("Failed to serialize output: {}", e),
    }
}

/// Print a success message (text mode only).
pub fn success(msg: &str, format: OutputFormat, quiet: bool) {
    if quiet || format != OutputFormat::Text {
        return;
    }
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print an info line (text mode only).
pub fn info(msg: &str, format: OutputFormat, quiet: bool) {
    if quiet || format != OutputFormat::Text {
        return;
    }
    println!("{}", msg);
}

/// Print a warning to stderr (text mode only).
pub fn warning(msg: &str, format: OutputFormat, quiet: bool) {
    if quiet || format != OutputFormat::Text {
        return;
    }
    eprintln!("{} {}", "⚠".yellow().bold(), msg);
}
