//! Output formatting for CLI commands

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::Book;
use crate::storage;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<storage::OutputFormat> for OutputFormat {
    fn from(format: storage::OutputFormat) -> Self {
        match format {
            storage::OutputFormat::Text => OutputFormat::Text,
            storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints a warning to stderr
    pub fn warn(&self, message: &str) {
        match self.format {
            OutputFormat::Text => eprintln!("Warning: {}", message),
            OutputFormat::Json => {
                eprintln!("{}", serde_json::json!({ "warning": message }));
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) -> Result<()> {
        let json = match self.format {
            // Text callers normally render their own layout; this is the fallback
            OutputFormat::Text => serde_json::to_string_pretty(data),
            OutputFormat::Json => serde_json::to_string(data),
        }
        .context("Failed to serialize output")?;

        println!("{}", json);
        Ok(())
    }

    /// Prints books as a table (text) or a JSON array
    pub fn books(&self, books: &[&Book], empty_message: &str) -> Result<()> {
        if self.is_json() {
            return self.data(&books);
        }

        if books.is_empty() {
            println!("{}", empty_message);
            return Ok(());
        }

        println!(
            "{:<14} {:<30} {:<20} {:<12} STATUS",
            "ID", "TITLE", "AUTHOR", "CATEGORY"
        );
        println!("{}", "-".repeat(90));
        for book in books {
            println!(
                "{:<14} {:<30} {:<20} {:<12} {}",
                book.id,
                truncate(&book.title, 30),
                truncate(&book.author, 20),
                truncate(&book.category, 12),
                book.status
            );
        }
        Ok(())
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}

/// Shortens `value` to `width` characters, marking the cut with `~`
fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut short: String = value.chars().take(width.saturating_sub(1)).collect();
    short.push('~');
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_values() {
        assert_eq!(truncate("Dune", 30), "Dune");
        assert_eq!(truncate("", 5), "");
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("Moby Dick", 5), "Moby~");
        assert_eq!(truncate("Éire est ici", 4).chars().count(), 4);
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot serialize"))
        }
    }

    #[test]
    fn data_reports_serialization_failure() {
        for format in [OutputFormat::Json, OutputFormat::Text] {
            let err = Output::new(format, false).data(&Unserializable).unwrap_err();
            assert!(format!("{:#}", err).contains("cannot serialize"));
        }
        assert!(Output::new(OutputFormat::Json, false).data(&[1, 2]).is_ok());
    }

    #[test]
    fn converts_config_format() {
        assert_eq!(OutputFormat::from(storage::OutputFormat::Json), OutputFormat::Json);
        assert_eq!(OutputFormat::from(storage::OutputFormat::Text), OutputFormat::Text);
    }
}
