//! Import, export and catalog lookup commands

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::{Book, ImportReport, RawBook};
use crate::storage::{csv, CatalogSource, FileCatalog, JsonlStore, Library};

/// File format for import and export
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FileFormat {
    Csv,
    Jsonl,
    Json,
}

impl FileFormat {
    /// Guesses the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "jsonl" | "ndjson" => Some(FileFormat::Jsonl),
            "json" => Some(FileFormat::Json),
            _ => None,
        }
    }
}

/// Reads raw tuples from a file in the given format
fn read_raw(path: &Path, format: FileFormat, output: &Output) -> Result<Vec<RawBook>> {
    match format {
        FileFormat::Jsonl => JsonlStore::new(path).read_all(),
        FileFormat::Json => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON array in {}", path.display()))
        }
        FileFormat::Csv => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let ignored = csv::ignored_columns(&content)?;
            if !ignored.is_empty() {
                output.verbose_ctx("import", &format!("Ignoring columns: {}", ignored.join(", ")));
            }
            csv::parse(&content).with_context(|| format!("Failed to parse CSV in {}", path.display()))
        }
    }
}

fn report_import(output: &Output, report: &ImportReport, source: &str) -> Result<()> {
    output.verbose_ctx("import", &format!("Processed {} record(s)", report.total()));
    if output.is_json() {
        output.data(report)?;
    } else {
        output.success(&format!(
            "Imported {} book(s) from {} ({} skipped: {} invalid, {} duplicate)",
            report.added,
            source,
            report.skipped(),
            report.skipped_invalid,
            report.skipped_duplicate
        ));
    }
    Ok(())
}

pub fn import(output: &Output, path: &Path, format: Option<FileFormat>) -> Result<()> {
    let format = match format.or_else(|| FileFormat::from_path(path)) {
        Some(format) => format,
        None => anyhow::bail!(
            "Cannot tell the format of {}; pass --as csv|jsonl|json",
            path.display()
        ),
    };

    let library = Library::open_current()?;
    let (mut inventory, _) = library.load_inventory()?;

    let raws = read_raw(path, format, output)?;
    output.verbose_ctx(
        "import",
        &format!("Read {} record(s) from {} as {:?}", raws.len(), path.display(), format),
    );

    let report = inventory.import(raws)?;
    report_import(output, &report, &path.display().to_string())
}

/// Renders books in the given format
fn render(books: &[Book], format: FileFormat) -> Result<String> {
    Ok(match format {
        FileFormat::Csv => csv::format(books),
        FileFormat::Json => {
            serde_json::to_string_pretty(books).context("Failed to serialize books")? + "\n"
        }
        FileFormat::Jsonl => {
            let mut text = String::new();
            for book in books {
                text.push_str(&serde_json::to_string(book).context("Failed to serialize book")?);
                text.push('\n');
            }
            text
        }
    })
}

pub fn export(output: &Output, path: Option<&Path>, format: FileFormat) -> Result<()> {
    let library = Library::open_current()?;
    let (inventory, _) = library.load_inventory()?;

    let books = inventory.to_ordered_list();
    let text = render(&books, format)?;

    match path {
        Some(path) => {
            fs::write(path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if output.is_json() {
                output.data(&serde_json::json!({
                    "exported": books.len(),
                    "path": path.display().to_string(),
                }))?;
            } else {
                output.success(&format!("Exported {} book(s) to {}", books.len(), path.display()));
            }
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

pub fn lookup(output: &Output, title: &str, catalog_path: &Path, add: bool) -> Result<()> {
    let catalog = FileCatalog::open(catalog_path)?;
    let candidates = catalog.search_title(title)?;
    output.verbose_ctx(
        "lookup",
        &format!(
            "{} candidate(s) from catalog '{}' ({})",
            candidates.len(),
            catalog.name(),
            catalog.path().display()
        ),
    );

    if add {
        let library = Library::open_current()?;
        let (mut inventory, _) = library.load_inventory()?;
        let report = inventory.import(candidates)?;
        return report_import(output, &report, catalog.name());
    }

    if output.is_json() {
        output.data(&candidates)?;
    } else if candidates.is_empty() {
        println!("No catalog entries match '{}'", title);
    } else {
        println!("{:<14} {:<30} AUTHOR", "ID", "TITLE");
        println!("{}", "-".repeat(70));
        for candidate in &candidates {
            println!("{:<14} {:<30} {}", candidate.id, candidate.title, candidate.author);
        }
        println!();
        println!("Run with --add to add these to the library.");
    }

    Ok(())
}
