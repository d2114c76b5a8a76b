//! JSONL storage for books
//!
//! Books are stored in `.shelf/books.jsonl` with one JSON object per line,
//! in inventory order. Uses file locking for concurrent access safety.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::{Book, RawBook, SinkError, SnapshotSink};

/// Store for book data in JSONL format
#[derive(Debug, Clone)]
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    /// Creates a new store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store for a library
    pub fn for_library(library_root: &Path) -> Self {
        Self::new(library_root.join(".shelf").join("books.jsonl"))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all records in file order
    ///
    /// Records are returned unvalidated; the inventory's import path decides
    /// which of them are kept.
    pub fn read_all(&self) -> Result<Vec<RawBook>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open book store: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on book store")?;

        let reader = BufReader::new(&file);
        let mut books = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let book: RawBook = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse book at line {}", line_num + 1))?;

            books.push(book);
        }

        // Lock is released when file is dropped
        Ok(books)
    }

    /// Writes all books to the store (full rewrite, order preserved)
    pub fn write_all(&self, books: &[Book]) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        // Write to temp file first
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .context("Failed to acquire write lock on book store")?;

            let mut writer = BufWriter::new(&file);

            for book in books {
                let line = serde_json::to_string(book).context("Failed to serialize book")?;
                writeln!(writer, "{}", line).context("Failed to write book")?;
            }

            writer.flush().context("Failed to flush book store")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}

impl SnapshotSink for JsonlStore {
    fn persist(&mut self, books: &[Book]) -> Result<(), SinkError> {
        self.write_all(books).map_err(Into::into)
    }
}
