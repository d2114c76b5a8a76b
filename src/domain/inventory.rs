//! The book inventory: an ordered, multi-indexed in-memory record store
//!
//! An [`Inventory`] keeps three structures in step:
//!
//! 1. [`Sequence`] - insertion order of IDs
//! 2. [`PrimaryIndex`] - ID -> book (owns the records)
//! 3. [`SecondaryIndexes`] - field value -> IDs (derived, rebuildable)
//!
//! Every mutation validates first and then updates the sequence, the primary
//! index and the secondary indexes in that order. Callers never observe the
//! structures out of step.
//!
//! After each successful mutation the inventory hands an ordered snapshot to
//! the attached [`SnapshotSink`], if any.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::book::{Book, BookPatch, Field, RawBook};
use super::id::BookId;
use super::index::{PrimaryIndex, SecondaryIndexes};
use super::sequence::Sequence;
use super::view::{self, Query};

/// Error type returned by snapshot sinks
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing required field: {field}")]
    Validation { field: Field },

    #[error("Book already exists: {0}")]
    DuplicateKey(BookId),

    #[error("Book not found: {0}")]
    NotFound(BookId),

    #[error("Failed to persist inventory snapshot")]
    Persist(#[source] SinkError),
}

/// Receives the ordered contents of the inventory after every mutation
pub trait SnapshotSink {
    fn persist(&mut self, books: &[Book]) -> Result<(), SinkError>;
}

/// Outcome of a bulk import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub added: usize,
    /// Tuples with an empty ID or title
    pub skipped_invalid: usize,
    /// Tuples whose ID was already present
    pub skipped_duplicate: usize,
}

impl ImportReport {
    pub fn skipped(&self) -> usize {
        self.skipped_invalid + self.skipped_duplicate
    }

    pub fn total(&self) -> usize {
        self.added + self.skipped()
    }
}

/// In-memory book store with primary and secondary indexes
pub struct Inventory {
    sequence: Sequence,
    primary: PrimaryIndex,
    secondary: SecondaryIndexes,
    sink: Option<Box<dyn SnapshotSink>>,
}

impl Inventory {
    /// Creates an empty inventory indexing title and author
    pub fn new() -> Self {
        Self::with_indexes([Field::Title, Field::Author])
    }

    /// Creates an empty inventory with secondary indexes on `fields`
    pub fn with_indexes(fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            sequence: Sequence::new(),
            primary: PrimaryIndex::new(),
            secondary: SecondaryIndexes::new(fields),
            sink: None,
        }
    }

    /// Attaches the sink notified after each mutation, replacing any previous one
    pub fn attach_sink(&mut self, sink: Box<dyn SnapshotSink>) {
        self.sink = Some(sink);
    }

    pub fn detach_sink(&mut self) -> Option<Box<dyn SnapshotSink>> {
        self.sink.take()
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn contains(&self, id: &BookId) -> bool {
        self.primary.has(id)
    }

    pub fn get(&self, id: &BookId) -> Option<&Book> {
        self.primary.get(id)
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn primary(&self) -> &PrimaryIndex {
        &self.primary
    }

    pub fn secondary(&self) -> &SecondaryIndexes {
        &self.secondary
    }

    /// Iterates over books in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Book> + '_ {
        self.sequence.iter().filter_map(|id| self.primary.get(id))
    }

    /// Returns an owned snapshot of all books in insertion order
    pub fn to_ordered_list(&self) -> Vec<Book> {
        self.iter().cloned().collect()
    }

    /// Adds a single book, rejecting empty titles and existing IDs
    pub fn add(&mut self, book: Book) -> Result<(), StoreError> {
        if book.title.trim().is_empty() {
            return Err(StoreError::Validation {
                field: Field::Title,
            });
        }
        if self.primary.has(&book.id) {
            return Err(StoreError::DuplicateKey(book.id));
        }

        self.insert(book);
        self.emit_snapshot()
    }

    /// Bulk-adds raw tuples, silently skipping invalid and duplicate ones
    ///
    /// A snapshot is emitted once if at least one book was added.
    pub fn import(
        &mut self,
        raws: impl IntoIterator<Item = RawBook>,
    ) -> Result<ImportReport, StoreError> {
        let report = self.restore(raws);
        if report.added > 0 {
            self.emit_snapshot()?;
        }
        Ok(report)
    }

    /// Replays previously persisted tuples through the import path without
    /// emitting a snapshot
    pub fn restore(&mut self, raws: impl IntoIterator<Item = RawBook>) -> ImportReport {
        let mut report = ImportReport::default();

        for raw in raws {
            let id = match raw.id.parse::<BookId>() {
                Ok(id) if !raw.title.trim().is_empty() => id,
                _ => {
                    report.skipped_invalid += 1;
                    continue;
                }
            };
            if self.primary.has(&id) {
                report.skipped_duplicate += 1;
                continue;
            }

            self.insert(Book {
                id,
                title: raw.title,
                author: raw.author,
                category: raw.category,
                status: raw.status,
            });
            report.added += 1;
        }

        report
    }

    /// Applies `patch` to the book with `id`, returning the updated book
    ///
    /// Secondary indexes are rebuilt when an indexed value changed.
    pub fn edit(&mut self, id: &BookId, patch: BookPatch) -> Result<Book, StoreError> {
        if matches!(&patch.title, Some(title) if title.trim().is_empty()) {
            return Err(StoreError::Validation {
                field: Field::Title,
            });
        }

        let book = self
            .primary
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let changed = patch.apply(book);
        let updated = book.clone();

        if changed.is_empty() {
            return Ok(updated);
        }
        if self.secondary.covers_any(&changed) {
            self.rebuild_secondary();
        }

        self.emit_snapshot()?;
        Ok(updated)
    }

    /// Removes the book with `id`, returning it
    pub fn remove(&mut self, id: &BookId) -> Result<Book, StoreError> {
        if !self.sequence.remove_by_id(id) {
            return Err(StoreError::NotFound(id.clone()));
        }
        let book = self
            .primary
            .delete(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        self.rebuild_secondary();
        self.emit_snapshot()?;
        Ok(book)
    }

    /// Books whose `field` equals `value` exactly, in insertion order
    ///
    /// Uses the secondary index when `field` is indexed and scans otherwise.
    pub fn lookup(&self, field: Field, value: &str) -> Vec<&Book> {
        match field {
            Field::Id => value
                .parse::<BookId>()
                .ok()
                .and_then(|id| self.primary.get(&id))
                .into_iter()
                .collect(),
            _ => match self.secondary.get(field) {
                Some(index) => index
                    .lookup(value)
                    .iter()
                    .filter_map(|id| self.primary.get(id))
                    .collect(),
                None => self.iter().filter(|book| book.field(field) == value).collect(),
            },
        }
    }

    /// Books matching `query`, in insertion order
    pub fn filter(&self, query: &Query) -> Vec<&Book> {
        view::filter(self.iter(), query)
    }

    /// Rebuilds every secondary index from the sequence
    pub fn rebuild_secondary(&mut self) {
        let primary = &self.primary;
        let books = self.sequence.iter().filter_map(|id| primary.get(id));
        self.secondary.rebuild_all(books);
    }

    fn insert(&mut self, book: Book) {
        self.sequence.append(book.id.clone());
        self.secondary.add_entry(&book);
        self.primary.set(book.id.clone(), book);
    }

    fn emit_snapshot(&mut self) -> Result<(), StoreError> {
        if self.sink.is_none() {
            return Ok(());
        }

        let snapshot = self.to_ordered_list();
        if let Some(sink) = self.sink.as_mut() {
            sink.persist(&snapshot).map_err(StoreError::Persist)?;
        }
        Ok(())
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inventory")
            .field("sequence", &self.sequence)
            .field("primary", &self.primary)
            .field("secondary", &self.secondary)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}
