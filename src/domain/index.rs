//! Primary and secondary indexes over books
//!
//! - [`PrimaryIndex`] owns the records, keyed by unique [`BookId`]
//! - [`SecondaryIndex`] maps one field's raw value to the IDs sharing it
//!
//! Secondary indexes are derived state. They are appended to on insert and
//! rebuilt from the sequence after edits and removals rather than patched
//! in place.

use std::collections::{BTreeMap, HashMap};

use super::book::{Book, Field};
use super::id::BookId;

/// Unique ID -> book mapping
#[derive(Debug, Clone, Default)]
pub struct PrimaryIndex {
    books: HashMap<BookId, Book>,
}

impl PrimaryIndex {
    pub fn new() -> Self {
        Self {
            books: HashMap::new(),
        }
    }

    pub fn has(&self, id: &BookId) -> bool {
        self.books.contains_key(id)
    }

    pub fn get(&self, id: &BookId) -> Option<&Book> {
        self.books.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &BookId) -> Option<&mut Book> {
        self.books.get_mut(id)
    }

    /// Inserts or overwrites the entry for `id`
    pub fn set(&mut self, id: BookId, book: Book) {
        self.books.insert(id, book);
    }

    /// Removes the entry for `id`, if any
    pub fn delete(&mut self, id: &BookId) -> Option<Book> {
        self.books.remove(id)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Iterates over IDs in arbitrary order
    pub fn ids(&self) -> impl Iterator<Item = &BookId> {
        self.books.keys()
    }
}

/// Field value -> IDs of books holding that value
#[derive(Debug, Clone)]
pub struct SecondaryIndex {
    field: Field,
    entries: BTreeMap<String, Vec<BookId>>,
}

impl SecondaryIndex {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            entries: BTreeMap::new(),
        }
    }

    /// The field this index is keyed on
    pub fn field(&self) -> Field {
        self.field
    }

    /// Appends `id` to the set for `value`, creating the set if needed
    pub fn add_entry(&mut self, value: &str, id: BookId) {
        let ids = self.entries.entry(value.to_string()).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    /// IDs sharing `value`, in insertion order
    pub fn lookup(&self, value: &str) -> &[BookId] {
        self.entries.get(value).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct values with the number of books holding each, sorted by value
    pub fn values(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries
            .iter()
            .map(|(value, ids)| (value.as_str(), ids.len()))
    }

    /// Iterates over every ID in every value set
    pub fn all_ids(&self) -> impl Iterator<Item = &BookId> {
        self.entries.values().flatten()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// The set of secondary indexes maintained by an inventory
#[derive(Debug, Clone)]
pub struct SecondaryIndexes {
    indexes: Vec<SecondaryIndex>,
}

impl SecondaryIndexes {
    /// Creates one empty index per distinct field
    ///
    /// `Field::Id` is skipped; the primary index already covers it.
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        let mut indexes: Vec<SecondaryIndex> = Vec::new();
        for field in fields {
            if field == Field::Id || indexes.iter().any(|idx| idx.field == field) {
                continue;
            }
            indexes.push(SecondaryIndex::new(field));
        }
        Self { indexes }
    }

    /// Indexes a single book in every secondary index
    pub fn add_entry(&mut self, book: &Book) {
        for index in &mut self.indexes {
            let field = index.field;
            index.add_entry(book.field(field), book.id.clone());
        }
    }

    /// Clears every index and replays `books` in order
    pub fn rebuild_all<'a>(&mut self, books: impl IntoIterator<Item = &'a Book>) {
        for index in &mut self.indexes {
            index.clear();
        }
        for book in books {
            self.add_entry(book);
        }
    }

    pub fn get(&self, field: Field) -> Option<&SecondaryIndex> {
        self.indexes.iter().find(|idx| idx.field == field)
    }

    pub fn is_indexed(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    /// Returns true if any of `fields` is covered by a secondary index
    pub fn covers_any(&self, fields: &[Field]) -> bool {
        fields.iter().any(|field| self.is_indexed(*field))
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.indexes.iter().map(|idx| idx.field)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SecondaryIndex> {
        self.indexes.iter()
    }
}

impl Default for SecondaryIndexes {
    fn default() -> Self {
        Self::new([Field::Title, Field::Author])
    }
}
