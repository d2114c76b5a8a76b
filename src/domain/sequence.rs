//! Insertion-ordered sequence of book identifiers
//!
//! The sequence defines the canonical iteration order of an inventory.
//! It stores identifiers only; the records themselves live in the
//! [`PrimaryIndex`](super::PrimaryIndex).

use super::id::BookId;

/// Ordered container of book IDs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    ids: Vec<BookId>,
}

impl Sequence {
    pub fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Appends an ID to the end
    ///
    /// Uniqueness is the owning inventory's responsibility.
    pub fn append(&mut self, id: BookId) {
        self.ids.push(id);
    }

    /// Removes the first matching ID, preserving the order of the rest
    pub fn remove_by_id(&mut self, id: &BookId) -> bool {
        match self.position(id) {
            Some(pos) => {
                self.ids.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Returns the position of an ID, scanning from the front
    pub fn position(&self, id: &BookId) -> Option<usize> {
        self.ids.iter().position(|candidate| candidate == id)
    }

    /// Iterates in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, BookId> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a BookId;
    type IntoIter = std::slice::Iter<'a, BookId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}
