//! Book domain model
//!
//! A book is the single record type held by an [`Inventory`](super::Inventory).
//! Identity is the [`BookId`]; every other field is mutable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::id::BookId;

#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("Unknown field '{0}': expected one of id, title, author, category, status")]
    Unknown(String),
}

/// A record field that can be filtered, sorted or indexed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Id,
    Title,
    Author,
    Category,
    Status,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Id,
        Field::Title,
        Field::Author,
        Field::Category,
        Field::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Title => "title",
            Field::Author => "author",
            Field::Category => "category",
            Field::Status => "status",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(Field::Id),
            "title" => Ok(Field::Title),
            "author" => Ok(Field::Author),
            "category" => Ok(Field::Category),
            "status" => Ok(Field::Status),
            _ => Err(FieldError::Unknown(s.to_string())),
        }
    }
}

/// A book in the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier, immutable once created
    pub id: BookId,

    pub title: String,

    #[serde(default)]
    pub author: String,

    /// Shelf category (may be empty)
    #[serde(default)]
    pub category: String,

    /// Availability state, e.g. `available` or `borrowed`
    #[serde(default)]
    pub status: String,
}

impl Book {
    /// Creates a book with empty author, category and status
    pub fn new(id: BookId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            author: String::new(),
            category: String::new(),
            status: String::new(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Returns the value of a field as a string slice
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Id => self.id.as_str(),
            Field::Title => &self.title,
            Field::Author => &self.author,
            Field::Category => &self.category,
            Field::Status => &self.status,
        }
    }
}

/// An unvalidated field tuple as delivered by import, persistence or catalog lookup
///
/// Missing fields deserialize as empty strings. Whether the tuple becomes a
/// [`Book`] is decided by the inventory's import path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBook {
    pub id: String,
    pub title: String,
    pub author: String,
    pub category: String,
    pub status: String,
}

impl RawBook {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Sets a field by name, used by column-mapped CSV import
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Id => self.id = value,
            Field::Title => self.title = value,
            Field::Author => self.author = value,
            Field::Category => self.category = value,
            Field::Status => self.status = value,
        }
    }
}

impl From<Book> for RawBook {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.into(),
            title: book.title,
            author: book.author,
            category: book.category,
            status: book.status,
        }
    }
}

/// A partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.category.is_none()
            && self.status.is_none()
    }

    /// Applies the patch, returning the fields whose value actually changed
    pub(crate) fn apply(self, book: &mut Book) -> Vec<Field> {
        let mut changed = Vec::new();
        let mut assign = |field: Field, slot: &mut String, value: Option<String>| {
            if let Some(value) = value {
                if *slot != value {
                    *slot = value;
                    changed.push(field);
                }
            }
        };

        assign(Field::Title, &mut book.title, self.title);
        assign(Field::Author, &mut book.author, self.author);
        assign(Field::Category, &mut book.category, self.category);
        assign(Field::Status, &mut book.status, self.status);

        changed
    }
}
