//! Sort and filter views
//!
//! Views are pure functions over a snapshot of books. They never touch the
//! inventory's sequence or indexes.
//!
//! ## Sorting
//!
//! Values that both parse as finite numbers compare numerically; everything
//! else compares case-insensitively. To keep the ordering total, numeric
//! values sort before text values. The sort is stable, so books with equal
//! keys keep their inventory order.
//!
//! ## Sort State
//!
//! ```text
//! Unsorted ──toggle(K)──▶ Asc(K) ──toggle(K)──▶ Desc(K)
//!                          ▲                      │
//!                          └──────toggle(K)───────┘
//! Asc(K) / Desc(K) ──toggle(K')──▶ Asc(K')
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::book::{Book, Field};

/// Substring filter over id, title, author and category
///
/// Empty or missing fragments match everything. Supplied fragments are
/// combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, fragment: impl Into<String>) -> Self {
        self.id = Some(fragment.into());
        self
    }

    pub fn title(mut self, fragment: impl Into<String>) -> Self {
        self.title = Some(fragment.into());
        self
    }

    pub fn author(mut self, fragment: impl Into<String>) -> Self {
        self.author = Some(fragment.into());
        self
    }

    pub fn category(mut self, fragment: impl Into<String>) -> Self {
        self.category = Some(fragment.into());
        self
    }

    /// Returns true if no fragment constrains the result
    pub fn is_empty(&self) -> bool {
        self.fragments().next().is_none()
    }

    /// Non-empty fragments, lowercased, paired with their field
    fn fragments(&self) -> impl Iterator<Item = (Field, String)> + '_ {
        [
            (Field::Id, &self.id),
            (Field::Title, &self.title),
            (Field::Author, &self.author),
            (Field::Category, &self.category),
        ]
        .into_iter()
        .filter_map(|(field, fragment)| {
            fragment
                .as_deref()
                .filter(|f| !f.is_empty())
                .map(|f| (field, f.to_lowercase()))
        })
    }

    /// Returns true if `book` satisfies every supplied fragment
    pub fn matches(&self, book: &Book) -> bool {
        self.fragments()
            .all(|(field, fragment)| book.field(field).to_lowercase().contains(&fragment))
    }
}

/// Keeps the books matching `query`, preserving their order
pub fn filter<'a>(books: impl IntoIterator<Item = &'a Book>, query: &Query) -> Vec<&'a Book> {
    books.into_iter().filter(|book| query.matches(book)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// Column sort state driven by repeated header selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SortState {
    #[default]
    Unsorted,
    Sorted {
        key: Field,
        direction: SortDirection,
    },
}

impl SortState {
    /// Transitions on selecting `key`
    ///
    /// Selecting the current key flips the direction; any other key starts
    /// ascending.
    pub fn toggle(self, key: Field) -> Self {
        match self {
            SortState::Sorted {
                key: current,
                direction,
            } if current == key => SortState::Sorted {
                key,
                direction: direction.reversed(),
            },
            _ => SortState::Sorted {
                key,
                direction: SortDirection::Ascending,
            },
        }
    }

    /// Applies this state to `books`; `Unsorted` returns them unchanged
    pub fn apply<'a>(&self, books: Vec<&'a Book>) -> Vec<&'a Book> {
        match *self {
            SortState::Unsorted => books,
            SortState::Sorted { key, direction } => sort_books(books, key, direction),
        }
    }
}

/// Returns `books` stably sorted by `key`
pub fn sort_books(mut books: Vec<&Book>, key: Field, direction: SortDirection) -> Vec<&Book> {
    books.sort_by(|a, b| {
        let ordering = compare_values(a.field(key), b.field(key));
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    books
}

enum SortValue {
    Number(f64),
    Text(String),
}

impl SortValue {
    fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => SortValue::Number(n),
            _ => SortValue::Text(raw.to_lowercase()),
        }
    }
}

/// Compares two raw field values for sorting
pub fn compare_values(a: &str, b: &str) -> Ordering {
    match (SortValue::parse(a), SortValue::parse(b)) {
        (SortValue::Number(x), SortValue::Number(y)) => x.total_cmp(&y),
        (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
        (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
        (SortValue::Text(x), SortValue::Text(y)) => x.cmp(&y),
    }
}
