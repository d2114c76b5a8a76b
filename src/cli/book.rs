//! Book CLI commands (add, edit, remove, show, list, sort, by, index, status)

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::Utc;

use super::output::Output;
use crate::domain::view::{self, Query, SortDirection};
use crate::domain::{Book, BookId, BookPatch, Field, Inventory, StoreError};
use crate::storage::Library;

/// Field values for `shelf add`
pub struct NewBook {
    pub title: String,
    pub id: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

/// Opens the current library and loads its inventory
fn open(output: &Output, context: &str) -> Result<(Library, Inventory)> {
    let library = Library::open_current()?;
    output.verbose_ctx(
        context,
        &format!("Opened library at: {}", library.root().display()),
    );

    let (inventory, report) = library.load_inventory()?;
    output.verbose_ctx(
        context,
        &format!("Loaded {} books from {}", report.added, library.book_store().path().display()),
    );
    if report.skipped() > 0 {
        output.warn(&format!(
            "Ignored {} stored record(s) ({} invalid, {} duplicate)",
            report.skipped(),
            report.skipped_invalid,
            report.skipped_duplicate
        ));
    }

    Ok((library, inventory))
}

fn parse_id(raw: &str) -> Result<BookId, StoreError> {
    raw.parse()
        .map_err(|_| StoreError::Validation { field: Field::Id })
}

pub fn add(output: &Output, new: NewBook) -> Result<()> {
    let (library, mut inventory) = open(output, "add")?;

    let id = match new.id.as_deref() {
        Some(raw) => parse_id(raw)?,
        None => {
            let id = BookId::generate(&new.title, Utc::now());
            output.verbose_ctx("add", &format!("Generated ID: {}", id));
            id
        }
    };
    let status = new
        .status
        .unwrap_or_else(|| library.config().library.default_status.clone());

    let book = Book::new(id, new.title)
        .with_author(new.author.unwrap_or_default())
        .with_category(new.category.unwrap_or_default())
        .with_status(status);

    inventory.add(book.clone())?;

    if output.is_json() {
        output.data(&book)?;
    } else {
        output.success(&format!("Added book: {} - {}", book.id, book.title));
    }

    Ok(())
}

pub fn edit(output: &Output, id_str: &str, patch: BookPatch) -> Result<()> {
    if patch.is_empty() {
        anyhow::bail!("Nothing to edit: pass at least one of --title, --author, --category, --status");
    }

    let (_library, mut inventory) = open(output, "edit")?;
    let id = parse_id(id_str)?;

    let book = inventory.edit(&id, patch)?;

    if output.is_json() {
        output.data(&book)?;
    } else {
        output.success(&format!("Updated book: {} - {}", book.id, book.title));
    }

    Ok(())
}

pub fn remove(output: &Output, id_str: &str) -> Result<()> {
    let (_library, mut inventory) = open(output, "remove")?;
    let id = parse_id(id_str)?;

    let book = inventory.remove(&id)?;
    output.verbose_ctx("remove", &format!("{} books remain", inventory.len()));

    if output.is_json() {
        output.data(&serde_json::json!({
            "removed": book,
            "remaining": inventory.len(),
        }))?;
    } else {
        output.success(&format!("Removed book: {} - {}", book.id, book.title));
    }

    Ok(())
}

pub fn show(output: &Output, id_str: &str) -> Result<()> {
    let (_library, inventory) = open(output, "show")?;
    let id = parse_id(id_str)?;

    let book = inventory
        .get(&id)
        .ok_or_else(|| StoreError::NotFound(id.clone()))?;

    if output.is_json() {
        output.data(book)?;
    } else {
        println!("Book: {}", book.id);
        println!("Title: {}", book.title);
        println!("Author: {}", display_or_dash(&book.author));
        println!("Category: {}", display_or_dash(&book.category));
        println!("Status: {}", display_or_dash(&book.status));
    }

    Ok(())
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

pub fn list(
    output: &Output,
    query: Query,
    sort: Option<Field>,
    descending: bool,
) -> Result<()> {
    let (library, inventory) = open(output, "list")?;

    let books = inventory.filter(&query);
    output.verbose_ctx(
        "list",
        &format!("{} of {} books match {:?}", books.len(), inventory.len(), query),
    );

    let direction = if descending {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    let books = match sort.or(library.config().library.default_sort) {
        Some(key) => {
            output.verbose_ctx("list", &format!("Sorting by {} ({})", key, direction.as_str()));
            view::sort_books(books, key, direction)
        }
        None if descending => {
            anyhow::bail!("--desc needs a sort key: pass --sort or set default_sort in config.toml")
        }
        None => books,
    };

    let empty = if query.is_empty() {
        "No books"
    } else {
        "No books match the filter"
    };
    output.books(&books, empty)?;

    Ok(())
}

/// Toggles the persisted sort state on `key` and lists all books with it
pub fn sort(output: &Output, key: Field) -> Result<()> {
    let (library, inventory) = open(output, "sort")?;

    let previous = library.view_state()?;
    let state = previous.toggle(key);
    library.save_view_state(state)?;
    output.verbose_ctx("sort", &format!("{:?} -> {:?}", previous, state));

    let books = state.apply(inventory.iter().collect());

    if !output.is_json() {
        if let crate::domain::SortState::Sorted { key, direction } = state {
            println!("Sorted by {} ({})", key, direction.as_str());
            println!();
        }
    }
    output.books(&books, "No books")?;

    Ok(())
}

/// Exact-value lookup through a secondary index
pub fn by(output: &Output, field: Field, value: &str) -> Result<()> {
    let (_library, inventory) = open(output, "by")?;

    if field != Field::Id && !inventory.secondary().is_indexed(field) {
        output.verbose_ctx("by", &format!("No secondary index on {}; scanning", field));
    }

    let books = inventory.lookup(field, value);
    output.books(&books, &format!("No books with {} = '{}'", field, value))?;

    Ok(())
}

/// Lists the distinct values of an indexed field
pub fn index(output: &Output, field: Field) -> Result<()> {
    let (_library, inventory) = open(output, "index")?;

    let secondary = inventory.secondary();
    let index = secondary.get(field).with_context(|| {
        let indexed: Vec<_> = secondary.fields().map(|f| f.to_string()).collect();
        format!(
            "Field '{}' is not indexed (indexed fields: {})",
            field,
            indexed.join(", ")
        )
    })?;

    if output.is_json() {
        let items: Vec<_> = index
            .values()
            .map(|(value, count)| serde_json::json!({ "value": value, "count": count }))
            .collect();
        output.data(&items)?;
    } else if inventory.is_empty() {
        println!("No books");
    } else {
        println!("{:<40} COUNT", field.as_str().to_uppercase());
        println!("{}", "-".repeat(50));
        for (value, count) in index.values() {
            println!("{:<40} {}", display_or_dash(value), count);
        }
    }

    Ok(())
}

/// Shows inventory counts per status and per index
pub fn status(output: &Output) -> Result<()> {
    let (library, inventory) = open(output, "status")?;

    let mut by_status: BTreeMap<&str, usize> = BTreeMap::new();
    for book in inventory.iter() {
        *by_status.entry(book.status.as_str()).or_default() += 1;
    }

    let indexes: Vec<_> = inventory
        .secondary()
        .iter()
        .map(|index| (index.field(), index.values().count()))
        .collect();

    if output.is_json() {
        output.data(&serde_json::json!({
            "root": library.root().display().to_string(),
            "books": inventory.len(),
            "by_status": by_status,
            "indexes": indexes
                .iter()
                .map(|(field, distinct)| serde_json::json!({ "field": field, "distinct": distinct }))
                .collect::<Vec<_>>(),
            "sort": library.view_state()?,
        }))?;
    } else {
        println!("Library Status");
        println!("{}", "=".repeat(40));
        println!();
        println!("Books: {} total", inventory.len());
        for (status, count) in &by_status {
            println!("  {:<16} {}", display_or_dash(status), count);
        }
        println!();
        println!("Indexes:");
        for (field, distinct) in &indexes {
            println!("  {:<16} {} distinct values", field.as_str(), distinct);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_is_a_validation_error() {
        assert!(matches!(
            parse_id(""),
            Err(StoreError::Validation { field: Field::Id })
        ));
        assert_eq!(parse_id("42").unwrap().as_str(), "42");
    }

    #[test]
    fn dash_for_empty_values() {
        assert_eq!(display_or_dash(""), "-");
        assert_eq!(display_or_dash("sf"), "sf");
    }
}
