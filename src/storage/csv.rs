//! CSV import and export
//!
//! Parsing accepts comma-separated text with double-quoted fields (`""`
//! escapes a quote, quoted fields may span lines) and either LF or CRLF line
//! endings. A first row naming both an `id` and a `title` column is treated
//! as a header and columns are mapped by name; otherwise columns are
//! positional: `id,title,author,category,status`.

use thiserror::Error;

use crate::domain::{Book, Field, RawBook};

#[derive(Debug, Error, PartialEq)]
pub enum CsvError {
    #[error("Unterminated quoted field starting on line {0}")]
    UnterminatedQuote(usize),
}

const COLUMNS: [Field; 5] = Field::ALL;

/// Parses CSV text into raw book tuples
///
/// Missing trailing cells default to empty strings; blank lines are skipped.
pub fn parse(text: &str) -> Result<Vec<RawBook>, CsvError> {
    let rows = split_rows(text)?;
    let mut rows = rows.into_iter().peekable();

    let columns: Vec<Option<Field>> = match rows.peek() {
        Some(first) if is_header(first) => {
            let header = rows.next().unwrap_or_default();
            header.iter().map(|cell| cell.parse::<Field>().ok()).collect()
        }
        _ => COLUMNS.iter().copied().map(Some).collect(),
    };

    Ok(rows
        .map(|row| {
            let mut raw = RawBook::default();
            for (cell, column) in row.into_iter().zip(&columns) {
                if let Some(field) = column {
                    raw.set(*field, cell);
                }
            }
            raw
        })
        .collect())
}

fn is_header(row: &[String]) -> bool {
    let names = |name: &str| row.iter().any(|cell| cell.trim().eq_ignore_ascii_case(name));
    names("id") && names("title")
}

/// Splits text into rows of unescaped cells
fn split_rows(text: &str) -> Result<Vec<Vec<String>>, CsvError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut quote_line = 0;
    let mut line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    cell.push(c);
                }
                _ => cell.push(c),
            }
            continue;
        }

        match c {
            '"' if cell.is_empty() => {
                in_quotes = true;
                quote_line = line;
            }
            ',' => row.push(std::mem::take(&mut cell)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                line += 1;
                row.push(std::mem::take(&mut cell));
                push_row(&mut rows, std::mem::take(&mut row));
            }
            _ => cell.push(c),
        }
    }

    if in_quotes {
        return Err(CsvError::UnterminatedQuote(quote_line));
    }
    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        push_row(&mut rows, row);
    }

    Ok(rows)
}

fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    let blank = row.len() == 1 && row[0].trim().is_empty();
    if !blank {
        rows.push(row);
    }
}

/// Formats books as CSV with a header row
pub fn format<'a>(books: impl IntoIterator<Item = &'a Book>) -> String {
    let header: Vec<&str> = COLUMNS.iter().map(|f| f.as_str()).collect();
    let mut output = header.join(",") + "\n";

    for book in books {
        let values: Vec<String> = COLUMNS
            .iter()
            .map(|field| escape(book.field(*field)))
            .collect();
        output.push_str(&values.join(","));
        output.push('\n');
    }

    output
}

/// Quotes a cell if it contains a delimiter, quote or line break
fn escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Header columns that do not name a book field and are ignored on import
pub fn ignored_columns(text: &str) -> Result<Vec<String>, CsvError> {
    let rows = split_rows(text)?;
    Ok(match rows.first() {
        Some(header) if is_header(header) => header
            .iter()
            .filter(|cell| cell.parse::<Field>().is_err())
            .cloned()
            .collect(),
        _ => Vec::new(),
    })
}
