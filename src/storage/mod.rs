//! # Storage Layer
//!
//! Persistence and interchange for shelf, kept outside the in-memory
//! inventory.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Books | JSONL (one JSON per line, inventory order) | `.shelf/books.jsonl` |
//! | Config | TOML | `.shelf/config.toml` |
//! | Sort state | JSON | `.shelf/view.json` |
//! | Import/export | CSV, JSONL, JSON | anywhere |
//!
//! ## Concurrency Safety
//!
//! - [`JsonlStore`] uses file locking (`fs2`) for reads and writes
//! - All writes are atomic (temp file + rename)
//!
//! ## Library Structure
//!
//! ```text
//! .shelf/
//! ├── books.jsonl           # All books in insertion order
//! ├── config.toml           # Library configuration
//! ├── view.json             # Last `shelf sort` state
//! └── .gitignore            # Ignores view state
//! ```
//!
//! ## Key Types
//!
//! - [`Library`] - Entry point for accessing a shelf library
//! - [`JsonlStore`] - Read/write books as JSONL; persists inventory snapshots
//! - [`FileCatalog`] - Catalog lookup backed by a JSON file
//! - [`Config`] - Library and global configuration

mod jsonl;
mod config;
mod library;
mod catalog;
pub mod csv;

pub use jsonl::JsonlStore;
pub use config::{Config, ConfigError, GlobalConfig, LibraryConfig, OutputFormat};
pub use library::{Library, LibraryError};
pub use catalog::{CatalogError, CatalogSource, FileCatalog};
pub use csv::CsvError;
