//! Shelf CLI - A small book inventory kept next to your files
//!
//! Books live in an in-memory [`Inventory`] that keeps insertion order, a
//! primary index by ID and secondary indexes on chosen fields. Every change
//! is written back to `.shelf/books.jsonl`.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Book, BookId, Field, Inventory, Query, SortState, StoreError};
