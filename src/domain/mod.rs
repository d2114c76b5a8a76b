//! Domain models for shelf
//!
//! Contains the in-memory inventory and its indexes without any I/O concerns.

mod id;
mod book;
mod sequence;
mod index;
mod inventory;
pub mod view;

pub use id::{BookId, IdError};
pub use book::{Book, BookPatch, Field, FieldError, RawBook};
pub use sequence::Sequence;
pub use index::{PrimaryIndex, SecondaryIndex, SecondaryIndexes};
pub use inventory::{ImportReport, Inventory, SinkError, SnapshotSink, StoreError};
pub use view::{Query, SortDirection, SortState};
