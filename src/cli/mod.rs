//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Library management | `init`, `status` |
//! | Book | Record lifecycle | `add`, `edit`, `remove`, `show` |
//! | View | Filtering and ordering | `list --author`, `sort title` |
//! | Index | Exact-value lookups | `by author Herbert`, `index category` |
//! | Transfer | Bulk data | `import books.csv`, `export --as jsonl`, `lookup` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! The default can be changed with `default_format` in the global config.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! shelf --verbose list --sort author
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod book;
mod transfer;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
pub use transfer::FileFormat;
