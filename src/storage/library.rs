//! Library management
//!
//! Handles library initialization and wires the persisted book file to an
//! in-memory [`Inventory`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, JsonlStore};
use crate::domain::{ImportReport, Inventory, SortState};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Not in a shelf library. Run 'shelf init' first.")]
    NotInLibrary,
}

/// A shelf library rooted at a directory containing `.shelf/`
pub struct Library {
    root: PathBuf,
    config: Config,
}

impl Library {
    /// Opens an existing library at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(".shelf").is_dir() {
            return Err(LibraryError::NotInLibrary.into());
        }

        let config = Config::for_library(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the library at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_library_root().ok_or(LibraryError::NotInLibrary)?;

        Self::open(root)
    }

    /// Initializes a new library at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let shelf_dir = root.join(".shelf");

        fs::create_dir_all(&shelf_dir).with_context(|| {
            format!("Failed to create .shelf directory: {}", shelf_dir.display())
        })?;

        // Create default config
        let config_path = shelf_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# shelf library configuration

# Fields with a secondary index for `shelf by` and `shelf index`
indexed_fields = ["title", "author"]

# Status given to books added without --status
default_status = "available"

# Sort key for `shelf list` when --sort is not given
# default_sort = "title"
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let books_path = shelf_dir.join("books.jsonl");
        if !books_path.exists() {
            fs::write(&books_path, "")
                .with_context(|| format!("Failed to create book file: {}", books_path.display()))?;
        }

        let gitignore_path = shelf_dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = r#"# Ignore sort state (per-user view setting)
view.json
"#;
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        Self::open(root)
    }

    /// Returns the library root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .shelf directory path
    pub fn shelf_dir(&self) -> PathBuf {
        self.root.join(".shelf")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the book store
    pub fn book_store(&self) -> JsonlStore {
        JsonlStore::for_library(&self.root)
    }

    /// Loads the inventory from disk
    ///
    /// Stored books are replayed through the import path, so a file with
    /// duplicate or invalid lines still yields a consistent inventory. The
    /// returned inventory writes itself back after every mutation.
    pub fn load_inventory(&self) -> Result<(Inventory, ImportReport)> {
        let store = self.book_store();
        let raws = store.read_all()?;

        let mut inventory =
            Inventory::with_indexes(self.config.library.indexed_fields.iter().copied());
        let report = inventory.restore(raws);
        inventory.attach_sink(Box::new(store));

        Ok((inventory, report))
    }

    fn view_path(&self) -> PathBuf {
        self.shelf_dir().join("view.json")
    }

    /// Returns the persisted sort state, or `Unsorted` if none was saved
    pub fn view_state(&self) -> Result<SortState> {
        let path = self.view_path();
        if !path.exists() {
            return Ok(SortState::Unsorted);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read view state: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse view state: {}", path.display()))
    }

    /// Persists the sort state used by `shelf sort`
    pub fn save_view_state(&self, state: SortState) -> Result<()> {
        let path = self.view_path();
        let content = serde_json::to_string(&state).context("Failed to serialize view state")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write view state: {}", path.display()))
    }
}
