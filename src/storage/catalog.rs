//! Catalog lookup
//!
//! A catalog supplies candidate books, keyed by externally assigned IDs,
//! for a title query. Candidates are added through the inventory's import
//! path, so IDs already on the shelf are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::domain::RawBook;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog file not found: {0}")]
    NotFound(PathBuf),

    #[error("Catalog query must not be empty")]
    EmptyQuery,
}

/// A source of candidate books
pub trait CatalogSource {
    /// Human-readable name of the source
    fn name(&self) -> &str;

    /// Returns candidates whose title matches `query`
    fn search_title(&self, query: &str) -> Result<Vec<RawBook>>;
}

/// Catalog backed by a JSON array of books on disk
pub struct FileCatalog {
    path: PathBuf,
    name: String,
}

impl FileCatalog {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(CatalogError::NotFound(path).into());
        }

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "catalog".to_string());

        Ok(Self { path, name })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Vec<RawBook>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read catalog: {}", self.path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog: {}", self.path.display()))
    }
}

impl CatalogSource for FileCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    fn search_title(&self, query: &str) -> Result<Vec<RawBook>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Err(CatalogError::EmptyQuery.into());
        }

        Ok(self
            .read_entries()?
            .into_iter()
            .filter(|entry| entry.title.to_lowercase().contains(&query))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Inventory;
    use tempfile::TempDir;

    fn write_catalog(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("openlib.json");
        fs::write(
            &path,
            r#"[
                {"id": "OL1", "title": "Dune", "author": "Frank Herbert"},
                {"id": "OL2", "title": "Dune Messiah", "author": "Frank Herbert"},
                {"id": "OL3", "title": "Emma", "author": "Jane Austen"}
            ]"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn searches_titles_case_insensitively() {
        let dir = TempDir::new().unwrap();
        let catalog = FileCatalog::open(write_catalog(&dir)).unwrap();

        let hits = catalog.search_title("dUNE").unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["OL1", "OL2"]);
        assert_eq!(catalog.name(), "openlib");
    }

    #[test]
    fn empty_query_is_rejected() {
        let dir = TempDir::new().unwrap();
        let catalog = FileCatalog::open(write_catalog(&dir)).unwrap();

        assert!(catalog.search_title("  ").is_err());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = FileCatalog::open(dir.path().join("missing.json")).err().unwrap();
        assert!(err.to_string().contains("Catalog file not found"));
    }

    #[test]
    fn candidates_are_deduplicated_on_import() {
        let dir = TempDir::new().unwrap();
        let catalog = FileCatalog::open(write_catalog(&dir)).unwrap();

        let mut inventory = Inventory::new();
        inventory
            .import(vec![RawBook::new("OL1", "Dune")])
            .unwrap();

        let report = inventory
            .import(catalog.search_title("dune").unwrap())
            .unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(report.skipped_duplicate, 1);
        assert_eq!(inventory.len(), 2);
    }
}
