//! CLI integration tests for shelf
//!
//! These tests drive the binary from initialization through book
//! management, checking that commands agree with each other through the
//! persisted library.

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command instance for the shelf binary
fn shelf_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("shelf"));
    cmd.env_remove("SHELF_FORMAT")
        .env_remove("SHELF_CATALOG")
        .env("XDG_CONFIG_HOME", std::env::temp_dir().join("shelf-tests-no-config"));
    cmd
}

/// Create a temporary directory and initialize a shelf library
fn setup_library() -> TempDir {
    let dir = TempDir::new().unwrap();
    shelf_cmd().arg("init").arg(dir.path()).assert().success();
    dir
}

/// Adds a book with an explicit ID
fn add_book(dir: &TempDir, id: &str, title: &str, author: &str) {
    shelf_cmd()
        .current_dir(dir.path())
        .args(["add", title, "--id", id, "--author", author])
        .assert()
        .success();
}

/// Runs `shelf --format json` with the given args and parses stdout
fn json_output(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = shelf_cmd()
        .current_dir(dir.path())
        .args(["--format", "json"])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "command failed: {:?}", args);
    serde_json::from_slice(&output.stdout).unwrap()
}

fn listed_ids(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|book| book["id"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();

    shelf_cmd()
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized shelf library"));

    assert!(dir.path().join(".shelf").is_dir());
    assert!(dir.path().join(".shelf/books.jsonl").is_file());
    assert!(dir.path().join(".shelf/config.toml").is_file());
    assert!(dir.path().join(".shelf/.gitignore").is_file());
}

#[test]
fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();

    shelf_cmd().arg("init").arg(dir.path()).assert().success();
    shelf_cmd().arg("init").arg(dir.path()).assert().success();
}

#[test]
fn test_commands_outside_library_fail() {
    let dir = TempDir::new().unwrap();

    shelf_cmd()
        .current_dir(dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in a shelf library"));
}

// =============================================================================
// Book Tests
// =============================================================================

#[test]
fn test_add_and_list_keeps_insertion_order() {
    let dir = setup_library();
    add_book(&dir, "3", "Moby Dick", "Melville");
    add_book(&dir, "1", "Dune", "Herbert");
    add_book(&dir, "2", "Emma", "Austen");

    shelf_cmd()
        .current_dir(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Moby Dick"))
        .stdout(predicate::str::contains("Herbert"));

    let listed = json_output(&dir, &["list"]);
    assert_eq!(listed_ids(&listed), vec!["3", "1", "2"]);

    let stored = fs::read_to_string(dir.path().join(".shelf/books.jsonl")).unwrap();
    assert_eq!(stored.lines().count(), 3);
}

#[test]
fn test_add_generates_id() {
    let dir = setup_library();

    let added = json_output(&dir, &["add", "The Left Hand of Darkness"]);
    let id = added["id"].as_str().unwrap();
    assert!(id.starts_with("b-"));
    assert_eq!(added["status"], "available");

    shelf_cmd()
        .current_dir(dir.path())
        .args(["show", id])
        .assert()
        .success()
        .stdout(predicate::str::contains("The Left Hand of Darkness"));
}

#[test]
fn test_add_duplicate_id_rejected() {
    let dir = setup_library();
    add_book(&dir, "1", "Dune", "Herbert");

    shelf_cmd()
        .current_dir(dir.path())
        .args(["add", "Other", "--id", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let listed = json_output(&dir, &["list"]);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["title"], "Dune");
}

#[test]
fn test_add_blank_title_rejected() {
    let dir = setup_library();

    shelf_cmd()
        .current_dir(dir.path())
        .args(["add", "   ", "--id", "1"])
        .assert()
        .failure();

    let listed = json_output(&dir, &["list"]);
    assert!(listed.as_array().unwrap().is_empty());
}

#[test]
fn test_show_missing_book_fails() {
    let dir = setup_library();

    shelf_cmd()
        .current_dir(dir.path())
        .args(["show", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_edit_updates_fields_and_indexes() {
    let dir = setup_library();
    add_book(&dir, "1", "Dune", "Herbert");

    shelf_cmd()
        .current_dir(dir.path())
        .args(["edit", "1", "--author", "Frank Herbert", "--status", "loaned"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated book"));

    let book = json_output(&dir, &["show", "1"]);
    assert_eq!(book["author"], "Frank Herbert");
    assert_eq!(book["status"], "loaned");
    assert_eq!(book["title"], "Dune");

    let by_old = json_output(&dir, &["by", "author", "Herbert"]);
    assert!(by_old.as_array().unwrap().is_empty());
    let by_new = json_output(&dir, &["by", "author", "Frank Herbert"]);
    assert_eq!(listed_ids(&by_new), vec!["1"]);
}

#[test]
fn test_edit_without_fields_fails() {
    let dir = setup_library();
    add_book(&dir, "1", "Dune", "Herbert");

    shelf_cmd()
        .current_dir(dir.path())
        .args(["edit", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to edit"));
}

#[test]
fn test_remove_keeps_order_of_remaining() {
    let dir = setup_library();
    add_book(&dir, "a", "Alice", "X");
    add_book(&dir, "b", "Bob", "Y");
    add_book(&dir, "c", "Charlie", "Z");
    add_book(&dir, "d", "Garfield", "W");

    shelf_cmd()
        .current_dir(dir.path())
        .args(["remove", "b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed book"));

    let listed = json_output(&dir, &["list"]);
    assert_eq!(listed_ids(&listed), vec!["a", "c", "d"]);

    let by_title = json_output(&dir, &["by", "title", "Bob"]);
    assert!(by_title.as_array().unwrap().is_empty());
}

#[test]
fn test_remove_missing_book_fails() {
    let dir = setup_library();
    add_book(&dir, "1", "Dune", "Herbert");

    shelf_cmd()
        .current_dir(dir.path())
        .args(["remove", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    let listed = json_output(&dir, &["list"]);
    assert_eq!(listed_ids(&listed), vec!["1"]);
}

// =============================================================================
// View Tests
// =============================================================================

#[test]
fn test_list_filters_case_insensitively() {
    let dir = setup_library();
    add_book(&dir, "1", "Dune", "Frank Herbert");
    add_book(&dir, "2", "Dune Messiah", "Frank Herbert");
    add_book(&dir, "3", "Emma", "Jane Austen");

    let listed = json_output(&dir, &["list", "--title", "DUNE"]);
    assert_eq!(listed_ids(&listed), vec!["1", "2"]);

    let listed = json_output(&dir, &["list", "--title", "dune", "--author", "austen"]);
    assert!(listed.as_array().unwrap().is_empty());

    shelf_cmd()
        .current_dir(dir.path())
        .args(["list", "--author", "tolkien"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No books match the filter"));
}

#[test]
fn test_list_sort_and_desc() {
    let dir = setup_library();
    add_book(&dir, "1", "moby dick", "Melville");
    add_book(&dir, "2", "Dune", "Herbert");
    add_book(&dir, "3", "emma", "Austen");

    let asc = json_output(&dir, &["list", "--sort", "title"]);
    assert_eq!(listed_ids(&asc), vec!["2", "3", "1"]);

    let desc = json_output(&dir, &["list", "--sort", "title", "--desc"]);
    assert_eq!(listed_ids(&desc), vec!["1", "3", "2"]);

    // Sorting is a view; stored order is unchanged
    let plain = json_output(&dir, &["list"]);
    assert_eq!(listed_ids(&plain), vec!["1", "2", "3"]);
}

#[test]
fn test_list_uses_configured_default_sort() {
    let dir = setup_library();
    fs::write(
        dir.path().join(".shelf/config.toml"),
        "default_sort = \"title\"\n",
    )
    .unwrap();
    add_book(&dir, "1", "moby dick", "Melville");
    add_book(&dir, "2", "Dune", "Herbert");
    add_book(&dir, "3", "emma", "Austen");

    let listed = json_output(&dir, &["list"]);
    assert_eq!(listed_ids(&listed), vec!["2", "3", "1"]);

    let listed = json_output(&dir, &["list", "--desc"]);
    assert_eq!(listed_ids(&listed), vec!["1", "3", "2"]);

    // An explicit --sort wins over the configured key
    let listed = json_output(&dir, &["list", "--sort", "author"]);
    assert_eq!(listed_ids(&listed), vec!["3", "2", "1"]);
}

#[test]
fn test_list_desc_without_any_sort_key_fails() {
    let dir = setup_library();
    add_book(&dir, "1", "Dune", "Herbert");

    shelf_cmd()
        .current_dir(dir.path())
        .args(["list", "--desc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--desc needs a sort key"));
}

#[test]
fn test_sort_toggles_direction() {
    let dir = setup_library();
    add_book(&dir, "10", "B", "x");
    add_book(&dir, "9", "A", "y");
    add_book(&dir, "100", "C", "z");

    let first = json_output(&dir, &["sort", "id"]);
    assert_eq!(listed_ids(&first), vec!["9", "10", "100"]);

    let second = json_output(&dir, &["sort", "id"]);
    assert_eq!(listed_ids(&second), vec!["100", "10", "9"]);

    let third = json_output(&dir, &["sort", "id"]);
    assert_eq!(listed_ids(&third), vec!["9", "10", "100"]);

    shelf_cmd()
        .current_dir(dir.path())
        .args(["sort", "title"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sorted by title (asc)"));
}

// =============================================================================
// Index Tests
// =============================================================================

#[test]
fn test_by_uses_exact_value() {
    let dir = setup_library();
    add_book(&dir, "1", "Dune", "Herbert");
    add_book(&dir, "2", "Dune Messiah", "Herbert");
    add_book(&dir, "3", "Emma", "Austen");

    let found = json_output(&dir, &["by", "author", "Herbert"]);
    assert_eq!(listed_ids(&found), vec!["1", "2"]);

    let found = json_output(&dir, &["by", "title", "Dune"]);
    assert_eq!(listed_ids(&found), vec!["1"]);

    let found = json_output(&dir, &["by", "id", "3"]);
    assert_eq!(listed_ids(&found), vec!["3"]);

    shelf_cmd()
        .current_dir(dir.path())
        .args(["by", "author", "Tolkien"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No books with author = 'Tolkien'"));
}

#[test]
fn test_index_shows_distinct_values() {
    let dir = setup_library();
    add_book(&dir, "1", "Dune", "Herbert");
    add_book(&dir, "2", "Dune Messiah", "Herbert");
    add_book(&dir, "3", "Emma", "Austen");

    let values = json_output(&dir, &["index", "author"]);
    let values = values.as_array().unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values[0]["value"], "Austen");
    assert_eq!(values[1]["value"], "Herbert");
    assert_eq!(values[1]["count"], 2);

    shelf_cmd()
        .current_dir(dir.path())
        .args(["index", "category"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not indexed"));
}

#[test]
fn test_configured_indexes() {
    let dir = setup_library();
    fs::write(
        dir.path().join(".shelf/config.toml"),
        "indexed_fields = [\"category\"]\n",
    )
    .unwrap();

    shelf_cmd()
        .current_dir(dir.path())
        .args(["add", "Dune", "--id", "1", "--category", "sf"])
        .assert()
        .success();

    let values = json_output(&dir, &["index", "category"]);
    assert_eq!(values[0]["value"], "sf");

    shelf_cmd()
        .current_dir(dir.path())
        .args(["index", "title"])
        .assert()
        .failure();
}

// =============================================================================
// Transfer Tests
// =============================================================================

#[test]
fn test_import_csv_skips_duplicates_and_invalid() {
    let dir = setup_library();
    add_book(&dir, "1", "Dune", "Herbert");

    let csv_path = dir.path().join("books.csv");
    fs::write(
        &csv_path,
        "id,title,author,category,status\n\
         1,Dune again,Herbert,,\n\
         2,\"Moby Dick, or The Whale\",Melville,classic,available\n\
         3,,Nobody,,\n\
         2,Duplicate in file,X,,\n\
         4,Emma,Austen,classic,loaned\n",
    )
    .unwrap();

    let report = json_output(&dir, &["import", csv_path.to_str().unwrap()]);
    assert_eq!(report["added"], 2);
    assert_eq!(report["skipped_invalid"], 1);
    assert_eq!(report["skipped_duplicate"], 2);

    let listed = json_output(&dir, &["list"]);
    assert_eq!(listed_ids(&listed), vec!["1", "2", "4"]);
    assert_eq!(listed[0]["title"], "Dune");
    assert_eq!(listed[1]["title"], "Moby Dick, or The Whale");
}

#[test]
fn test_import_unknown_extension_needs_format() {
    let dir = setup_library();
    let path = dir.path().join("books.txt");
    fs::write(&path, "[{\"id\":\"1\",\"title\":\"Dune\"}]").unwrap();

    shelf_cmd()
        .current_dir(dir.path())
        .args(["import", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--as"));

    shelf_cmd()
        .current_dir(dir.path())
        .args(["import", path.to_str().unwrap(), "--as", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 book(s)"));
}

#[test]
fn test_export_csv_to_stdout() {
    let dir = setup_library();
    add_book(&dir, "2", "Moby Dick, or The Whale", "Melville");
    add_book(&dir, "1", "Dune", "Herbert");

    shelf_cmd()
        .current_dir(dir.path())
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id,title,author,category,status\n"))
        .stdout(predicate::str::contains(
            "2,\"Moby Dick, or The Whale\",Melville,,available\n1,Dune,Herbert,,available",
        ));
}

#[test]
fn test_export_then_import_into_new_library() {
    let source = setup_library();
    add_book(&source, "1", "Dune", "Herbert");
    add_book(&source, "2", "Emma", "Austen");

    let file = source.path().join("dump.jsonl");
    shelf_cmd()
        .current_dir(source.path())
        .args(["export", file.to_str().unwrap(), "--as", "jsonl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 book(s)"));

    let target = setup_library();
    shelf_cmd()
        .current_dir(target.path())
        .args(["import", file.to_str().unwrap()])
        .assert()
        .success();

    let listed = json_output(&target, &["list"]);
    assert_eq!(listed_ids(&listed), vec!["1", "2"]);
}

#[test]
fn test_lookup_and_add_from_catalog() {
    let dir = setup_library();
    add_book(&dir, "1", "Dune", "Herbert");

    let catalog = dir.path().join("catalog.json");
    fs::write(
        &catalog,
        r#"[
            {"id": "1", "title": "Dune", "author": "Frank Herbert"},
            {"id": "7", "title": "Dune Messiah", "author": "Frank Herbert"},
            {"id": "8", "title": "Emma", "author": "Jane Austen"}
        ]"#,
    )
    .unwrap();

    shelf_cmd()
        .current_dir(dir.path())
        .args(["lookup", "dune", "--catalog", catalog.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dune Messiah"))
        .stdout(predicate::str::contains("Emma").not());

    shelf_cmd()
        .current_dir(dir.path())
        .args(["lookup", "dune", "--catalog", catalog.to_str().unwrap(), "--add"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 book(s)"));

    let listed = json_output(&dir, &["list"]);
    assert_eq!(listed_ids(&listed), vec!["1", "7"]);
}

// =============================================================================
// Status and Output Tests
// =============================================================================

#[test]
fn test_status_counts() {
    let dir = setup_library();
    add_book(&dir, "1", "Dune", "Herbert");
    shelf_cmd()
        .current_dir(dir.path())
        .args(["add", "Emma", "--id", "2", "--status", "loaned"])
        .assert()
        .success();

    let status = json_output(&dir, &["status"]);
    assert_eq!(status["books"], 2);
    assert_eq!(status["by_status"]["available"], 1);
    assert_eq!(status["by_status"]["loaned"], 1);
    assert_eq!(status["sort"]["state"], "unsorted");

    shelf_cmd()
        .current_dir(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Books: 2 total"));
}

#[test]
fn test_json_success_message() {
    let dir = setup_library();
    add_book(&dir, "1", "Dune", "Herbert");

    shelf_cmd()
        .current_dir(dir.path())
        .args(["--format", "json", "remove", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"remaining\":0"));
}

#[test]
fn test_format_from_environment() {
    let dir = setup_library();
    add_book(&dir, "1", "Dune", "Herbert");

    let output = shelf_cmd()
        .current_dir(dir.path())
        .env("SHELF_FORMAT", "json")
        .args(["show", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let book: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(book["title"], "Dune");

    // The flag takes precedence over the environment
    shelf_cmd()
        .current_dir(dir.path())
        .env("SHELF_FORMAT", "json")
        .args(["--format", "text", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: Dune"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_format_from_global_config() {
    let dir = setup_library();
    add_book(&dir, "1", "Dune", "Herbert");

    let config_home = TempDir::new().unwrap();
    fs::create_dir_all(config_home.path().join("shelf")).unwrap();
    fs::write(
        config_home.path().join("shelf/config.toml"),
        "default_format = \"json\"\n",
    )
    .unwrap();

    let output = shelf_cmd()
        .current_dir(dir.path())
        .env("XDG_CONFIG_HOME", config_home.path())
        .args(["show", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let book: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(book["id"], "1");

    // Environment and flag both override the global config
    shelf_cmd()
        .current_dir(dir.path())
        .env("XDG_CONFIG_HOME", config_home.path())
        .env("SHELF_FORMAT", "text")
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: Dune"));

    shelf_cmd()
        .current_dir(dir.path())
        .env("XDG_CONFIG_HOME", config_home.path())
        .args(["-f", "text", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: Dune"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let dir = setup_library();

    shelf_cmd()
        .current_dir(dir.path())
        .args(["--verbose", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[verbose:list]"))
        .stdout(predicate::str::contains("[verbose").not());
}
