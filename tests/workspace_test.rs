//! Integration tests for the folder utilities.

use pdfdesk::workspace;
use std::fs;
use std::path::Path;

fn touch(path: &Path) {
    fs::write(path, b"content").unwrap();
}

#[test]
fn test_list_and_search_together() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir(&docs).unwrap();
    touch(&docs.join("invoice-2024.pdf"));
    touch(&docs.join("invoice-2025.pdf"));
    touch(&dir.path().join("readme.txt"));

    let entries = workspace::list_folder(dir.path()).unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].is_dir);
    assert_eq!(entries[0].name, "docs");
    assert_eq!(entries[1].name, "readme.txt");

    let found = workspace::search_folder(dir.path(), "INVOICE").unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|e| e.name.starts_with("invoice-")));

    let found = workspace::search_folder(dir.path(), "2025").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "invoice-2025.pdf");
}

#[test]
fn test_organize_then_reorganize_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("a.pdf"));
    touch(&dir.path().join("b.png"));
    touch(&dir.path().join("c.zip"));

    let first = workspace::organize_folder(dir.path(), false).unwrap();
    assert_eq!(first.len(), 3);
    assert!(dir.path().join("documents").join("a.pdf").is_file());
    assert!(dir.path().join("images").join("b.png").is_file());
    assert!(dir.path().join("archives").join("c.zip").is_file());

    // nothing left at the top level, so a second pass is a no-op
    let second = workspace::organize_folder(dir.path(), false).unwrap();
    assert!(second.is_empty());
}

#[test]
fn test_organize_dry_run_reports_without_moving() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("song.flac"));

    let moves = workspace::organize_folder(dir.path(), true).unwrap();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].to, dir.path().join("audio").join("song.flac"));
    assert!(dir.path().join("song.flac").is_file());
    assert!(!dir.path().join("audio").exists());
}

#[test]
fn test_search_missing_root_is_error() {
    assert!(workspace::search_folder("/no/such/root", "x").is_err());
}

#[test]
fn test_default_root_exists_as_constant() {
    // platform-dependent, but always an absolute path
    assert!(workspace::default_root().is_absolute());
}
