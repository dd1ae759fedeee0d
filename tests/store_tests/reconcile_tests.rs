//! Tests for index/record reconciliation
//!
//! These tests verify:
//! - Divergence is detected in both directions
//! - Repair rebuilds the index from the record files present
//! - Startup behaviour for each ReconcileMode

use std::fs;

use recipebox::storage::{ReconcileReport, RecipeStore};
use recipebox::{Config, Record, ReconcileMode};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, RecipeStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = RecipeStore::new(temp_dir.path().join("data"));
    store.initialize().unwrap();
    (temp_dir, store)
}

/// Record file written behind the store's back (crash before index write)
fn write_unindexed(store: &RecipeStore, id: &str, title: &str) {
    let bytes = serde_json::to_vec(&json!({ "title": title })).unwrap();
    fs::write(store.record_path(id), bytes).unwrap();
}

// =============================================================================
// Reconcile Tests
// =============================================================================

#[test]
fn test_fresh_store_is_consistent() {
    let (_temp, store) = setup_temp_store();

    let report = store.reconcile().unwrap();

    assert!(report.is_consistent());
    assert_eq!(report, ReconcileReport::default());
}

#[test]
fn test_consistent_after_normal_writes() {
    let (_temp, store) = setup_temp_store();
    store.set_item("cake", &Record::new("Cake")).unwrap();
    store.set_item("pie", &Record::new("Pie")).unwrap();
    store.remove_item("pie").unwrap();

    assert!(store.reconcile().unwrap().is_consistent());
}

#[test]
fn test_detects_unindexed_record() {
    let (_temp, store) = setup_temp_store();
    store.set_item("cake", &Record::new("Cake")).unwrap();
    write_unindexed(&store, "orphan", "Orphan");

    let report = store.reconcile().unwrap();

    assert!(!report.is_consistent());
    assert_eq!(report.unindexed, vec!["orphan".to_string()]);
    assert!(report.missing.is_empty());
}

#[test]
fn test_detects_missing_record_file() {
    let (_temp, store) = setup_temp_store();
    store.set_item("cake", &Record::new("Cake")).unwrap();
    store.set_item("pie", &Record::new("Pie")).unwrap();
    fs::remove_file(store.record_path("pie")).unwrap();

    let report = store.reconcile().unwrap();

    assert_eq!(report.missing, vec!["pie".to_string()]);
    assert!(report.unindexed.is_empty());
}

#[test]
fn test_ignores_files_that_are_not_records() {
    let (_temp, store) = setup_temp_store();
    fs::write(store.data_dir().join("notes.txt"), "hello").unwrap();
    fs::write(store.data_dir().join("bad_name.json"), "{}").unwrap();
    fs::create_dir(store.data_dir().join("subdir.json")).unwrap();

    assert!(store.reconcile().unwrap().is_consistent());
}

// =============================================================================
// Repair Tests
// =============================================================================

#[test]
fn test_repair_rebuilds_index_from_files() {
    let (_temp, store) = setup_temp_store();
    store.set_item("cake", &Record::new("Cake")).unwrap();
    store.set_item("pie", &Record::new("Pie")).unwrap();
    fs::remove_file(store.record_path("pie")).unwrap();
    write_unindexed(&store, "orphan", "Orphan Soup");

    let report = store.repair().unwrap();

    assert_eq!(report.unindexed, vec!["orphan".to_string()]);
    assert_eq!(report.missing, vec!["pie".to_string()]);

    let index = store.get_index().unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index.get("cake").map(String::as_str), Some("Cake"));
    assert_eq!(index.get("orphan").map(String::as_str), Some("Orphan Soup"));
    assert!(store.reconcile().unwrap().is_consistent());
}

#[test]
fn test_repair_refreshes_stale_titles() {
    let (_temp, store) = setup_temp_store();
    store.set_item("cake", &Record::new("Cake")).unwrap();
    write_unindexed(&store, "cake", "Renamed Cake");

    store.repair().unwrap();

    assert_eq!(
        store.get_index().unwrap().get("cake").map(String::as_str),
        Some("Renamed Cake")
    );
}

#[test]
fn test_repair_skips_unreadable_records() {
    let (_temp, store) = setup_temp_store();
    store.set_item("cake", &Record::new("Cake")).unwrap();
    fs::write(store.record_path("garbage"), "not json").unwrap();

    let report = store.repair().unwrap();

    assert_eq!(report.unreadable, vec!["garbage".to_string()]);
    assert!(!store.get_index().unwrap().contains_key("garbage"));
    assert!(store.get_index().unwrap().contains_key("cake"));
}

// =============================================================================
// Open Mode Tests
// =============================================================================

fn diverged_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let store = RecipeStore::new(temp_dir.path().join("data"));
    store.initialize().unwrap();
    store.set_item("cake", &Record::new("Cake")).unwrap();
    write_unindexed(&store, "orphan", "Orphan");
    temp_dir
}

#[test]
fn test_open_report_mode_leaves_index_alone() {
    let temp_dir = diverged_dir();
    let config = Config::builder()
        .data_dir(temp_dir.path().join("data"))
        .reconcile_on_open(ReconcileMode::Report)
        .build();

    let store = RecipeStore::open(&config).unwrap();

    assert!(!store.get_index().unwrap().contains_key("orphan"));
    assert_eq!(store.reconcile().unwrap().unindexed, vec!["orphan".to_string()]);
}

#[test]
fn test_open_repair_mode_fixes_index() {
    let temp_dir = diverged_dir();
    let config = Config::builder()
        .data_dir(temp_dir.path().join("data"))
        .reconcile_on_open(ReconcileMode::Repair)
        .build();

    let store = RecipeStore::open(&config).unwrap();

    assert!(store.get_index().unwrap().contains_key("orphan"));
    assert!(store.reconcile().unwrap().is_consistent());
}

#[test]
fn test_open_off_mode_on_fresh_directory() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path().join("fresh"))
        .reconcile_on_open(ReconcileMode::Off)
        .build();

    let store = RecipeStore::open(&config).unwrap();

    assert!(store.is_initialized());
    assert!(store.get_index().unwrap().is_empty());
}
