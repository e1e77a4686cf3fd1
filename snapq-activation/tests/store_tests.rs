mod common;

use common::date;
use pretty_assertions::assert_eq;
use snapq_activation::{
    ActivationError, ActivationRecord, ActivationStore, JsonFileStore, MemoryStore,
};
use tempfile::tempdir;

fn record(package_id: &str, machine_id: &str) -> ActivationRecord {
    ActivationRecord::new(package_id, machine_id, date(2025, 1, 1))
}

// ── JsonFileStore lifecycle ──────────────────────────────────────

#[test]
fn open_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::open(dir.path().join("activaciones.json")).unwrap();
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn commit_then_get_and_list() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::open(dir.path().join("activaciones.json")).unwrap();

    store.reserve("PKG-1").unwrap();
    store.commit(record("PKG-1", "MACHINE-A")).unwrap();

    let fetched = store.get("PKG-1").unwrap().unwrap();
    assert_eq!(fetched.machine_id, "MACHINE-A");
    assert_eq!(store.list().unwrap(), vec![record("PKG-1", "MACHINE-A")]);
    assert!(store.get("PKG-2").unwrap().is_none());
}

#[test]
fn records_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("activaciones.json");

    let store = JsonFileStore::open(&path).unwrap();
    store.reserve("PKG-1").unwrap();
    store.commit(record("PKG-1", "MACHINE-A")).unwrap();
    drop(store);

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.list().unwrap(), vec![record("PKG-1", "MACHINE-A")]);
}

#[test]
fn on_disk_layout_is_keyed_with_machine_id_and_fecha() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("activaciones.json");

    let store = JsonFileStore::open(&path).unwrap();
    store.reserve("PKG-1").unwrap();
    store
        .commit(ActivationRecord::new("PKG-1", "MACHINE-A", date(2025, 1, 31)))
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["PKG-1"]["machine_id"], "MACHINE-A");
    assert_eq!(raw["PKG-1"]["fecha"], "2025-01-31");
}

#[test]
fn atomic_replace_leaves_no_temp_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("activaciones.json");

    let store = JsonFileStore::open(&path).unwrap();
    store.reserve("PKG-1").unwrap();
    store.commit(record("PKG-1", "MACHINE-A")).unwrap();

    assert!(path.exists());
    assert!(!dir.path().join("activaciones.json.tmp").exists());
}

#[test]
fn corrupt_file_is_persistence_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("activaciones.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = JsonFileStore::open(&path).unwrap_err();
    assert!(matches!(err, ActivationError::Persistence(_)));
}

// ── Reserve / commit / release semantics ─────────────────────────

#[test]
fn double_reserve_is_already_activated() {
    let store = MemoryStore::new();
    store.reserve("PKG-1").unwrap();
    let err = store.reserve("PKG-1").unwrap_err();
    assert!(matches!(err, ActivationError::AlreadyActivated(_)));
}

#[test]
fn reserve_after_commit_is_already_activated() {
    let store = MemoryStore::new();
    store.reserve("PKG-1").unwrap();
    store.commit(record("PKG-1", "M")).unwrap();
    let err = store.reserve("PKG-1").unwrap_err();
    assert!(matches!(err, ActivationError::AlreadyActivated(_)));
}

#[test]
fn commit_never_overwrites() {
    let store = MemoryStore::new();
    store.reserve("PKG-1").unwrap();
    store.commit(record("PKG-1", "M-1")).unwrap();

    let err = store.commit(record("PKG-1", "M-2")).unwrap_err();
    assert!(matches!(err, ActivationError::AlreadyActivated(_)));
    assert_eq!(store.get("PKG-1").unwrap().unwrap().machine_id, "M-1");
}

#[test]
fn release_reopens_reserved_slot() {
    let store = MemoryStore::new();
    store.reserve("PKG-1").unwrap();
    store.release("PKG-1");
    store.reserve("PKG-1").unwrap();
}

#[test]
fn release_does_not_touch_committed_records() {
    let store = MemoryStore::new();
    store.reserve("PKG-1").unwrap();
    store.commit(record("PKG-1", "M")).unwrap();
    store.release("PKG-1");
    assert!(store.get("PKG-1").unwrap().is_some());
}

#[test]
fn list_is_ordered_by_package_id() {
    let store = MemoryStore::new();
    for pkg in ["PKG-3", "PKG-1", "PKG-2"] {
        store.reserve(pkg).unwrap();
        store.commit(record(pkg, "M")).unwrap();
    }
    let ids: Vec<_> = store
        .list()
        .unwrap()
        .into_iter()
        .map(|r| r.package_id)
        .collect();
    assert_eq!(ids, vec!["PKG-1", "PKG-2", "PKG-3"]);
}

// ── Deletion ─────────────────────────────────────────────────────

#[test]
fn delete_reopens_slot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("activaciones.json");
    let store = JsonFileStore::open(&path).unwrap();

    store.reserve("PKG-1").unwrap();
    store.commit(record("PKG-1", "MACHINE-A")).unwrap();

    store.delete("PKG-1").unwrap();
    assert!(store.get("PKG-1").unwrap().is_none());

    // Deletion is durable.
    let reopened = JsonFileStore::open(&path).unwrap();
    assert!(reopened.list().unwrap().is_empty());

    store.reserve("PKG-1").unwrap();
    store.commit(record("PKG-1", "MACHINE-B")).unwrap();
    assert_eq!(store.get("PKG-1").unwrap().unwrap().machine_id, "MACHINE-B");
}

#[test]
fn delete_unknown_package_is_not_found() {
    let store = MemoryStore::new();
    let err = store.delete("PKG-404").unwrap_err();
    assert!(matches!(err, ActivationError::NotFound(_)));
}
