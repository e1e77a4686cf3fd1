//! Durable activation state with atomic reserve-then-commit semantics.
//!
//! The store is the only shared mutable resource in the system. The
//! check-and-reserve step is its sole correctness-critical critical
//! section: concurrent issuance attempts for the same package id must see
//! exactly one winner. A single store-wide mutex guards it; the
//! [`ActivationStore`] trait is the seam where a per-key lock or a
//! transactional backend would substitute without touching the issuer.

use crate::error::{ActivationError, ActivationResult};
use crate::record::{ActivationRecord, StoredActivation};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// A durable mapping from package id to activation record, with at most
/// one record per package id at any time.
///
/// Issuance uses three steps: [`reserve`](ActivationStore::reserve) holds
/// the slot before any key material is touched,
/// [`commit`](ActivationStore::commit) persists the record after signing
/// succeeded, and [`release`](ActivationStore::release) frees the slot if
/// signing failed. Reservations are in-memory only; records are durable.
pub trait ActivationStore: Send + Sync {
    /// Atomically checks for an existing record or reservation under
    /// `package_id` and holds the slot.
    ///
    /// # Errors
    ///
    /// [`ActivationError::AlreadyActivated`] when a record exists or
    /// another caller holds an uncommitted reservation.
    fn reserve(&self, package_id: &str) -> ActivationResult<()>;

    /// Durably records an activation, consuming its reservation.
    ///
    /// # Errors
    ///
    /// [`ActivationError::AlreadyActivated`] when a committed record
    /// already exists (records are never silently overwritten);
    /// [`ActivationError::Persistence`] when the write fails — the slot
    /// is released so the caller may retry.
    fn commit(&self, record: ActivationRecord) -> ActivationResult<()>;

    /// Drops an uncommitted reservation. No effect on committed records.
    fn release(&self, package_id: &str);

    /// Looks up the record for `package_id`, if any.
    fn get(&self, package_id: &str) -> ActivationResult<Option<ActivationRecord>>;

    /// Returns all records, ordered by package id.
    fn list(&self) -> ActivationResult<Vec<ActivationRecord>>;

    /// Removes the record for `package_id`, returning the package id to
    /// an unactivated state. An explicit administrative escape hatch, not
    /// a normal-path transition.
    ///
    /// # Errors
    ///
    /// [`ActivationError::NotFound`] when no record exists;
    /// [`ActivationError::Persistence`] when the write fails (the record
    /// is kept).
    fn delete(&self, package_id: &str) -> ActivationResult<()>;
}

#[derive(Debug, Default)]
struct Inner {
    records: BTreeMap<String, StoredActivation>,
    pending: HashSet<String>,
}

impl Inner {
    fn reserve(&mut self, package_id: &str) -> ActivationResult<()> {
        if self.records.contains_key(package_id) || !self.pending.insert(package_id.to_string()) {
            return Err(ActivationError::AlreadyActivated(package_id.to_string()));
        }
        Ok(())
    }

    fn insert(&mut self, record: &ActivationRecord) -> ActivationResult<()> {
        self.pending.remove(&record.package_id);
        if self.records.contains_key(&record.package_id) {
            return Err(ActivationError::AlreadyActivated(record.package_id.clone()));
        }
        self.records
            .insert(record.package_id.clone(), StoredActivation::from_record(record));
        Ok(())
    }

    fn get(&self, package_id: &str) -> Option<ActivationRecord> {
        self.records
            .get(package_id)
            .map(|stored| stored.clone().into_record(package_id))
    }

    fn list(&self) -> Vec<ActivationRecord> {
        self.records
            .iter()
            .map(|(package_id, stored)| stored.clone().into_record(package_id))
            .collect()
    }
}

fn lock_inner(mutex: &Mutex<Inner>) -> ActivationResult<MutexGuard<'_, Inner>> {
    mutex
        .lock()
        .map_err(|_| ActivationError::Persistence("activation store lock poisoned".to_string()))
}

/// File-backed activation store.
///
/// The on-disk representation is a single JSON object keyed by package
/// id, each value carrying `machine_id` and `fecha` (ISO date). Writes
/// replace the whole file atomically: serialize to a sibling `.tmp` file,
/// then rename over the original.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl JsonFileStore {
    /// Opens (or initializes) the store at `path`.
    ///
    /// A missing file is an empty store; it is created on first commit.
    ///
    /// # Errors
    ///
    /// [`ActivationError::Persistence`] when the file exists but cannot
    /// be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> ActivationResult<Self> {
        let path = path.into();
        let records = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                ActivationError::Persistence(format!("read {}: {e}", path.display()))
            })?;
            serde_json::from_str::<BTreeMap<String, StoredActivation>>(&contents).map_err(
                |e| ActivationError::Persistence(format!("parse {}: {e}", path.display())),
            )?
        } else {
            BTreeMap::new()
        };
        debug!(
            path = %path.display(),
            count = records.len(),
            "activation store opened"
        );
        Ok(Self {
            path,
            inner: Mutex::new(Inner {
                records,
                pending: HashSet::new(),
            }),
        })
    }

    /// Atomic whole-file replace: write `<path>.tmp`, then rename.
    fn persist(&self, records: &BTreeMap<String, StoredActivation>) -> ActivationResult<()> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| ActivationError::Persistence(format!("serialize activations: {e}")))?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);

        let write_then_rename = std::fs::write(&tmp, json)
            .and_then(|()| std::fs::rename(&tmp, &self.path));
        if let Err(e) = write_then_rename {
            let _ = std::fs::remove_file(&tmp);
            warn!(path = %self.path.display(), error = %e, "activation store write failed");
            return Err(ActivationError::Persistence(format!(
                "write {}: {e}",
                self.path.display()
            )));
        }
        Ok(())
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ActivationStore for JsonFileStore {
    fn reserve(&self, package_id: &str) -> ActivationResult<()> {
        lock_inner(&self.inner)?.reserve(package_id)
    }

    fn commit(&self, record: ActivationRecord) -> ActivationResult<()> {
        let mut inner = lock_inner(&self.inner)?;
        inner.insert(&record)?;
        if let Err(e) = self.persist(&inner.records) {
            inner.records.remove(&record.package_id);
            return Err(e);
        }
        Ok(())
    }

    fn release(&self, package_id: &str) {
        if let Ok(mut inner) = lock_inner(&self.inner) {
            inner.pending.remove(package_id);
        }
    }

    fn get(&self, package_id: &str) -> ActivationResult<Option<ActivationRecord>> {
        Ok(lock_inner(&self.inner)?.get(package_id))
    }

    fn list(&self) -> ActivationResult<Vec<ActivationRecord>> {
        Ok(lock_inner(&self.inner)?.list())
    }

    fn delete(&self, package_id: &str) -> ActivationResult<()> {
        let mut inner = lock_inner(&self.inner)?;
        let Some(removed) = inner.records.remove(package_id) else {
            return Err(ActivationError::NotFound(package_id.to_string()));
        };
        if let Err(e) = self.persist(&inner.records) {
            inner.records.insert(package_id.to_string(), removed);
            return Err(e);
        }
        Ok(())
    }
}

/// In-memory activation store with the same semantics as
/// [`JsonFileStore`] minus durability. Useful for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ActivationStore for MemoryStore {
    fn reserve(&self, package_id: &str) -> ActivationResult<()> {
        lock_inner(&self.inner)?.reserve(package_id)
    }

    fn commit(&self, record: ActivationRecord) -> ActivationResult<()> {
        lock_inner(&self.inner)?.insert(&record)
    }

    fn release(&self, package_id: &str) {
        if let Ok(mut inner) = lock_inner(&self.inner) {
            inner.pending.remove(package_id);
        }
    }

    fn get(&self, package_id: &str) -> ActivationResult<Option<ActivationRecord>> {
        Ok(lock_inner(&self.inner)?.get(package_id))
    }

    fn list(&self) -> ActivationResult<Vec<ActivationRecord>> {
        Ok(lock_inner(&self.inner)?.list())
    }

    fn delete(&self, package_id: &str) -> ActivationResult<()> {
        let mut inner = lock_inner(&self.inner)?;
        if inner.records.remove(package_id).is_none() {
            return Err(ActivationError::NotFound(package_id.to_string()));
        }
        Ok(())
    }
}
