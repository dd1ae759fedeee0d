//! Recipe Store
//!
//! The storage engine: one data directory, one index file, one file per
//! record, and an in-memory copy of the index.

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::config::{Config, ReconcileMode};
use crate::error::{RecipeError, Result};
use crate::record::Record;

use super::{
    decode_index, encode_index, is_valid_id, validate_id, Index, ReconcileReport,
    INDEX_FILENAME, RECORD_EXTENSION,
};

/// Storage engine bound to a single data directory
///
/// ## Concurrency
/// - `index`: the cached index, guarded by an RwLock. `set_item` and
///   `remove_item` hold the write lock across the record file change and
///   the index rewrite, so writers in one process are serialized and a
///   record file never disagrees with its index title.
/// - Nothing here coordinates with other processes sharing the directory.
///
/// ## Lifecycle
/// `new` binds the directory, `initialize` loads or bootstraps the index.
/// Until then every operation that needs the cached index fails with
/// `RecipeError::Initialization`. `open` does both in one step.
pub struct RecipeStore {
    /// Root of all engine-managed files
    data_dir: PathBuf,

    /// `{data_dir}/index.json`
    index_path: PathBuf,

    /// Cached index, `None` until initialized
    index: RwLock<Option<Index>>,
}

impl RecipeStore {
    /// Bind a store to a directory (no I/O)
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let index_path = data_dir.join(INDEX_FILENAME);
        Self {
            data_dir,
            index_path,
            index: RwLock::new(None),
        }
    }

    /// Bind, initialize, and reconcile according to `config`
    pub fn open(config: &Config) -> Result<Self> {
        let store = Self::new(config.data_dir.clone());
        store.initialize()?;

        match config.reconcile_on_open {
            ReconcileMode::Off => {}
            ReconcileMode::Report => {
                let report = store.reconcile()?;
                if !report.is_consistent() {
                    tracing::warn!(
                        "Index diverges from record files in {} ({}): unindexed={:?} missing={:?}",
                        store.data_dir.display(),
                        report,
                        report.unindexed,
                        report.missing
                    );
                }
            }
            ReconcileMode::Repair => {
                if !store.reconcile()?.is_consistent() {
                    let report = store.repair()?;
                    tracing::info!("Rebuilt index from record files ({})", report);
                }
            }
        }

        Ok(store)
    }

    /// Load or bootstrap the index
    ///
    /// - Directory readable and writable by this process: load the index
    ///   file into the cache.
    /// - Directory missing: create it, write `{}` to the index file, start
    ///   with an empty cache.
    /// - Anything else (present but inaccessible, not a directory): fail.
    ///
    /// An existing index file is never overwritten. Safe to call again; a
    /// second call reloads the cache from disk, and a failed call leaves
    /// the store uninitialized. Every failure is reported as
    /// `RecipeError::Initialization`.
    pub fn initialize(&self) -> Result<()> {
        match self.load_or_bootstrap() {
            Ok(index) => {
                *self.index.write() = Some(index);
                Ok(())
            }
            Err(e) => {
                *self.index.write() = None;
                Err(e)
            }
        }
    }

    /// Load an existing store without ever creating anything
    ///
    /// For inspection tools: a missing or inaccessible directory fails with
    /// `RecipeError::Initialization` and the filesystem is left untouched.
    pub fn attach(&self) -> Result<()> {
        let loaded = if Self::is_accessible(&self.data_dir) {
            self.load_existing()
        } else {
            Err(RecipeError::Initialization(format!(
                "{} is not an accessible data directory",
                self.data_dir.display()
            )))
        };

        let mut guard = self.index.write();
        match loaded {
            Ok(index) => {
                *guard = Some(index);
                Ok(())
            }
            Err(e) => {
                *guard = None;
                Err(e)
            }
        }
    }

    fn load_existing(&self) -> Result<Index> {
        let index = self.get_index().map_err(|e| {
            RecipeError::Initialization(format!("loading {}: {}", self.index_path.display(), e))
        })?;

        tracing::info!(
            "Loaded index with {} entries from {}",
            index.len(),
            self.index_path.display()
        );
        Ok(index)
    }

    fn load_or_bootstrap(&self) -> Result<Index> {
        if Self::is_accessible(&self.data_dir) {
            return self.load_existing();
        }

        if let Some(parent) = self.data_dir.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    RecipeError::Initialization(format!("creating {}: {}", parent.display(), e))
                })?;
            }
        }
        // Fails with AlreadyExists for a directory we may not use
        fs::create_dir(&self.data_dir).map_err(|e| {
            RecipeError::Initialization(format!("creating {}: {}", self.data_dir.display(), e))
        })?;

        let empty = Index::new();
        let bytes = encode_index(&empty)
            .map_err(|e| RecipeError::Initialization(format!("encoding empty index: {}", e)))?;
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.index_path)
            .and_then(|mut file| file.write_all(&bytes))
            .map_err(|e| {
                RecipeError::Initialization(format!(
                    "writing {}: {}",
                    self.index_path.display(),
                    e
                ))
            })?;

        tracing::info!("Bootstrapped empty store at {}", self.data_dir.display());
        Ok(empty)
    }

    /// True once `initialize` has succeeded
    pub fn is_initialized(&self) -> bool {
        self.index.read().is_some()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Read the index file fresh from disk (not the cache)
    pub fn get_index(&self) -> Result<Index> {
        let bytes = fs::read(&self.index_path)?;
        decode_index(&bytes)
    }

    /// Snapshot of the cached index
    pub fn cached_index(&self) -> Result<Index> {
        self.index.read().clone().ok_or_else(not_initialized)
    }

    /// Load a full record
    ///
    /// Errors:
    /// - `InvalidIdentifier`: `id` fails the grammar (no I/O is attempted)
    /// - `NotFound`: no record file for `id`
    /// - `CorruptRecord`: the file is not a JSON object with a string `title`
    /// - `Io`: anything else
    pub fn get_item(&self, id: &str) -> Result<Record> {
        validate_id(id)?;

        let bytes = match fs::read(self.record_path(id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RecipeError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        Record::from_slice(&bytes).map_err(|source| RecipeError::CorruptRecord {
            id: id.to_string(),
            source,
        })
    }

    /// True iff a record file for `id` is present and readable
    ///
    /// Any failure, permission errors included, reads as "absent".
    pub fn exists(&self, id: &str) -> bool {
        if !is_valid_id(id) {
            return false;
        }
        fs::File::open(self.record_path(id))
            .and_then(|file| file.metadata())
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Create or overwrite the record stored under `id`
    ///
    /// Steps:
    /// 1. Validate `id` (nothing is written on failure)
    /// 2. Take the index write lock, then write `{id}.json`
    /// 3. Set `id → record.title` in the cache
    /// 4. Rewrite `index.json`
    ///
    /// If step 4 fails the record is on disk but unindexed; the error is
    /// returned and the divergence is left for `reconcile`/`repair`.
    pub fn set_item(&self, id: &str, record: &Record) -> Result<()> {
        validate_id(id)?;
        let bytes = record.to_vec().map_err(RecipeError::Serialization)?;

        // Held across both writes so the file and its index title agree
        let mut guard = self.index.write();
        let index = guard.as_mut().ok_or_else(not_initialized)?;

        fs::write(self.record_path(id), bytes)?;
        tracing::debug!("Wrote record {}", id);
        index.insert(id.to_string(), record.title.clone());

        if let Err(e) = self.persist_index(index) {
            tracing::warn!("Record {} written but index update failed: {}", id, e);
            return Err(e);
        }
        Ok(())
    }

    /// Delete the record stored under `id`
    ///
    /// A missing record file is `NotFound`, unless the index still lists
    /// `id`; then the stale entry is dropped and the call succeeds.
    pub fn remove_item(&self, id: &str) -> Result<()> {
        validate_id(id)?;

        let mut guard = self.index.write();
        let index = guard.as_mut().ok_or_else(not_initialized)?;

        let file_missing = match fs::remove_file(self.record_path(id)) {
            Ok(()) => false,
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };
        let was_indexed = index.remove(id).is_some();

        if file_missing && !was_indexed {
            return Err(RecipeError::NotFound(id.to_string()));
        }
        if file_missing {
            tracing::warn!("Dropping stale index entry {} (record file already gone)", id);
        } else {
            tracing::debug!("Removed record {}", id);
        }

        if let Err(e) = self.persist_index(index) {
            tracing::warn!("Record {} removed but index update failed: {}", id, e);
            return Err(e);
        }
        Ok(())
    }

    /// Rewrite `index.json` from the cache in a single write
    pub fn write_index(&self) -> Result<()> {
        let guard = self.index.read();
        let index = guard.as_ref().ok_or_else(not_initialized)?;
        self.persist_index(index)
    }

    // =========================================================================
    // Consistency
    // =========================================================================

    /// Compare cached index keys with the record files on disk
    pub fn reconcile(&self) -> Result<ReconcileReport> {
        let on_disk = self.scan_record_ids()?;

        let guard = self.index.read();
        let index = guard.as_ref().ok_or_else(not_initialized)?;

        Ok(ReconcileReport {
            unindexed: on_disk
                .iter()
                .filter(|id| !index.contains_key(*id))
                .cloned()
                .collect(),
            missing: index
                .keys()
                .filter(|id| !on_disk.contains(*id))
                .cloned()
                .collect(),
            unreadable: Vec::new(),
        })
    }

    /// Rebuild the index from the record files present
    ///
    /// Titles are re-read from each file. Files that cannot be read or
    /// parsed are left out of the index and listed as `unreadable`.
    /// Returns the divergence that was repaired.
    pub fn repair(&self) -> Result<ReconcileReport> {
        let on_disk = self.scan_record_ids()?;

        let mut rebuilt = Index::new();
        let mut unreadable = Vec::new();
        for id in on_disk {
            match self.get_item(&id) {
                Ok(record) => {
                    rebuilt.insert(id, record.title);
                }
                Err(e) => {
                    tracing::warn!("Skipping record {} during repair: {}", id, e);
                    unreadable.push(id);
                }
            }
        }

        let mut guard = self.index.write();
        let index = guard.as_mut().ok_or_else(not_initialized)?;

        let report = ReconcileReport {
            unindexed: rebuilt
                .keys()
                .filter(|id| !index.contains_key(*id))
                .cloned()
                .collect(),
            missing: index
                .keys()
                .filter(|id| !rebuilt.contains_key(*id))
                .cloned()
                .collect(),
            unreadable,
        };

        self.persist_index(&rebuilt)?;
        *index = rebuilt;
        Ok(report)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the index file path
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Path of the record file for `id` (no validation)
    pub fn record_path(&self, id: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", id, RECORD_EXTENSION))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn persist_index(&self, index: &Index) -> Result<()> {
        let bytes = encode_index(index)?;
        fs::write(&self.index_path, bytes)?;
        Ok(())
    }

    /// Directory exists and this process may read and write in it
    #[cfg(unix)]
    fn is_accessible(path: &Path) -> bool {
        use rustix::fs::{access, Access};

        path.is_dir() && access(path, Access::READ_OK | Access::WRITE_OK).is_ok()
    }

    #[cfg(not(unix))]
    fn is_accessible(path: &Path) -> bool {
        fs::metadata(path)
            .map(|meta| meta.is_dir() && !meta.permissions().readonly())
            .unwrap_or(false)
    }

    /// Identifiers of every engine-managed record file in the directory
    /// "chocolate-cake.json" → "chocolate-cake"; non-records are ignored
    fn scan_record_ids(&self) -> Result<BTreeSet<String>> {
        let mut ids = BTreeSet::new();

        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if is_valid_id(stem) {
                    ids.insert(stem.to_string());
                }
            }
        }

        Ok(ids)
    }
}

fn not_initialized() -> RecipeError {
    RecipeError::Initialization("store not initialized".to_string())
}
