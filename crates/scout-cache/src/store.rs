//! File-per-entry record storage
//!
//! Layout: `<cache_dir>/<identifier>.json`. Writes go to a temp file in the
//! same directory and are renamed into place, so a concurrent reader sees
//! either the previous record or the new one. Temp files left behind by a
//! crashed writer are swept once they are older than the orphan threshold.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use thiserror::Error;
use tracing::{debug, warn};

use crate::key::EntryId;

/// Store result type
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from entry storage
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entry not found: {0}")]
    NotFound(EntryId),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Durable identifier → bytes persistence.
///
/// Each entry is an independent unit; damage to one never affects another.
pub trait EntryStore: Send + Sync {
    /// Read the raw record. Missing entries are `StoreError::NotFound`.
    fn read(&self, id: &EntryId) -> StoreResult<Vec<u8>>;

    /// Write the raw record, replacing any existing one.
    fn write(&self, id: &EntryId, bytes: &[u8]) -> StoreResult<()>;

    /// Remove the record. Returns `false` if there was nothing to remove.
    fn delete(&self, id: &EntryId) -> StoreResult<bool>;

    /// All identifiers currently stored, in no particular order.
    fn list_ids(&self) -> StoreResult<Vec<EntryId>>;

    /// Size of the stored record in bytes.
    fn size_of(&self, id: &EntryId) -> StoreResult<u64>;

    /// Remove abandoned partial writes. Returns how many were removed.
    fn cleanup_orphaned_temps(&self) -> StoreResult<usize> {
        Ok(0)
    }

    /// Remove records whose name is not a valid identifier.
    fn remove_foreign_records(&self) -> StoreResult<usize> {
        Ok(0)
    }
}

/// [`EntryStore`] backed by one directory of JSON files.
#[derive(Debug, Clone)]
pub struct FileEntryStore {
    root: PathBuf,
    orphan_threshold: Duration,
}

impl FileEntryStore {
    /// Record file extension.
    pub const EXTENSION: &'static str = "json";

    /// Prefix for in-flight temp files; never listed as entries.
    const TEMP_PREFIX: &'static str = ".tmp.";

    /// Temp files older than this are treated as abandoned.
    pub const DEFAULT_ORPHAN_THRESHOLD: Duration = Duration::from_secs(3600);

    /// Open (and create if needed) a store rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            orphan_threshold: Self::DEFAULT_ORPHAN_THRESHOLD,
        })
    }

    pub fn with_orphan_threshold(mut self, threshold: Duration) -> Self {
        self.orphan_threshold = threshold;
        self
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record file for `id`.
    pub fn entry_path(&self, id: &EntryId) -> PathBuf {
        self.root.join(format!("{}.{}", id, Self::EXTENSION))
    }

    fn temp_path(&self, id: &EntryId) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        self.root.join(format!(
            "{}{}.{}.{}",
            Self::TEMP_PREFIX,
            id,
            std::process::id(),
            nanos
        ))
    }

    /// Regular files directly under the root. Entries that cannot be
    /// inspected are skipped.
    fn files(&self) -> StoreResult<Vec<PathBuf>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %self.root.display(), error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };
            match entry.file_type() {
                Ok(file_type) if file_type.is_file() => files.push(entry.path()),
                Ok(_) => {}
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Skipping entry with unknown type");
                }
            }
        }
        Ok(files)
    }

    fn not_found(id: &EntryId, e: io::Error) -> StoreError {
        if e.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound(id.clone())
        } else {
            StoreError::Io(e)
        }
    }
}

impl EntryStore for FileEntryStore {
    fn read(&self, id: &EntryId) -> StoreResult<Vec<u8>> {
        fs::read(self.entry_path(id)).map_err(|e| Self::not_found(id, e))
    }

    fn write(&self, id: &EntryId, bytes: &[u8]) -> StoreResult<()> {
        // The directory may have been removed out from under us.
        fs::create_dir_all(&self.root)?;

        let temp_path = self.temp_path(id);
        if let Err(e) = fs::write(&temp_path, bytes) {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::Io(e));
        }

        if let Err(e) = fs::rename(&temp_path, self.entry_path(id)) {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::Io(e));
        }

        Ok(())
    }

    fn delete(&self, id: &EntryId) -> StoreResult<bool> {
        match fs::remove_file(self.entry_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn list_ids(&self) -> StoreResult<Vec<EntryId>> {
        let ids = self
            .files()?
            .iter()
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(Self::EXTENSION))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()))
            .filter_map(EntryId::parse)
            .collect();

        Ok(ids)
    }

    fn size_of(&self, id: &EntryId) -> StoreResult<u64> {
        fs::metadata(self.entry_path(id))
            .map(|m| m.len())
            .map_err(|e| Self::not_found(id, e))
    }

    fn cleanup_orphaned_temps(&self) -> StoreResult<usize> {
        let mut cleaned = 0;

        for path in self.files()? {
            let is_temp = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.starts_with(Self::TEMP_PREFIX));
            if !is_temp {
                continue;
            }

            let age = fs::metadata(&path)
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| modified.elapsed().ok());
            if age.is_some_and(|age| age > self.orphan_threshold) && fs::remove_file(&path).is_ok() {
                debug!(path = %path.display(), "Removed orphaned temp file");
                cleaned += 1;
            }
        }

        Ok(cleaned)
    }

    fn remove_foreign_records(&self) -> StoreResult<usize> {
        let mut removed = 0;

        for path in self.files()? {
            if path.extension().and_then(|e| e.to_str()) != Some(Self::EXTENSION) {
                continue;
            }
            let is_entry = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(EntryId::parse)
                .is_some();
            if !is_entry && fs::remove_file(&path).is_ok() {
                debug!(path = %path.display(), "Removed foreign record");
                removed += 1;
            }
        }

        Ok(removed)
    }
}
