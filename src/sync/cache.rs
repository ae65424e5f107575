//! Persistent sync cache.
//!
//! The cache is one versioned JSON document per project at
//! `<project>/.pagesync/cache.json`, mapping normalized relative paths to
//! [`SyncRecord`]s. It is the only local state the tool keeps.
//!
//! Two rules keep it trustworthy:
//! - Keys are always normalized (forward slashes, relative to the project
//!   root) before lookup or insert, so the same file never appears under two
//!   separator renderings.
//! - Saves are atomic (temp file, fsync, rename), so a crash mid-write
//!   leaves the previous cache intact.
//!
//! A missing cache file is an empty cache. A corrupt one is logged loudly
//! and treated as empty: the remote store remains the durable copy of
//! previously pushed content, and the worst outcome is a redundant push.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Cache schema version. Bumped only for incompatible layout changes;
/// additive fields rely on serde defaults instead.
pub const CACHE_VERSION: u32 = 1;

const CACHE_DIR: &str = ".pagesync";
const CACHE_FILE: &str = "cache.json";

/// Sync state for one tracked local file.
///
/// Unknown fields are ignored on read and optional fields default, so older
/// binaries can read caches written by newer ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncRecord {
    /// Opaque remote document ID.
    pub doc_id: String,
    /// Hex SHA-256 of the file bytes at last successful push.
    pub content_hash: String,
    /// File size in bytes at last successful push.
    #[serde(default)]
    pub size_bytes: u64,
    /// RFC3339 timestamp of the last successful push.
    #[serde(default)]
    pub last_sync: String,
    /// Syntax tag recorded for the file. Informational only.
    #[serde(default)]
    pub language: String,
}

/// The full path → record mapping for one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncCache {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Keyed by normalized path. `BTreeMap` keeps the persisted file diffable.
    #[serde(default)]
    entries: BTreeMap<String, SyncRecord>,
}

fn default_version() -> u32 {
    CACHE_VERSION
}

impl Default for SyncCache {
    fn default() -> Self {
        Self { version: CACHE_VERSION, entries: BTreeMap::new() }
    }
}

impl SyncCache {
    /// Location of the cache file for a project.
    #[must_use]
    pub fn path_for(project_root: &Path) -> PathBuf {
        project_root.join(CACHE_DIR).join(CACHE_FILE)
    }

    /// Load the cache for a project.
    ///
    /// Absent file ⇒ empty cache. Unreadable or malformed file ⇒ loud
    /// warning and empty cache; previously synced files will be re-pushed,
    /// which is safe.
    #[must_use]
    pub fn load(project_root: &Path) -> Self {
        let path = Self::path_for(project_root);
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Self>(&content) {
                Ok(cache) => cache,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "sync cache is corrupt; starting from an empty cache \
                         (previously synced files will be re-pushed)"
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read sync cache; starting empty");
                Self::default()
            }
        }
    }

    /// Persist the cache atomically.
    ///
    /// Writes to a temp file in the same directory, fsyncs, then renames
    /// over the target, so a crash cannot truncate an existing cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory cannot be created or any
    /// file operation fails.
    pub fn save(&self, project_root: &Path) -> Result<()> {
        let path = Self::path_for(project_root);
        let dir = path.parent().ok_or_else(|| Error::Cache("cache path has no parent".into()))?;
        fs::create_dir_all(dir)?;

        let temp_path = path.with_extension("json.tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    /// Look up a record by path (normalized before lookup).
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&SyncRecord> {
        self.entries.get(&normalize_key(path))
    }

    /// Insert or replace a record (key normalized before insert).
    pub fn put(&mut self, path: &str, record: SyncRecord) {
        self.entries.insert(normalize_key(path), record);
    }

    /// Remove a record; returns it if present.
    pub fn remove(&mut self, path: &str) -> Option<SyncRecord> {
        self.entries.remove(&normalize_key(path))
    }

    /// All `(normalized path, record)` pairs in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &SyncRecord)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Canonicalize a path string into cache-key form.
///
/// Backslashes become forward slashes and a leading `./` is dropped, so the
/// same file discovered under different separator conventions maps to one
/// key. This is the fix for the historical duplicate-document defect.
#[must_use]
pub fn normalize_key(path: &str) -> String {
    let slashed = path.replace('\\', "/");
    slashed.strip_prefix("./").unwrap_or(&slashed).to_string()
}

/// Compute the cache key for a discovered file.
///
/// The key is the normalized project-relative path. When the file cannot be
/// relativized (outside the project root), the canonical absolute path is
/// used instead — consistently, so the same file maps to the same key across
/// runs. Absolute keys are a known weak point: moving the project orphans
/// them.
#[must_use]
pub fn cache_key(project_root: &Path, abs_path: &Path) -> String {
    if let Ok(rel) = abs_path.strip_prefix(project_root) {
        return normalize_key(&rel.to_string_lossy());
    }
    let canonical = abs_path
        .canonicalize()
        .unwrap_or_else(|_| abs_path.to_path_buf());
    normalize_key(&canonical.to_string_lossy())
}
