//! Pull engine: remote documents → local files.
//!
//! Pull walks the cache (optionally filtered by language), fetches each
//! document's blocks, reassembles the code content, and writes it under the
//! output directory at the entry's relative path. Existing files are left
//! alone unless overwrite is requested; that is a reported skip, never an
//! error. Cache entries keyed by absolute path cannot be rooted safely
//! under the output directory and are skipped with a report.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::remote::DocumentStore;
use crate::sync::cache::SyncCache;
use crate::sync::compose;
use crate::sync::push::FileFailure;

/// Outcome summary of a pull run.
#[derive(Debug, Default, Serialize)]
pub struct PullReport {
    pub written: usize,
    /// Destinations that already existed with overwrite off.
    pub skipped_existing: Vec<String>,
    /// Entries whose key is not a safe relative path.
    pub skipped_unrooted: Vec<String>,
    pub failures: Vec<FileFailure>,
    pub written_by_language: BTreeMap<String, usize>,
}

impl PullReport {
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped_existing.len() + self.skipped_unrooted.len()
    }
}

/// Sequential pull over a [`DocumentStore`].
pub struct PullEngine<'a, D: DocumentStore> {
    store: &'a D,
}

impl<'a, D: DocumentStore> PullEngine<'a, D> {
    pub fn new(store: &'a D) -> Self {
        Self { store }
    }

    /// Pull every cache entry (optionally one language) into `out_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the output root cannot be created.
    /// Per-entry problems land in the report.
    pub async fn run(
        &self,
        cache: &SyncCache,
        out_dir: &Path,
        overwrite: bool,
        language: Option<&str>,
    ) -> Result<PullReport> {
        fs::create_dir_all(out_dir)?;
        let mut report = PullReport::default();

        for (key, record) in cache.entries() {
            if let Some(lang) = language {
                if !record.language.eq_ignore_ascii_case(lang) {
                    continue;
                }
            }

            let Some(rel) = rooted_rel_path(key) else {
                warn!(path = %key, "entry is not a relative path, skipping");
                report.skipped_unrooted.push(key.clone());
                continue;
            };
            let dest = out_dir.join(&rel);

            if dest.exists() && !overwrite {
                info!(path = %key, "destination exists, skipping (use --overwrite)");
                report.skipped_existing.push(key.clone());
                continue;
            }

            match self.pull_entry(&record.doc_id, &dest).await {
                Ok(()) => {
                    info!(path = %key, dest = %dest.display(), "pulled");
                    report.written += 1;
                    *report
                        .written_by_language
                        .entry(record.language.clone())
                        .or_default() += 1;
                }
                Err(error) => {
                    warn!(path = %key, error = %error, "pull failed");
                    report.failures.push(FileFailure { path: key.clone(), error });
                }
            }
        }

        Ok(report)
    }

    async fn pull_entry(&self, doc_id: &str, dest: &Path) -> std::result::Result<(), String> {
        let blocks = self
            .store
            .fetch_content(&doc_id.to_string())
            .await
            .map_err(|e| e.to_string())?;
        let content = compose::extract_content(&blocks);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("mkdir failed: {e}"))?;
        }
        fs::write(dest, content).map_err(|e| format!("write failed: {e}"))
    }
}

/// Interpret a cache key as a path safe to root under the output directory.
///
/// Rejects absolute keys and any traversal components.
fn rooted_rel_path(key: &str) -> Option<PathBuf> {
    let path = PathBuf::from(key);
    let safe = !path.is_absolute()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    safe.then_some(path)
}
