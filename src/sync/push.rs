//! Push engine: local files → remote documents.
//!
//! Files are processed sequentially. Each file is independent: a failure is
//! recorded in the run report and the run moves on. The cache is only ever
//! written after the corresponding remote write succeeded, and is saved to
//! disk after every successful per-file write, so a crash at any point costs
//! at worst one redundant push next run — never a lost mapping.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::Result;
use crate::remote::{DocumentStore, UpdateOutcome};
use crate::scan::SourceFile;
use crate::sync::cache::{SyncCache, SyncRecord, cache_key};
use crate::sync::compose;
use crate::sync::hash;
use crate::sync::planner::{self, SyncAction};

/// One file the push could not sync.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub error: String,
}

/// Outcome summary of a push run.
#[derive(Debug, Default, Serialize)]
pub struct PushReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    /// Updates that found their document archived or missing and rebuilt it.
    pub reconciled: usize,
    /// True when ctrl-c stopped the run before all files were processed.
    pub cancelled: bool,
    pub failures: Vec<FileFailure>,
    /// Documents pushed (created or updated) per language.
    pub pushed_by_language: BTreeMap<String, usize>,
}

impl PushReport {
    #[must_use]
    pub fn pushed(&self) -> usize {
        self.created + self.updated
    }

    #[must_use]
    pub fn processed(&self) -> usize {
        self.pushed() + self.skipped + self.failures.len()
    }
}

/// Sequential push over a [`DocumentStore`].
pub struct PushEngine<'a, D: DocumentStore> {
    store: &'a D,
    settings: &'a Settings,
    cancel: &'a AtomicBool,
}

impl<'a, D: DocumentStore> PushEngine<'a, D> {
    pub fn new(store: &'a D, settings: &'a Settings, cancel: &'a AtomicBool) -> Self {
        Self { store, settings, cancel }
    }

    /// Push every scanned file, updating `cache` as remote writes succeed.
    ///
    /// Cancellation stops new files from starting; the in-flight file always
    /// completes its cache write.
    ///
    /// # Errors
    ///
    /// Returns an error only when the cache cannot be persisted. Per-file
    /// problems land in the report instead.
    pub async fn run(
        &self,
        project_root: &Path,
        files: &[SourceFile],
        cache: &mut SyncCache,
        force: bool,
    ) -> Result<PushReport> {
        let mut report = PushReport::default();

        for file in files {
            if self.cancel.load(Ordering::SeqCst) {
                info!("cancellation requested, stopping before next file");
                report.cancelled = true;
                break;
            }

            let key = cache_key(project_root, &file.abs_path);
            match self.push_file(file, &key, cache, force).await {
                Ok(FileOutcome::Created) => {
                    report.created += 1;
                    *report.pushed_by_language.entry(file.language.clone()).or_default() += 1;
                    cache.save(project_root)?;
                }
                Ok(FileOutcome::Updated { reconciled }) => {
                    report.updated += 1;
                    report.reconciled += usize::from(reconciled);
                    *report.pushed_by_language.entry(file.language.clone()).or_default() += 1;
                    cache.save(project_root)?;
                }
                Ok(FileOutcome::Skipped) => report.skipped += 1,
                Err(error) => {
                    warn!(path = %key, error = %error, "file failed to sync");
                    report.failures.push(FileFailure { path: key, error });
                }
            }
        }

        cache.save(project_root)?;
        Ok(report)
    }

    async fn push_file(
        &self,
        file: &SourceFile,
        key: &str,
        cache: &mut SyncCache,
        force: bool,
    ) -> std::result::Result<FileOutcome, String> {
        let bytes = fs::read(&file.abs_path).map_err(|e| format!("read failed: {e}"))?;
        let content =
            String::from_utf8(bytes).map_err(|e| format!("not valid UTF-8: {e}"))?;
        let (current_hash, size) = hash::fingerprint(content.as_bytes());

        let action = planner::plan_action(cache.get(key), &current_hash, force);
        debug!(path = %key, ?action, "planned");
        if action == SyncAction::Skip {
            return Ok(FileOutcome::Skipped);
        }

        let file_name = file
            .abs_path
            .file_name()
            .map_or_else(|| key.to_string(), |n| n.to_string_lossy().into_owned());
        let blocks = compose::compose_blocks(
            key,
            &file_name,
            &file.language,
            &content,
            self.settings.max_chunk_chars,
        );

        let record = |doc_id: String| SyncRecord {
            doc_id,
            content_hash: current_hash.clone(),
            size_bytes: size,
            last_sync: Utc::now().to_rfc3339(),
            language: file.language.clone(),
        };

        match action {
            SyncAction::Create => {
                let doc_id = self
                    .store
                    .create_document(&self.settings.parent_page, &file_name, &blocks)
                    .await
                    .map_err(|e| e.to_string())?;
                info!(path = %key, doc = %doc_id, "created");
                cache.put(key, record(doc_id));
                Ok(FileOutcome::Created)
            }
            SyncAction::Update => {
                // Update is only planned when a cache entry exists.
                let doc_id = cache.get(key).map(|r| r.doc_id.clone()).unwrap_or_default();
                match self
                    .store
                    .update_content(&doc_id, &blocks)
                    .await
                    .map_err(|e| e.to_string())?
                {
                    UpdateOutcome::Updated => {
                        info!(path = %key, doc = %doc_id, "updated");
                        cache.put(key, record(doc_id));
                        Ok(FileOutcome::Updated { reconciled: false })
                    }
                    outcome @ (UpdateOutcome::Archived | UpdateOutcome::NotFound) => {
                        info!(path = %key, doc = %doc_id, ?outcome, "stale document, reconciling");
                        let new_id = self
                            .reconcile(&doc_id, &file_name, &blocks, outcome)
                            .await?;
                        cache.put(key, record(new_id));
                        Ok(FileOutcome::Updated { reconciled: true })
                    }
                }
            }
            SyncAction::Skip => unreachable!("skip handled above"),
        }
    }

    /// Replace a stale document: best-effort archive, then create anew.
    ///
    /// The archive step may fail (the document can be locked or already
    /// gone); that is logged and ignored, since the replacement create is
    /// what restores a working mapping. A transient duplicate between the
    /// two calls is acceptable.
    async fn reconcile(
        &self,
        stale_doc: &str,
        file_name: &str,
        blocks: &[crate::remote::ContentBlock],
        outcome: UpdateOutcome,
    ) -> std::result::Result<String, String> {
        if outcome == UpdateOutcome::Archived {
            if let Err(e) = self.store.archive_document(&stale_doc.to_string()).await {
                warn!(doc = %stale_doc, error = %e, "could not archive stale document");
            }
        }

        self.store
            .create_document(&self.settings.parent_page, file_name, blocks)
            .await
            .map_err(|e| format!("reconciliation create failed: {e}"))
    }
}

enum FileOutcome {
    Created,
    Updated { reconciled: bool },
    Skipped,
}
