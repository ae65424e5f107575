//! Remote duplicate sweep.
//!
//! The push engine tolerates a narrow window in which a crash between a
//! remote create and the cache write leaves an active document the cache
//! never learned about; the next push then creates a second document for
//! the same file. This sweep finds those strays and archives them.
//!
//! Duplicates are path-aware: two documents count as duplicates only when
//! they share both the title and the path recorded in their metadata
//! paragraph. `src/utils.py` and `tests/utils.py` produce documents with
//! the same title but different paths and are never touched. Within a
//! group, the document the cache is bound to is kept; the rest are
//! archived.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::remote::{DocId, DocumentStore};
use crate::sync::cache::SyncCache;
use crate::sync::compose;
use crate::sync::push::FileFailure;

/// Active documents sharing one (title, path) identity.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    pub title: String,
    pub path: String,
    /// The document to keep (cache-bound when possible).
    pub keep: DocId,
    /// The stray documents to archive.
    pub archive: Vec<DocId>,
}

/// Outcome summary of a sweep run.
#[derive(Debug, Default, Serialize)]
pub struct SweepReport {
    pub groups: Vec<DuplicateGroup>,
    /// Documents archived (zero on a dry run).
    pub archived: usize,
    pub failures: Vec<FileFailure>,
}

impl SweepReport {
    /// Stray documents across all groups.
    #[must_use]
    pub fn duplicates(&self) -> usize {
        self.groups.iter().map(|g| g.archive.len()).sum()
    }
}

/// Path-aware duplicate sweep over a [`DocumentStore`].
pub struct SweepEngine<'a, D: DocumentStore> {
    store: &'a D,
}

impl<'a, D: DocumentStore> SweepEngine<'a, D> {
    pub fn new(store: &'a D) -> Self {
        Self { store }
    }

    /// Find duplicate groups under `parent` and, when `archive` is set,
    /// archive the strays.
    ///
    /// Documents whose path cannot be read from their content are skipped
    /// with a log line rather than guessed at. Archive failures are
    /// per-document and land in the report.
    ///
    /// # Errors
    ///
    /// Returns an error when the child listing itself fails; nothing has
    /// been modified at that point.
    pub async fn run(
        &self,
        parent: &DocId,
        cache: &SyncCache,
        archive: bool,
    ) -> Result<SweepReport> {
        let children = self.store.list_children(parent).await?;

        // (title, path) → active doc ids, in listing order
        let mut groups: BTreeMap<(String, String), Vec<DocId>> = BTreeMap::new();
        for child in children {
            let blocks = match self.store.fetch_content(&child.id).await {
                Ok(b) => b,
                Err(e) => {
                    warn!(doc = %child.id, error = %e, "cannot read document, skipping");
                    continue;
                }
            };
            let Some(path) = compose::metadata_path(&blocks) else {
                info!(doc = %child.id, title = %child.title, "no path metadata, skipping");
                continue;
            };
            groups.entry((child.title, path)).or_default().push(child.id);
        }

        let bound_ids: Vec<&String> = cache.entries().map(|(_, r)| &r.doc_id).collect();
        let mut report = SweepReport::default();

        for ((title, path), ids) in groups {
            if ids.len() < 2 {
                continue;
            }
            // Keep the cache-bound document; with no binding, keep the first
            // listed so the choice is stable across runs.
            let keep = ids
                .iter()
                .find(|id| bound_ids.contains(id))
                .unwrap_or(&ids[0])
                .clone();
            let strays: Vec<DocId> = ids.into_iter().filter(|id| *id != keep).collect();
            report.groups.push(DuplicateGroup { title, path, keep, archive: strays });
        }

        if archive {
            for group in &report.groups {
                for doc in &group.archive {
                    match self.store.archive_document(doc).await {
                        Ok(_) => {
                            info!(doc = %doc, path = %group.path, "archived duplicate");
                            report.archived += 1;
                        }
                        Err(e) => {
                            warn!(doc = %doc, error = %e, "could not archive duplicate");
                            report
                                .failures
                                .push(FileFailure { path: group.path.clone(), error: e.to_string() });
                        }
                    }
                }
            }
        }

        Ok(report)
    }
}
