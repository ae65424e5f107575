//! Push planning and project statistics.
//!
//! The planner is pure bookkeeping: given what the scanner found and what
//! the cache remembers, decide per file whether a push must create, update,
//! or skip, and identify orphaned cache entries. It never touches the
//! network.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::scan::SourceFile;
use crate::sync::cache::{SyncCache, SyncRecord, cache_key};
use crate::sync::hash;

/// What a push should do for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// No cache entry: create a new remote document.
    Create,
    /// Cache entry with a differing hash (or `force`): replace content.
    Update,
    /// Cache entry with an equal hash: nothing to do.
    Skip,
}

/// Decide the action for one file from its cache record and current hash.
#[must_use]
pub fn plan_action(recorded: Option<&SyncRecord>, current_hash: &str, force: bool) -> SyncAction {
    match recorded {
        None => SyncAction::Create,
        Some(rec) if force || hash::has_changed(current_hash, Some(&rec.content_hash)) => {
            SyncAction::Update
        }
        Some(_) => SyncAction::Skip,
    }
}

/// Cache keys with no matching scanned file, in key order.
///
/// Orphans are reported to the user; only `clean --yes` removes them.
#[must_use]
pub fn find_orphans(cache: &SyncCache, files: &[SourceFile], project_root: &Path) -> Vec<String> {
    let present: BTreeSet<String> = files
        .iter()
        .map(|f| cache_key(project_root, &f.abs_path))
        .collect();

    cache
        .entries()
        .filter(|(key, _)| !present.contains(*key))
        .map(|(key, _)| key.clone())
        .collect()
}

/// Totals for one language.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LanguageStats {
    pub files: usize,
    pub synced: usize,
    pub bytes: u64,
}

/// Project-wide sync state summary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectStats {
    pub total_files: usize,
    /// Files whose cache record matches their current content.
    pub synced: usize,
    pub total_bytes: u64,
    pub by_language: BTreeMap<String, LanguageStats>,
    pub orphans: Vec<String>,
    pub cached_entries: usize,
}

impl ProjectStats {
    #[must_use]
    pub fn unsynced(&self) -> usize {
        self.total_files - self.synced
    }
}

/// Compute project statistics by fingerprinting each scanned file.
///
/// Unreadable files count as unsynced rather than failing the whole report.
///
/// # Errors
///
/// Currently infallible in practice; kept fallible to match the other
/// planner entry points.
pub fn project_stats(
    project_root: &Path,
    files: &[SourceFile],
    cache: &SyncCache,
) -> Result<ProjectStats> {
    let mut stats = ProjectStats {
        total_files: files.len(),
        cached_entries: cache.len(),
        orphans: find_orphans(cache, files, project_root),
        ..ProjectStats::default()
    };

    for file in files {
        let lang = stats.by_language.entry(file.language.clone()).or_default();
        lang.files += 1;

        let bytes = match fs::read(&file.abs_path) {
            Ok(b) => b,
            Err(e) => {
                debug!(path = %file.abs_path.display(), error = %e, "unreadable during stats");
                continue;
            }
        };
        let (current_hash, size) = hash::fingerprint(&bytes);
        lang.bytes += size;
        stats.total_bytes += size;

        let key = cache_key(project_root, &file.abs_path);
        let up_to_date = cache
            .get(&key)
            .is_some_and(|rec| !hash::has_changed(&current_hash, Some(&rec.content_hash)));
        if up_to_date {
            lang.synced += 1;
            stats.synced += 1;
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{ScanFilter, scan_source_files};
    use tempfile::TempDir;

    fn record(hash: &str) -> SyncRecord {
        SyncRecord {
            doc_id: "D1".to_string(),
            content_hash: hash.to_string(),
            size_bytes: 1,
            last_sync: String::new(),
            language: "python".to_string(),
        }
    }

    #[test]
    fn test_plan_action_table() {
        assert_eq!(plan_action(None, "H1", false), SyncAction::Create);
        assert_eq!(plan_action(Some(&record("H1")), "H1", false), SyncAction::Skip);
        assert_eq!(plan_action(Some(&record("H1")), "H2", false), SyncAction::Update);
        // force promotes a would-be skip, but never a create
        assert_eq!(plan_action(Some(&record("H1")), "H1", true), SyncAction::Update);
        assert_eq!(plan_action(None, "H1", true), SyncAction::Create);
    }

    #[test]
    fn test_find_orphans() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("kept.py"), "x").unwrap();

        let mut cache = SyncCache::default();
        cache.put("kept.py", record("H1"));
        cache.put("deleted.py", record("H2"));
        cache.put("also/gone.rs", record("H3"));

        let files = scan_source_files(tmp.path(), &ScanFilter::all_supported()).unwrap();
        let orphans = find_orphans(&cache, &files, tmp.path());
        assert_eq!(orphans, vec!["also/gone.rs".to_string(), "deleted.py".to_string()]);
    }

    #[test]
    fn test_project_stats_counts_synced_by_current_hash() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("fresh.py"), "print('hi')\n").unwrap();
        std::fs::write(tmp.path().join("stale.py"), "print('new body')\n").unwrap();
        std::fs::write(tmp.path().join("lib.rs"), "fn f() {}\n").unwrap();

        let (fresh_hash, _) = hash::fingerprint(b"print('hi')\n");
        let mut cache = SyncCache::default();
        cache.put("fresh.py", record(&fresh_hash));
        cache.put("stale.py", record("old-hash"));

        let files = scan_source_files(tmp.path(), &ScanFilter::all_supported()).unwrap();
        let stats = project_stats(tmp.path(), &files, &cache).unwrap();

        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.synced, 1);
        assert_eq!(stats.unsynced(), 2);
        assert_eq!(stats.by_language["python"].files, 2);
        assert_eq!(stats.by_language["python"].synced, 1);
        assert_eq!(stats.by_language["rust"].files, 1);
        assert!(stats.total_bytes > 0);
        assert!(stats.orphans.is_empty());
    }
}
