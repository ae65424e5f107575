//! Clean command implementation.
//!
//! Lists cache entries whose local file no longer exists. Entries are only
//! removed when `--yes` is passed; without it this is a dry listing.
//!
//! With `--archive-duplicates` the remote workspace is also swept for
//! documents that duplicate the same file (same title and recorded path);
//! strays are listed, and archived when `--yes` is passed. Plain clean
//! stays fully offline.

use std::path::Path;

use colored::Colorize;

use crate::cli::commands::resolve_project_root;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::remote::HttpStore;
use crate::scan::{self, ScanFilter};
use crate::sync::cache::SyncCache;
use crate::sync::dedupe::{SweepEngine, SweepReport};
use crate::sync::planner;

/// Execute the clean command.
pub fn execute(
    path: Option<&Path>,
    archive_duplicates: bool,
    yes: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let root = resolve_project_root(path)?;
    let files = scan::scan_source_files(&root, &ScanFilter::all_supported())?;
    let mut cache = SyncCache::load(&root);

    let orphans = planner::find_orphans(&cache, &files, &root);
    let removed = if yes && !orphans.is_empty() {
        for key in &orphans {
            cache.remove(key);
        }
        cache.save(&root)?;
        orphans.len()
    } else {
        0
    };

    let sweep = if archive_duplicates {
        Some(sweep_remote(&root, &cache, yes)?)
    } else {
        None
    };

    if json {
        let output = serde_json::json!({
            "project": root.display().to_string(),
            "orphans": orphans,
            "removed": removed,
            "duplicates": sweep,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else if !quiet {
        print_orphans(&root, &orphans, removed, yes);
        if let Some(report) = &sweep {
            print_sweep(report, yes);
        }
    }

    match sweep {
        Some(report) if !report.failures.is_empty() => Err(Error::PartialFailure {
            failed: report.failures.len(),
            total: report.duplicates(),
        }),
        _ => Ok(()),
    }
}

fn sweep_remote(root: &Path, cache: &SyncCache, archive: bool) -> Result<SweepReport> {
    let settings = Settings::load(root)?;
    let store = HttpStore::new(settings.token.clone());
    let engine = SweepEngine::new(&store);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(engine.run(&settings.parent_page, cache, archive))
}

fn print_orphans(root: &Path, orphans: &[String], removed: usize, yes: bool) {
    if orphans.is_empty() {
        println!("No orphaned cache entries in: {}", root.display());
        return;
    }
    println!("Orphaned cache entries in: {}", root.display());
    for path in orphans {
        println!("  {path}");
    }
    println!();
    if yes {
        println!("{}", format!("Removed {removed} entries.").green());
    } else {
        println!("Dry run; pass --yes to remove these entries.");
    }
}

fn print_sweep(report: &SweepReport, yes: bool) {
    println!();
    if report.groups.is_empty() {
        println!("No duplicate documents in the remote workspace.");
        return;
    }
    println!("Duplicate documents:");
    for group in &report.groups {
        println!(
            "  {} ({}): keeping {}, {} stray",
            group.title,
            group.path,
            group.keep,
            group.archive.len()
        );
    }
    println!();
    if yes {
        println!("{}", format!("Archived {} documents.", report.archived).green());
        if !report.failures.is_empty() {
            println!("  {}", format!("Failed: {}", report.failures.len()).red());
            for failure in &report.failures {
                println!("    {}: {}", failure.path, failure.error);
            }
        }
    } else {
        println!("Dry run; pass --yes to archive the strays.");
    }
}
