//! Stats command implementation.
//!
//! Entirely local: scans the project, fingerprints files, and compares
//! against the cache. No credentials or remote calls needed.

use std::path::Path;

use colored::Colorize;

use crate::cli::commands::resolve_project_root;
use crate::error::Result;
use crate::scan::{self, ScanFilter};
use crate::sync::cache::SyncCache;
use crate::sync::planner::{self, ProjectStats};

/// Execute the stats command.
pub fn execute(path: Option<&Path>, json: bool, quiet: bool) -> Result<()> {
    let root = resolve_project_root(path)?;
    let files = scan::scan_source_files(&root, &ScanFilter::all_supported())?;
    let cache = SyncCache::load(&root);
    let stats = planner::project_stats(&root, &files, &cache)?;

    if json {
        let output = serde_json::json!({
            "project": root.display().to_string(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else if !quiet {
        print_stats(&root, &stats);
    }

    Ok(())
}

fn print_stats(root: &Path, stats: &ProjectStats) {
    println!("Sync status for: {}", root.display());
    println!();
    println!("  Source files:  {}", stats.total_files);
    println!("  Up to date:    {}", stats.synced.to_string().green());
    if stats.unsynced() > 0 {
        println!("  Needs push:    {}", stats.unsynced().to_string().yellow());
    }
    println!("  Total size:    {} bytes", stats.total_bytes);
    println!("  Cache entries: {}", stats.cached_entries);

    if !stats.by_language.is_empty() {
        println!();
        println!("  By language:");
        for (language, lang) in &stats.by_language {
            println!(
                "    {language}: {} files, {} up to date, {} bytes",
                lang.files, lang.synced, lang.bytes
            );
        }
    }

    if !stats.orphans.is_empty() {
        println!();
        println!(
            "  {}",
            format!("Orphaned cache entries (local file gone): {}", stats.orphans.len()).yellow()
        );
        for path in &stats.orphans {
            println!("    {path}");
        }
        println!("  Run `pagesync clean --yes` to remove them.");
    }
}
