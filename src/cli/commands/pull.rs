//! Pull command implementation.

use std::path::Path;

use colored::Colorize;

use crate::cli::commands::resolve_project_root;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::remote::HttpStore;
use crate::sync::cache::SyncCache;
use crate::sync::pull::{PullEngine, PullReport};

/// Execute the pull command.
pub fn execute(
    path: Option<&Path>,
    out: &Path,
    overwrite: bool,
    language: Option<&str>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let root = resolve_project_root(path)?;
    let settings = Settings::load(&root)?;
    let cache = SyncCache::load(&root);

    if cache.is_empty() {
        return Err(Error::Config(format!(
            "no sync cache found in {}; run `pagesync push` first",
            root.display()
        )));
    }

    let store = HttpStore::new(settings.token);
    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(async {
        let engine = PullEngine::new(&store);
        engine.run(&cache, out, overwrite, language).await
    })?;

    if json {
        let output = serde_json::json!({
            "success": report.failures.is_empty(),
            "project": root.display().to_string(),
            "out_dir": out.display().to_string(),
            "report": report,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else if !quiet {
        print_report(out, &report);
    }

    if report.failures.is_empty() {
        Ok(())
    } else {
        Err(Error::PartialFailure {
            failed: report.failures.len(),
            total: report.written + report.skipped() + report.failures.len(),
        })
    }
}

fn print_report(out: &Path, report: &PullReport) {
    println!("Pull complete into: {}", out.display());
    println!();
    println!("  Written: {}", report.written.to_string().green());

    if !report.skipped_existing.is_empty() {
        println!(
            "  Skipped (already exist, use --overwrite): {}",
            report.skipped_existing.len()
        );
        for path in &report.skipped_existing {
            println!("    {path}");
        }
    }
    if !report.skipped_unrooted.is_empty() {
        println!("  Skipped (not project-relative): {}", report.skipped_unrooted.len());
        for path in &report.skipped_unrooted {
            println!("    {path}");
        }
    }
    if !report.failures.is_empty() {
        println!();
        println!("  {}", format!("Failed: {}", report.failures.len()).red());
        for failure in &report.failures {
            println!("    {}: {}", failure.path, failure.error);
        }
    }
}
