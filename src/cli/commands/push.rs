//! Push command implementation.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;

use crate::cli::commands::resolve_project_root;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::remote::HttpStore;
use crate::scan::{self, ScanFilter};
use crate::sync::cache::SyncCache;
use crate::sync::push::{PushEngine, PushReport};

/// Execute the push command.
pub fn execute(
    path: Option<&Path>,
    force: bool,
    ext: &[String],
    language: Option<&str>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let root = resolve_project_root(path)?;
    let settings = Settings::load(&root)?;

    let filter = match (language, ext.is_empty()) {
        (Some(lang), _) => ScanFilter::language(lang)?,
        (None, false) => ScanFilter::extensions(ext),
        (None, true) => ScanFilter::all_supported(),
    };
    let files = scan::scan_source_files(&root, &filter)?;
    let mut cache = SyncCache::load(&root);

    let store = HttpStore::new(settings.token.clone());
    let cancel = Arc::new(AtomicBool::new(false));

    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(async {
        let watcher = {
            let cancel = Arc::clone(&cancel);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.store(true, Ordering::SeqCst);
                }
            })
        };

        let engine = PushEngine::new(&store, &settings, &cancel);
        let result = engine.run(&root, &files, &mut cache, force).await;
        watcher.abort();
        result
    })?;

    if json {
        let output = serde_json::json!({
            "success": report.failures.is_empty(),
            "project": root.display().to_string(),
            "report": report,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else if !quiet {
        print_report(&root, files.len(), &report);
    }

    if report.failures.is_empty() {
        Ok(())
    } else {
        Err(Error::PartialFailure { failed: report.failures.len(), total: files.len() })
    }
}

fn print_report(root: &Path, total: usize, report: &PushReport) {
    if report.cancelled {
        println!("{}", "Push cancelled; progress so far is saved.".yellow());
    }
    println!("Push complete for: {} ({total} files)", root.display());
    println!();
    println!("  Created: {}", report.created.to_string().green());
    if report.reconciled > 0 {
        println!(
            "  Updated: {} ({} rebuilt after remote archive/delete)",
            report.updated.to_string().green(),
            report.reconciled
        );
    } else {
        println!("  Updated: {}", report.updated.to_string().green());
    }
    println!("  Skipped: {} (unchanged)", report.skipped);

    if !report.pushed_by_language.is_empty() {
        let langs: Vec<String> = report
            .pushed_by_language
            .iter()
            .map(|(lang, n)| format!("{lang} {n}"))
            .collect();
        println!("  Pushed by language: {}", langs.join(", "));
    }

    if !report.failures.is_empty() {
        println!();
        println!("  {}", format!("Failed: {}", report.failures.len()).red());
        for failure in &report.failures {
            println!("    {}: {}", failure.path, failure.error);
        }
    }
}
