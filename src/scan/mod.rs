//! Source file discovery.
//!
//! Walks a project directory collecting files with a recognized (or
//! explicitly requested) extension, skipping dependency/build/VCS
//! directories. Discovery is a collaborator of the sync engines: they only
//! consume the resulting list.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config;
use crate::error::{Error, Result};

/// Directory and file-name patterns never worth syncing.
const IGNORE_DIRS: &[&str] = &[
    // Version control
    ".git", ".svn", ".hg",
    // Dependencies
    "node_modules", "__pycache__", ".venv", "venv", "env",
    // Build outputs
    "build", "dist", "target", "bin", "obj",
    // IDE
    ".vscode", ".idea",
];

const IGNORE_SUFFIXES: &[&str] = &[".tmp", ".temp", ".log", ".min.js", ".min.css"];

const IGNORE_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

/// One discovered source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path on disk.
    pub abs_path: PathBuf,
    /// Path relative to the project root (platform separators).
    pub rel_path: PathBuf,
    /// Syntax tag derived from the extension.
    pub language: String,
}

/// Which files a scan should include.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    extensions: Option<Vec<String>>,
}

impl ScanFilter {
    /// Include every supported extension.
    #[must_use]
    pub fn all_supported() -> Self {
        Self::default()
    }

    /// Include only the given extensions (leading dots optional).
    #[must_use]
    pub fn extensions(exts: &[String]) -> Self {
        let cleaned = exts
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        Self { extensions: Some(cleaned) }
    }

    /// Include only extensions of one language.
    ///
    /// # Errors
    ///
    /// Returns a config error for a language with no known extensions.
    pub fn language(language: &str) -> Result<Self> {
        let exts = config::extensions_for_language(language);
        if exts.is_empty() {
            return Err(Error::Config(format!(
                "unsupported language '{language}'; see `pagesync stats` for known ones"
            )));
        }
        Ok(Self { extensions: Some(exts.iter().map(|e| (*e).to_string()).collect()) })
    }

    fn matches(&self, extension: &str) -> bool {
        match &self.extensions {
            Some(exts) => exts.iter().any(|e| e == extension),
            None => config::supported_extensions().contains(&extension),
        }
    }
}

/// Whether a directory entry should be descended into / collected.
fn is_ignored(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    IGNORE_DIRS.iter().any(|d| lower == *d)
        || IGNORE_FILES.iter().any(|f| lower == f.to_ascii_lowercase())
        || IGNORE_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

/// Scan `project_root` for matching source files, sorted by relative path.
///
/// Unreadable subtrees are skipped with a log line rather than failing the
/// scan; a missing root is an error.
///
/// # Errors
///
/// Returns [`Error::PathNotFound`] when the root does not exist.
pub fn scan_source_files(project_root: &Path, filter: &ScanFilter) -> Result<Vec<SourceFile>> {
    if !project_root.exists() {
        return Err(Error::PathNotFound { path: project_root.display().to_string() });
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(project_root).follow_links(false).into_iter();

    for entry in walker.filter_entry(|e| {
        e.depth() == 0 || e.file_name().to_str().is_none_or(|n| !is_ignored(n))
    }) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if !filter.matches(&ext) {
            continue;
        }

        let abs_path = entry.path().to_path_buf();
        let rel_path = abs_path
            .strip_prefix(project_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| abs_path.clone());

        files.push(SourceFile {
            abs_path,
            rel_path,
            language: config::language_for_extension(&ext).to_string(),
        });
    }

    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(files)
}
