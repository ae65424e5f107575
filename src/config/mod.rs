//! Configuration management.
//!
//! Settings come from the environment, with a `.env` file in the project
//! directory loaded first (values already present in the environment win).
//! Parent page IDs are accepted in any of the forms the workspace UI hands
//! out (hyphenless, prefixed) and normalized to canonical UUID form before
//! any remote call.

use std::path::Path;

use crate::error::{Error, Result};

/// Environment variable holding the integration token.
pub const TOKEN_VAR: &str = "PAGESYNC_TOKEN";
/// Environment variable holding the parent page ID.
pub const PARENT_PAGE_VAR: &str = "PAGESYNC_PARENT_PAGE";
/// Environment variable overriding the per-block chunk ceiling.
pub const MAX_CHUNK_VAR: &str = "PAGESYNC_MAX_CHUNK";

/// Default per-block content ceiling, in characters.
///
/// The remote store rejects rich-text payloads near 2000 characters; 1500
/// leaves headroom for the escaping overhead observed in practice.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 1500;

/// Resolved run configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Remote API token.
    pub token: String,
    /// Normalized parent page ID new documents are created under.
    pub parent_page: String,
    /// Per-block content ceiling for the chunker.
    pub max_chunk_chars: usize,
}

impl Settings {
    /// Load and validate settings for a project directory.
    ///
    /// A `.env` file in the project directory is merged into the environment
    /// first. Missing token or parent page, or an unparseable parent page ID,
    /// is a hard error: nothing should start without credentials.
    ///
    /// # Errors
    ///
    /// Returns a config-category error when required values are missing or
    /// the parent page ID is not a UUID after normalization.
    pub fn load(project_root: &Path) -> Result<Self> {
        // Ignore a missing or unreadable .env; the plain environment may
        // already carry everything.
        let _ = dotenvy::from_path(project_root.join(".env"));

        let token = non_empty_var(TOKEN_VAR).ok_or(Error::MissingToken)?;
        let raw_parent = non_empty_var(PARENT_PAGE_VAR).ok_or(Error::MissingParentPage)?;

        let parent_page = normalize_page_id(&raw_parent);
        if !is_valid_page_id(&parent_page) {
            return Err(Error::InvalidParentPage { id: raw_parent });
        }

        let max_chunk_chars = match non_empty_var(MAX_CHUNK_VAR) {
            Some(v) => v.parse::<usize>().map_err(|_| {
                Error::Config(format!("{MAX_CHUNK_VAR} must be a positive integer, got '{v}'"))
            })?,
            None => DEFAULT_MAX_CHUNK_CHARS,
        };
        if max_chunk_chars == 0 {
            return Err(Error::Config(format!("{MAX_CHUNK_VAR} must be at least 1")));
        }

        Ok(Self { token, parent_page, max_chunk_chars })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Normalize a page ID to canonical `8-4-4-4-12` UUID form.
///
/// Accepts the hyphenless 32-hex form from page URLs and a `Name-<hex32>`
/// prefixed form. Anything else is returned unchanged for validation to
/// reject with the original input visible.
#[must_use]
pub fn normalize_page_id(page_id: &str) -> String {
    let mut id = page_id.trim();

    // Strip a "Title-" style prefix when the remainder is a bare 32-hex ID.
    if id.len() > 36 {
        if let Some((_, rest)) = id.split_once('-') {
            if rest.len() == 32 && rest.chars().all(|c| c.is_ascii_hexdigit()) {
                id = rest;
            }
        }
    }

    let clean: String = id.chars().filter(|c| *c != '-').collect();
    if clean.len() == 32 && clean.chars().all(|c| c.is_ascii_hexdigit()) {
        format!(
            "{}-{}-{}-{}-{}",
            &clean[..8],
            &clean[8..12],
            &clean[12..16],
            &clean[16..20],
            &clean[20..]
        )
    } else {
        id.to_string()
    }
}

/// Whether a page ID is in canonical UUID form.
#[must_use]
pub fn is_valid_page_id(page_id: &str) -> bool {
    let groups: Vec<&str> = page_id.split('-').collect();
    groups.len() == 5
        && [8, 4, 4, 4, 12]
            .iter()
            .zip(&groups)
            .all(|(len, g)| g.len() == *len && g.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Extension → syntax tag table for the remote store's code blocks.
///
/// Extensions are matched case-insensitively, without the leading dot.
const LANGUAGE_TABLE: &[(&str, &str)] = &[
    ("py", "python"),
    ("cs", "c#"),
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("java", "java"),
    ("cpp", "c++"),
    ("c", "c"),
    ("php", "php"),
    ("rb", "ruby"),
    ("go", "go"),
    ("rs", "rust"),
    ("swift", "swift"),
    ("kt", "kotlin"),
    ("scala", "scala"),
    ("html", "html"),
    ("css", "css"),
    ("scss", "scss"),
    ("sass", "sass"),
    ("less", "less"),
    ("xml", "xml"),
    ("json", "json"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("sql", "sql"),
    ("sh", "shell"),
    ("bash", "bash"),
    ("ps1", "powershell"),
    ("bat", "batch"),
    ("cmd", "batch"),
    ("r", "r"),
    ("m", "matlab"),
    ("pl", "perl"),
    ("lua", "lua"),
    ("dart", "dart"),
    ("vue", "vue"),
];

/// Syntax tag for a file extension (without the dot); `"plain text"` when
/// unrecognized.
#[must_use]
pub fn language_for_extension(extension: &str) -> &'static str {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    LANGUAGE_TABLE
        .iter()
        .find(|(e, _)| *e == ext)
        .map_or("plain text", |(_, lang)| lang)
}

/// All extensions with a known syntax tag.
#[must_use]
pub fn supported_extensions() -> Vec<&'static str> {
    LANGUAGE_TABLE.iter().map(|(e, _)| *e).collect()
}

/// Extensions mapping to the given language name (case-insensitive).
#[must_use]
pub fn extensions_for_language(language: &str) -> Vec<&'static str> {
    let wanted = language.to_ascii_lowercase();
    LANGUAGE_TABLE
        .iter()
        .filter(|(_, lang)| *lang == wanted)
        .map(|(e, _)| *e)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_hyphenless_id() {
        assert_eq!(
            normalize_page_id("0123456789abcdef0123456789abcdef"),
            "01234567-89ab-cdef-0123-456789abcdef"
        );
    }

    #[test]
    fn test_normalize_prefixed_id() {
        assert_eq!(
            normalize_page_id("Projects-0123456789abcdef0123456789abcdef"),
            "01234567-89ab-cdef-0123-456789abcdef"
        );
    }

    #[test]
    fn test_normalize_canonical_id_unchanged() {
        let id = "01234567-89ab-cdef-0123-456789abcdef";
        assert_eq!(normalize_page_id(id), id);
    }

    #[test]
    fn test_invalid_id_rejected() {
        assert!(!is_valid_page_id("not-a-uuid"));
        assert!(!is_valid_page_id("01234567-89ab-cdef-0123-456789abcdeg"));
        assert!(is_valid_page_id("01234567-89ab-cdef-0123-456789abcdef"));
    }

    #[test]
    fn test_language_lookup() {
        assert_eq!(language_for_extension("py"), "python");
        assert_eq!(language_for_extension(".RS"), "rust");
        assert_eq!(language_for_extension("unknown"), "plain text");
    }

    #[test]
    fn test_extensions_for_language() {
        let mut exts = extensions_for_language("typescript");
        exts.sort_unstable();
        assert_eq!(exts, vec!["ts", "tsx"]);
        assert!(extensions_for_language("cobol").is_empty());
    }
}
