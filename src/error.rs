//! Error types for the pagesync CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=config, 3=remote, 4=io, 5=cache, 6=partial);
//!   exit 1 is reserved for clap usage errors and panics
//! - Retryability flags
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use thiserror::Error;

use crate::remote::RemoteError;

/// Result type alias for pagesync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Config (exit 2)
    MissingToken,
    MissingParentPage,
    InvalidParentPage,
    ConfigError,

    // Remote (exit 3)
    RemoteAuth,
    RemotePermission,
    RemoteNotFound,
    RemoteUnavailable,

    // I/O (exit 4)
    IoError,
    JsonError,
    PathNotFound,

    // Cache (exit 5)
    CacheError,

    // Sync (exit 6)
    PartialFailure,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::MissingParentPage => "MISSING_PARENT_PAGE",
            Self::InvalidParentPage => "INVALID_PARENT_PAGE",
            Self::ConfigError => "CONFIG_ERROR",
            Self::RemoteAuth => "REMOTE_AUTH",
            Self::RemotePermission => "REMOTE_PERMISSION",
            Self::RemoteNotFound => "REMOTE_NOT_FOUND",
            Self::RemoteUnavailable => "REMOTE_UNAVAILABLE",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::PathNotFound => "PATH_NOT_FOUND",
            Self::CacheError => "CACHE_ERROR",
            Self::PartialFailure => "PARTIAL_FAILURE",
        }
    }

    /// Category-based exit code (2-6).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::MissingToken
            | Self::MissingParentPage
            | Self::InvalidParentPage
            | Self::ConfigError => 2,
            Self::RemoteAuth
            | Self::RemotePermission
            | Self::RemoteNotFound
            | Self::RemoteUnavailable => 3,
            Self::IoError | Self::JsonError | Self::PathNotFound => 4,
            Self::CacheError => 5,
            Self::PartialFailure => 6,
        }
    }

    /// Whether a caller should retry the whole invocation unchanged.
    ///
    /// True only for remote unavailability (rate limits, timeouts that
    /// survived the per-call retry budget). Config and I/O errors need
    /// corrected input first.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteUnavailable)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in pagesync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("PAGESYNC_TOKEN is not set")]
    MissingToken,

    #[error("PAGESYNC_PARENT_PAGE is not set")]
    MissingParentPage,

    #[error("parent page ID is not a valid UUID: {id}")]
    InvalidParentPage { id: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("path does not exist: {path}")]
    PathNotFound { path: String },

    #[error("cache error: {0}")]
    Cache(String),

    #[error("{failed} of {total} files failed to sync")]
    PartialFailure { failed: usize, total: usize },
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingToken => ErrorCode::MissingToken,
            Self::MissingParentPage => ErrorCode::MissingParentPage,
            Self::InvalidParentPage { .. } => ErrorCode::InvalidParentPage,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Remote(e) => match e {
                RemoteError::Auth(_) => ErrorCode::RemoteAuth,
                RemoteError::Permission(_) => ErrorCode::RemotePermission,
                RemoteError::NotFound(_) => ErrorCode::RemoteNotFound,
                _ => ErrorCode::RemoteUnavailable,
            },
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::PathNotFound { .. } => ErrorCode::PathNotFound,
            Self::Cache(_) => ErrorCode::CacheError,
            Self::PartialFailure { .. } => ErrorCode::PartialFailure,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::MissingToken => Some(
                "Set PAGESYNC_TOKEN in the environment or a .env file in the project directory"
                    .to_string(),
            ),
            Self::MissingParentPage => Some(
                "Set PAGESYNC_PARENT_PAGE to the ID of the page files should be created under"
                    .to_string(),
            ),
            Self::InvalidParentPage { id } => Some(format!(
                "Expected a UUID like xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx, got '{id}'. \
                 Copy the ID from the page URL (hyphens optional)."
            )),
            Self::Remote(RemoteError::Auth(_)) => {
                Some("Check that PAGESYNC_TOKEN is valid and has not been revoked".to_string())
            }
            Self::Remote(RemoteError::Permission(_)) => Some(
                "The integration must be shared with the parent page in the workspace".to_string(),
            ),
            Self::PathNotFound { path } => {
                Some(format!("Check that '{path}' exists and is readable"))
            }
            Self::PartialFailure { .. } => {
                Some("Re-run the command; already-synced files will be skipped".to_string())
            }
            _ => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
