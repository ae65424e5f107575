//! Remote document store abstraction.
//!
//! The sync engines only see the narrow capability set defined by
//! [`DocumentStore`]: create a document under a parent, replace its content
//! blocks, archive it, fetch its blocks, and query its status. The concrete
//! wire protocol lives in [`http`]; tests use the deterministic in-memory
//! store in `fake`.

pub mod http;
pub mod retry;

#[cfg(test)]
pub mod fake;

pub use http::HttpStore;
pub use retry::RetryConfig;

use std::future::Future;

use thiserror::Error;

/// Opaque handle to one remote document.
pub type DocId = String;

/// One content block of a remote document.
///
/// This is the least common denominator the engines need: a heading for the
/// file title and chunk-part markers, a paragraph for file metadata, a
/// divider, and code blocks carrying the actual file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// Section heading (document title line, chunk-part markers).
    Heading(String),
    /// Plain paragraph (file metadata).
    Paragraph(String),
    /// Horizontal rule between metadata and content.
    Divider,
    /// One chunk of file content with its syntax tag.
    Code { text: String, language: String },
}

impl ContentBlock {
    /// Text carried by this block, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Heading(t) | Self::Paragraph(t) => Some(t),
            Self::Code { text, .. } => Some(text),
            Self::Divider => None,
        }
    }
}

/// Result of replacing a document's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Content replaced in place.
    Updated,
    /// The document is archived and cannot be edited.
    Archived,
    /// The document no longer exists.
    NotFound,
}

/// Result of archiving a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// Document archived by this call.
    Archived,
    /// Document was already archived; treated as success.
    AlreadyArchived,
}

/// Lifecycle status of a remote document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocStatus {
    Active,
    Archived,
    Missing,
}

/// Identity of one active child document under a parent, as returned by
/// [`DocumentStore::list_children`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocSummary {
    pub id: DocId,
    pub title: String,
}

/// Errors from the remote document store.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// Request timed out. Transient.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limited by the service. Transient.
    #[error("rate limited by remote service")]
    RateLimited {
        /// Server-suggested wait, when provided.
        retry_after_secs: Option<u64>,
    },

    /// Service-side failure (5xx). Transient.
    #[error("remote service error: {0}")]
    Service(String),

    /// Network-level failure before a response arrived. Transient.
    #[error("network error: {0}")]
    Network(String),

    /// Invalid or revoked credentials. Permanent.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Credentials lack access to the target. Permanent.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Target document or parent does not exist. Permanent.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request itself was malformed. Permanent.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl RemoteError {
    /// Whether this error class is worth retrying with backoff.
    ///
    /// Auth, permission and malformed-request failures will not improve on
    /// retry and must fail the file immediately.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::RateLimited { .. } | Self::Service(_) | Self::Network(_)
        )
    }
}

/// Result type for remote operations.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Capability set the sync engines require from a remote store.
///
/// Implemented by [`HttpStore`] and by the in-memory fake used in tests.
/// Methods return `impl Future` rather than being `async fn` so the `Send`
/// bound is explicit; engines are generic over the store, so no boxing is
/// needed.
pub trait DocumentStore: Send + Sync {
    /// Create a new document under `parent` and fill it with `blocks`.
    /// Returns the new document's ID.
    fn create_document(
        &self,
        parent: &DocId,
        title: &str,
        blocks: &[ContentBlock],
    ) -> impl Future<Output = RemoteResult<DocId>> + Send;

    /// Replace the content blocks of an existing document.
    ///
    /// Archived and missing targets are reported through [`UpdateOutcome`],
    /// not as errors; the caller decides whether to reconcile.
    fn update_content(
        &self,
        doc: &DocId,
        blocks: &[ContentBlock],
    ) -> impl Future<Output = RemoteResult<UpdateOutcome>> + Send;

    /// Archive a document. Archiving an already-archived document succeeds.
    fn archive_document(
        &self,
        doc: &DocId,
    ) -> impl Future<Output = RemoteResult<ArchiveOutcome>> + Send;

    /// Fetch the ordered content blocks of a document.
    fn fetch_content(
        &self,
        doc: &DocId,
    ) -> impl Future<Output = RemoteResult<Vec<ContentBlock>>> + Send;

    /// Query a document's lifecycle status.
    fn document_status(
        &self,
        doc: &DocId,
    ) -> impl Future<Output = RemoteResult<DocStatus>> + Send;

    /// List the active child documents directly under `parent`.
    ///
    /// Archived documents do not appear. Used by the duplicate sweep to
    /// find stray documents the cache no longer tracks.
    fn list_children(
        &self,
        parent: &DocId,
    ) -> impl Future<Output = RemoteResult<Vec<DocSummary>>> + Send;
}
