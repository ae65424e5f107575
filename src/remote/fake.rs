//! Deterministic in-memory document store for engine tests.
//!
//! Records every call and lets tests script failures and externally-archived
//! documents, so push/pull/reconciliation behavior can be asserted without a
//! network.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{
    ArchiveOutcome, ContentBlock, DocId, DocStatus, DocSummary, DocumentStore, RemoteError,
    RemoteResult, UpdateOutcome,
};

/// A call observed by the fake, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create { title: String },
    Update { doc: DocId },
    Archive { doc: DocId },
    Fetch { doc: DocId },
    Status { doc: DocId },
    List { parent: DocId },
}

#[derive(Debug, Clone)]
struct FakeDoc {
    parent: DocId,
    title: String,
    blocks: Vec<ContentBlock>,
    archived: bool,
}

/// In-memory [`DocumentStore`].
#[derive(Default)]
pub struct FakeStore {
    docs: Mutex<HashMap<DocId, FakeDoc>>,
    calls: Mutex<Vec<Call>>,
    scripted_errors: Mutex<VecDeque<RemoteError>>,
    scripted_archive_errors: Mutex<VecDeque<RemoteError>>,
    next_id: AtomicUsize,
}

impl FakeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an error to be returned by the next store call.
    pub fn fail_next(&self, error: RemoteError) {
        self.scripted_errors.lock().unwrap().push_back(error);
    }

    /// Queue an error to be returned by the next archive call, leaving
    /// other calls untouched.
    pub fn fail_next_archive(&self, error: RemoteError) {
        self.scripted_archive_errors.lock().unwrap().push_back(error);
    }

    /// Archive a document out-of-band, simulating a manual workspace edit.
    pub fn archive_externally(&self, doc: &str) {
        if let Some(d) = self.docs.lock().unwrap().get_mut(doc) {
            d.archived = true;
        }
    }

    /// Calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of write calls (create/update/archive) recorded so far.
    #[must_use]
    pub fn write_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::Create { .. } | Call::Update { .. } | Call::Archive { .. }))
            .count()
    }

    /// IDs of non-archived documents, sorted.
    #[must_use]
    pub fn active_docs(&self) -> Vec<DocId> {
        let mut ids: Vec<DocId> = self
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, d)| !d.archived)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Title of a stored document.
    #[must_use]
    pub fn title_of(&self, doc: &str) -> Option<String> {
        self.docs.lock().unwrap().get(doc).map(|d| d.title.clone())
    }

    /// Stored blocks of a document.
    #[must_use]
    pub fn blocks_of(&self, doc: &str) -> Option<Vec<ContentBlock>> {
        self.docs.lock().unwrap().get(doc).map(|d| d.blocks.clone())
    }

    fn record(&self, call: Call) -> RemoteResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.scripted_errors.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl DocumentStore for FakeStore {
    async fn create_document(
        &self,
        parent: &DocId,
        title: &str,
        blocks: &[ContentBlock],
    ) -> RemoteResult<DocId> {
        self.record(Call::Create { title: title.to_string() })?;
        let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.docs.lock().unwrap().insert(
            id.clone(),
            FakeDoc {
                parent: parent.clone(),
                title: title.to_string(),
                blocks: blocks.to_vec(),
                archived: false,
            },
        );
        Ok(id)
    }

    async fn update_content(
        &self,
        doc: &DocId,
        blocks: &[ContentBlock],
    ) -> RemoteResult<UpdateOutcome> {
        self.record(Call::Update { doc: doc.clone() })?;
        let mut docs = self.docs.lock().unwrap();
        match docs.get_mut(doc) {
            None => Ok(UpdateOutcome::NotFound),
            Some(d) if d.archived => Ok(UpdateOutcome::Archived),
            Some(d) => {
                d.blocks = blocks.to_vec();
                Ok(UpdateOutcome::Updated)
            }
        }
    }

    async fn archive_document(&self, doc: &DocId) -> RemoteResult<ArchiveOutcome> {
        self.record(Call::Archive { doc: doc.clone() })?;
        if let Some(error) = self.scripted_archive_errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        let mut docs = self.docs.lock().unwrap();
        match docs.get_mut(doc) {
            None => Err(RemoteError::NotFound(doc.clone())),
            Some(d) if d.archived => Ok(ArchiveOutcome::AlreadyArchived),
            Some(d) => {
                d.archived = true;
                Ok(ArchiveOutcome::Archived)
            }
        }
    }

    async fn fetch_content(&self, doc: &DocId) -> RemoteResult<Vec<ContentBlock>> {
        self.record(Call::Fetch { doc: doc.clone() })?;
        self.docs
            .lock()
            .unwrap()
            .get(doc)
            .map(|d| d.blocks.clone())
            .ok_or_else(|| RemoteError::NotFound(doc.clone()))
    }

    async fn document_status(&self, doc: &DocId) -> RemoteResult<DocStatus> {
        self.record(Call::Status { doc: doc.clone() })?;
        Ok(match self.docs.lock().unwrap().get(doc) {
            None => DocStatus::Missing,
            Some(d) if d.archived => DocStatus::Archived,
            Some(_) => DocStatus::Active,
        })
    }

    async fn list_children(&self, parent: &DocId) -> RemoteResult<Vec<DocSummary>> {
        self.record(Call::List { parent: parent.clone() })?;
        let mut docs: Vec<DocSummary> = self
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, d)| &d.parent == parent && !d.archived)
            .map(|(id, d)| DocSummary { id: id.clone(), title: d.title.clone() })
            .collect();
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_status() {
        let store = FakeStore::new();
        let id = store
            .create_document(&"parent".into(), "app.py", &[])
            .await
            .unwrap();
        assert_eq!(store.document_status(&id).await.unwrap(), DocStatus::Active);
        assert_eq!(store.title_of(&id).as_deref(), Some("app.py"));
    }

    #[tokio::test]
    async fn test_update_archived_doc_reports_archived() {
        let store = FakeStore::new();
        let id = store
            .create_document(&"parent".into(), "app.py", &[])
            .await
            .unwrap();
        store.archive_externally(&id);
        let outcome = store.update_content(&id, &[]).await.unwrap();
        assert_eq!(outcome, UpdateOutcome::Archived);
    }

    #[tokio::test]
    async fn test_scripted_error_surfaces_once() {
        let store = FakeStore::new();
        store.fail_next(RemoteError::RateLimited { retry_after_secs: None });
        let err = store
            .create_document(&"parent".into(), "a", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::RateLimited { .. }));
        // Next call succeeds
        assert!(store.create_document(&"parent".into(), "a", &[]).await.is_ok());
    }
}
