//! HTTP implementation of the document store against the Notion v1 API.
//!
//! Documents are pages under a shared parent page; content blocks map to
//! Notion block objects. The API caps rich-text payloads per block and
//! children per append call, so writes are batched and reads are paginated.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::retry::RetryConfig;
use super::{
    ArchiveOutcome, ContentBlock, DocId, DocStatus, DocSummary, DocumentStore, RemoteError,
    RemoteResult, UpdateOutcome,
};

const API_BASE: &str = "https://api.notion.com/v1";
const API_VERSION: &str = "2022-06-28";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum children per append request (API limit).
const APPEND_BATCH_SIZE: usize = 100;

/// Notion-backed document store.
pub struct HttpStore {
    client: reqwest::Client,
    token: String,
    base_url: String,
    retry: RetryConfig,
}

impl HttpStore {
    /// Create a store using the given integration token.
    #[must_use]
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, API_BASE.to_string())
    }

    /// Create a store against a custom endpoint (tests, proxies).
    #[must_use]
    pub fn with_base_url(token: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url,
            retry: RetryConfig::default(),
        }
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> RemoteResult<Value> {
        let response = request
            .bearer_auth(&self.token)
            .header("Notion-Version", API_VERSION)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RemoteError::Timeout(REQUEST_TIMEOUT_SECS)
                } else {
                    RemoteError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|e| RemoteError::Service(format!("invalid response body: {e}")));
        }

        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        let message = extract_api_message(&body);

        Err(match status.as_u16() {
            401 => RemoteError::Auth(message),
            403 => RemoteError::Permission(message),
            404 => RemoteError::NotFound(message),
            429 => RemoteError::RateLimited { retry_after_secs: retry_after },
            400 | 409 | 422 => RemoteError::BadRequest(message),
            _ => RemoteError::Service(format!("{status}: {message}")),
        })
    }

    async fn get(&self, path: &str) -> RemoteResult<Value> {
        let url = format!("{}{path}", self.base_url);
        self.retry
            .run(path, || self.send(self.client.get(&url)))
            .await
    }

    async fn post(&self, path: &str, body: &Value) -> RemoteResult<Value> {
        let url = format!("{}{path}", self.base_url);
        self.retry
            .run(path, || self.send(self.client.post(&url).json(body)))
            .await
    }

    async fn patch(&self, path: &str, body: &Value) -> RemoteResult<Value> {
        let url = format!("{}{path}", self.base_url);
        self.retry
            .run(path, || self.send(self.client.patch(&url).json(body)))
            .await
    }

    async fn delete(&self, path: &str) -> RemoteResult<Value> {
        let url = format!("{}{path}", self.base_url);
        self.retry
            .run(path, || self.send(self.client.delete(&url)))
            .await
    }

    /// List every child block ID of a page, following pagination cursors.
    async fn list_child_ids(&self, doc: &DocId) -> RemoteResult<Vec<String>> {
        let mut ids = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut path = format!("/blocks/{doc}/children?page_size=100");
            if let Some(c) = &cursor {
                path.push_str(&format!("&start_cursor={c}"));
            }
            let page: BlockListResponse = parse(self.get(&path).await?)?;
            ids.extend(page.results.into_iter().map(|b| b.id));
            if page.has_more {
                cursor = page.next_cursor;
            } else {
                return Ok(ids);
            }
        }
    }

    /// Delete the existing children of a page before re-appending content.
    ///
    /// Any deletion failure aborts the update: a partially cleared page
    /// followed by an append would leave stale blocks interleaved with new
    /// content, and a later pull would reassemble both. The caller reports
    /// the file as failed and keeps its previous cache record instead.
    async fn clear_children(&self, doc: &DocId) -> RemoteResult<()> {
        for id in self.list_child_ids(doc).await? {
            self.delete(&format!("/blocks/{id}")).await?;
        }
        Ok(())
    }

    /// Append blocks to a page in API-sized batches.
    async fn append_blocks(&self, doc: &DocId, blocks: &[ContentBlock]) -> RemoteResult<()> {
        for batch in blocks.chunks(APPEND_BATCH_SIZE) {
            let children: Vec<Value> = batch.iter().map(block_to_json).collect();
            self.patch(&format!("/blocks/{doc}/children"), &json!({ "children": children }))
                .await?;
        }
        Ok(())
    }
}

impl DocumentStore for HttpStore {
    async fn create_document(
        &self,
        parent: &DocId,
        title: &str,
        blocks: &[ContentBlock],
    ) -> RemoteResult<DocId> {
        // The create call accepts an initial batch of children; the rest is
        // appended afterwards.
        let (head, tail) = blocks.split_at(blocks.len().min(APPEND_BATCH_SIZE));
        let children: Vec<Value> = head.iter().map(block_to_json).collect();
        let body = json!({
            "parent": { "type": "page_id", "page_id": parent },
            "properties": {
                "title": [{ "text": { "content": title } }]
            },
            "children": children,
        });

        let page: PageResponse = parse(self.post("/pages", &body).await?)?;
        debug!(doc = %page.id, title, "created remote document");

        if !tail.is_empty() {
            self.append_blocks(&page.id, tail).await?;
        }
        Ok(page.id)
    }

    async fn update_content(
        &self,
        doc: &DocId,
        blocks: &[ContentBlock],
    ) -> RemoteResult<UpdateOutcome> {
        // Resolve status first: editing an archived page is a permanent API
        // error, and the caller handles both cases via reconciliation.
        match self.document_status(doc).await? {
            DocStatus::Archived => return Ok(UpdateOutcome::Archived),
            DocStatus::Missing => return Ok(UpdateOutcome::NotFound),
            DocStatus::Active => {}
        }

        self.clear_children(doc).await?;
        self.append_blocks(doc, blocks).await?;
        Ok(UpdateOutcome::Updated)
    }

    async fn archive_document(&self, doc: &DocId) -> RemoteResult<ArchiveOutcome> {
        if self.document_status(doc).await? == DocStatus::Archived {
            return Ok(ArchiveOutcome::AlreadyArchived);
        }
        self.patch(&format!("/pages/{doc}"), &json!({ "archived": true }))
            .await?;
        Ok(ArchiveOutcome::Archived)
    }

    async fn fetch_content(&self, doc: &DocId) -> RemoteResult<Vec<ContentBlock>> {
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut path = format!("/blocks/{doc}/children?page_size=100");
            if let Some(c) = &cursor {
                path.push_str(&format!("&start_cursor={c}"));
            }
            let page: BlockListResponse = parse(self.get(&path).await?)?;
            blocks.extend(page.results.iter().filter_map(block_from_json));
            if page.has_more {
                cursor = page.next_cursor;
            } else {
                return Ok(blocks);
            }
        }
    }

    async fn document_status(&self, doc: &DocId) -> RemoteResult<DocStatus> {
        match self.get(&format!("/pages/{doc}")).await {
            Ok(value) => {
                let page: PageResponse = parse(value)?;
                Ok(if page.archived { DocStatus::Archived } else { DocStatus::Active })
            }
            Err(RemoteError::NotFound(_)) => Ok(DocStatus::Missing),
            Err(e) => Err(e),
        }
    }

    async fn list_children(&self, parent: &DocId) -> RemoteResult<Vec<DocSummary>> {
        // Child pages show up as child_page blocks in the parent's block
        // listing; archived pages are absent from it.
        let mut docs = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut path = format!("/blocks/{parent}/children?page_size=100");
            if let Some(c) = &cursor {
                path.push_str(&format!("&start_cursor={c}"));
            }
            let page: BlockListResponse = parse(self.get(&path).await?)?;
            docs.extend(page.results.iter().filter_map(|b| {
                if b.kind != "child_page" {
                    return None;
                }
                let title = b
                    .payload
                    .pointer("/child_page/title")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Some(DocSummary { id: b.id.clone(), title })
            }));
            if page.has_more {
                cursor = page.next_cursor;
            } else {
                return Ok(docs);
            }
        }
    }
}

// ── Wire format ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PageResponse {
    id: String,
    #[serde(default)]
    archived: bool,
}

#[derive(Debug, Deserialize)]
struct BlockListResponse {
    results: Vec<BlockObject>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BlockObject {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    payload: Value,
}

fn parse<T: serde::de::DeserializeOwned>(value: Value) -> RemoteResult<T> {
    serde_json::from_value(value)
        .map_err(|e| RemoteError::Service(format!("unexpected response shape: {e}")))
}

fn extract_api_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

fn rich_text(content: &str) -> Value {
    json!([{ "type": "text", "text": { "content": content } }])
}

fn block_to_json(block: &ContentBlock) -> Value {
    match block {
        ContentBlock::Heading(text) => json!({
            "object": "block",
            "type": "heading_2",
            "heading_2": { "rich_text": rich_text(text) },
        }),
        ContentBlock::Paragraph(text) => json!({
            "object": "block",
            "type": "paragraph",
            "paragraph": { "rich_text": rich_text(text) },
        }),
        ContentBlock::Divider => json!({
            "object": "block",
            "type": "divider",
            "divider": {},
        }),
        ContentBlock::Code { text, language } => json!({
            "object": "block",
            "type": "code",
            "code": { "rich_text": rich_text(text), "language": language },
        }),
    }
}

/// Map an API block object back to a [`ContentBlock`].
///
/// Rich-text arrays are concatenated: the API may split long runs into
/// multiple segments. Unknown block types are dropped; pull only consumes
/// the block kinds push produces.
fn block_from_json(block: &BlockObject) -> Option<ContentBlock> {
    let body = block.payload.get(&block.kind)?;
    let joined = |v: &Value| -> String {
        v.get("rich_text")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.pointer("/text/content").and_then(Value::as_str))
                    .collect::<String>()
            })
            .unwrap_or_default()
    };

    match block.kind.as_str() {
        "heading_1" | "heading_2" | "heading_3" => Some(ContentBlock::Heading(joined(body))),
        "paragraph" => Some(ContentBlock::Paragraph(joined(body))),
        "divider" => Some(ContentBlock::Divider),
        "code" => Some(ContentBlock::Code {
            text: joined(body),
            language: body
                .get("language")
                .and_then(Value::as_str)
                .unwrap_or("plain text")
                .to_string(),
        }),
        _ => None,
    }
}
