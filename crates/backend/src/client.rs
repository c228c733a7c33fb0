//! Backend abstraction and request/response types.
//!
//! The wire format matches the FinRAG FastAPI backend. Optional response
//! fields are normalized at this boundary: a missing `answer` deserializes
//! to an empty string, missing `contexts` to an empty vector, so internal
//! state never carries that ambiguity further.

use finrag_core::AppResult;
use serde::{Deserialize, Serialize};

/// One search request against the backend query endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,

    /// Number of source documents to retrieve
    pub k: u32,

    /// Skip live crawling and answer from the existing index only
    pub fast: bool,

    /// Conversation id scoping backend-side retrieval state
    pub conversation_id: Option<String>,
}

impl QueryRequest {
    /// Create a request with the backend's default retrieval settings.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            k: 4,
            fast: false,
            conversation_id: None,
        }
    }

    /// Set the number of sources to retrieve.
    pub fn with_top_k(mut self, k: u32) -> Self {
        self.k = k;
        self
    }

    /// Enable or disable fast mode.
    pub fn with_fast(mut self, fast: bool) -> Self {
        self.fast = fast;
        self
    }

    /// Scope the request to a conversation.
    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }
}

/// A single retrieved document reference backing a generated answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDoc {
    /// Display label, when the crawler extracted one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Canonical link to the document
    pub url: String,

    /// Short excerpt of the matched content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// Response from the backend query endpoint.
///
/// The backend reports internal failures in-band: it can return HTTP 200
/// with an `error` field, sometimes alongside a partial answer. It may also
/// attach a `traceback` field, which this client ignores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Generated answer text, possibly empty
    #[serde(default)]
    pub answer: String,

    /// Source documents in relevance order
    #[serde(default)]
    pub contexts: Vec<SourceDoc>,

    /// Backend-reported failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Acknowledgement of a conversation-clear request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    /// Number of conversation stores removed (0 or 1)
    #[serde(default)]
    pub cleared: u32,
}

/// Vector store statistics reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStats {
    /// Number of indexed items currently visible to the backend
    #[serde(default)]
    pub count: u64,

    /// Collection name, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,

    /// Persistence directory, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persist_dir: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok" when the backend is up
    #[serde(default)]
    pub status: String,
}

impl HealthStatus {
    /// Whether the backend reported itself healthy.
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Trait for the RAG backend.
///
/// This trait abstracts the backend transport so the session controller can
/// be driven against mock implementations in tests.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Run one retrieval-and-answer round trip.
    async fn query(&self, request: &QueryRequest) -> AppResult<QueryResponse>;

    /// Clear backend-side state scoped to a conversation.
    ///
    /// Callers treat failures as best-effort: they are logged and dropped,
    /// never surfaced to the user.
    async fn clear_conversation(&self, conversation_id: Option<&str>) -> AppResult<ClearResponse>;

    /// Fetch current vector store statistics.
    async fn stats(&self) -> AppResult<VectorStats>;

    /// Check backend reachability.
    async fn health(&self) -> AppResult<HealthStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_builder() {
        let request = QueryRequest::new("일본 5500억 달러")
            .with_top_k(6)
            .with_fast(true)
            .with_conversation("cid-123");

        assert_eq!(request.question, "일본 5500억 달러");
        assert_eq!(request.k, 6);
        assert!(request.fast);
        assert_eq!(request.conversation_id.as_deref(), Some("cid-123"));
    }

    #[test]
    fn test_response_missing_fields_normalize() {
        // A bare object is a valid response: answer -> "", contexts -> []
        let response: QueryResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.answer, "");
        assert!(response.contexts.is_empty());
        assert!(response.error.is_none());
    }

    #[test]
    fn test_response_with_error_and_partial_answer() {
        let json = r#"{
            "answer": "부분 답변",
            "contexts": [{"url": "https://a.example", "title": "A"}],
            "error": "crawler failed",
            "traceback": "Traceback (most recent call last): ..."
        }"#;
        let response: QueryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.answer, "부분 답변");
        assert_eq!(response.contexts.len(), 1);
        assert_eq!(response.contexts[0].title.as_deref(), Some("A"));
        assert!(response.contexts[0].preview.is_none());
        assert_eq!(response.error.as_deref(), Some("crawler failed"));
    }

    #[test]
    fn test_stats_deserialization() {
        let json = r#"{"collection": "news", "persist_dir": "/data/chroma", "count": 42}"#;
        let stats: VectorStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.count, 42);
        assert_eq!(stats.collection.as_deref(), Some("news"));

        let empty: VectorStats = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.count, 0);
    }
}
