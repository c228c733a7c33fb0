//! Query session controller.
//!
//! Owns the request lifecycle for one search: validates the question,
//! transitions through explicit states, calls the backend, and publishes
//! the resulting answer/sources/error into observable state that the
//! presentation layer renders from.
//!
//! Two in-flight submissions may race. Each submission captures a
//! monotonically increasing sequence number and the conversation id that
//! was active when it was issued; a response is applied to published state
//! only if no newer submission has started since and the conversation has
//! not been reset. Stale responses are discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use finrag_backend::{Backend, QueryRequest, SourceDoc};
use serde::Serialize;

use crate::conversation::{ConversationId, ConversationIdentity};

/// Top-k values the client offers, matching the backend's sensible range.
pub const ALLOWED_TOP_K: &[u32] = &[2, 3, 4, 5, 6, 8];

/// Fallback message when a transport failure carries no diagnostic.
const GENERIC_FAILURE: &str = "Request failed";

/// Lifecycle state of the current submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Loading,
    Done,
    Error,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Done => "done",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Published state, owned by the controller and mutated only by it.
#[derive(Debug)]
struct PublishedState {
    status: SessionStatus,
    answer: String,
    sources: Vec<SourceDoc>,
    error_message: String,
    stats_count: u64,
}

impl PublishedState {
    fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            answer: String::new(),
            sources: Vec::new(),
            error_message: String::new(),
            stats_count: 0,
        }
    }

    /// Clear the per-submission fields, keeping the stats counter.
    fn clear_result(&mut self) {
        self.answer.clear();
        self.sources.clear();
        self.error_message.clear();
    }
}

/// Read-only view of the published state for presentation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub answer: String,
    pub sources: Vec<SourceDoc>,
    pub error_message: String,
    pub session_id: String,
    pub stats_count: u64,
}

/// The query session controller.
///
/// Methods take `&self`; published state lives behind a mutex that is never
/// held across an await point, so concurrent submissions from a
/// single-runtime event loop are safe.
pub struct QuerySession {
    backend: Arc<dyn Backend>,
    identity: ConversationIdentity,
    state: Arc<Mutex<PublishedState>>,
    submission_seq: AtomicU64,
}

impl QuerySession {
    /// Create a session against the given backend with a fresh conversation.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            identity: ConversationIdentity::new(),
            state: Arc::new(Mutex::new(PublishedState::new())),
            submission_seq: AtomicU64::new(0),
        }
    }

    /// Snapshot of the published state for rendering.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = lock(&self.state);
        SessionSnapshot {
            status: state.status,
            answer: state.answer.clone(),
            sources: state.sources.clone(),
            error_message: state.error_message.clone(),
            session_id: self.identity.active().to_string(),
            stats_count: state.stats_count,
        }
    }

    /// The currently active conversation id.
    pub fn conversation_id(&self) -> ConversationId {
        self.identity.active()
    }

    /// Submit a question to the backend and publish the outcome.
    ///
    /// An empty or whitespace-only question is a no-op: no state
    /// transition, no network call. Every non-empty submission is a fresh
    /// backend round trip; there is no deduplication or caching.
    ///
    /// Failures never propagate out of this method — they end up in the
    /// published `error_message`, and the state machine always leaves
    /// `Loading` for exactly one of `Done` or `Error`.
    pub async fn submit(&self, question: &str, top_k: u32, fast: bool) {
        let question = question.trim();
        if question.is_empty() {
            tracing::debug!("Ignoring empty question");
            return;
        }

        // Capture ordering context before going to the network.
        let seq = self.submission_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let conversation_id = self.identity.active();

        {
            let mut state = lock(&self.state);
            state.status = SessionStatus::Loading;
            state.clear_result();
        }

        let request = QueryRequest::new(question)
            .with_top_k(top_k)
            .with_fast(fast)
            .with_conversation(conversation_id.as_str());

        tracing::info!(
            "Submitting question (k={}, fast={}, conversation={})",
            top_k,
            fast,
            conversation_id
        );

        match self.backend.query(&request).await {
            Ok(response) => {
                {
                    // Staleness is checked under the state lock: a newer
                    // submission publishes its `Loading` transition under
                    // the same lock, after bumping the sequence, so no
                    // newer submission can start between this check and
                    // the publish.
                    let mut state = lock(&self.state);
                    if !self.is_current(seq, &conversation_id) {
                        tracing::debug!("Discarding stale response (seq {})", seq);
                        return;
                    }

                    // A backend-reported error can ride along with a
                    // partial answer; surface both.
                    state.error_message = response.error.unwrap_or_default();
                    state.answer = response.answer;
                    state.sources = response.contexts;
                    state.status = SessionStatus::Done;
                }

                self.spawn_stats_refresh();
            }
            Err(e) => {
                let mut state = lock(&self.state);
                if !self.is_current(seq, &conversation_id) {
                    tracing::debug!("Discarding stale failure (seq {})", seq);
                    return;
                }

                tracing::warn!("Query failed: {}", e);

                state.clear_result();
                state.error_message = transport_message(&e);
                state.status = SessionStatus::Error;
            }
        }
    }

    /// Start a new conversation.
    ///
    /// Resets the published answer, sources and error, returns the status
    /// to `Idle`, rotates the conversation id, and invalidates any
    /// outstanding submissions so a late pre-reset response cannot land in
    /// the new conversation. The id always changes, even when the backend
    /// clear request fails.
    pub fn start_new_conversation(&self) -> ConversationId {
        // Outstanding responses belong to the old conversation.
        self.submission_seq.fetch_add(1, Ordering::SeqCst);

        {
            let mut state = lock(&self.state);
            state.status = SessionStatus::Idle;
            state.clear_result();
        }

        self.identity.reset(&self.backend)
    }

    /// Refresh the published stats counter.
    ///
    /// Best-effort: on failure the previous value is kept and nothing is
    /// surfaced. Called at application startup and after each completed
    /// submission.
    pub async fn refresh_stats(&self) {
        match self.backend.stats().await {
            Ok(stats) => {
                let mut state = lock(&self.state);
                state.stats_count = stats.count;
            }
            Err(e) => {
                tracing::debug!("Stats refresh failed (keeping last value): {}", e);
            }
        }
    }

    /// Whether a submission issued with `seq` for `conversation_id` is
    /// still the one the published state should reflect.
    ///
    /// Callers publishing on the strength of this check must hold the
    /// state lock across both the check and the write.
    fn is_current(&self, seq: u64, conversation_id: &ConversationId) -> bool {
        self.submission_seq.load(Ordering::SeqCst) == seq
            && self.identity.active() == *conversation_id
    }

    /// Detached stats refresh following a completed submission.
    fn spawn_stats_refresh(&self) {
        let backend = Arc::clone(&self.backend);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            match backend.stats().await {
                Ok(stats) => {
                    let mut state = lock(&state);
                    state.stats_count = stats.count;
                }
                Err(e) => {
                    tracing::debug!("Stats refresh failed (keeping last value): {}", e);
                }
            }
        });
    }
}

/// Lock the published state, recovering from poisoning.
fn lock(state: &Mutex<PublishedState>) -> MutexGuard<'_, PublishedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Human-readable message for a transport failure.
fn transport_message(err: &finrag_core::AppError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        GENERIC_FAILURE.to_string()
    } else {
        message
    }
}
