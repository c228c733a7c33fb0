//! Conversation identity management.
//!
//! A conversation id scopes backend-side retrieval and crawl state to one
//! user conversation. Exactly one id is active at a time; it is generated
//! client-side and replaced (never mutated) when the user starts a new
//! chat. Only this module writes the active id — everything else reads it
//! at call time.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use finrag_backend::Backend;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque unique token identifying one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(String);

impl ConversationId {
    /// Generate a new random conversation id.
    ///
    /// Collision-resistant (UUID v4); no side effects beyond generation.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Owner of the active conversation id.
///
/// Created with a fresh id at application start. `reset` installs a new id
/// and fires a detached best-effort backend clear for it, so any residue
/// from an earlier life of the same id is wiped before first use.
pub struct ConversationIdentity {
    active: Mutex<ConversationId>,
}

impl ConversationIdentity {
    /// Create the identity manager with a freshly generated id.
    pub fn new() -> Self {
        let id = ConversationId::new();
        tracing::debug!("Starting conversation: {}", id);
        Self {
            active: Mutex::new(id),
        }
    }

    /// The currently active conversation id, read at call time.
    pub fn active(&self) -> ConversationId {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the active id with a fresh one and return it.
    ///
    /// Spawns a detached backend clear for the new id. The clear is
    /// defensive cleanup and strictly best-effort: its failure is logged
    /// and swallowed, never blocking the reset or reaching the user.
    pub fn reset(&self, backend: &Arc<dyn Backend>) -> ConversationId {
        let id = ConversationId::new();
        {
            let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
            *active = id.clone();
        }
        tracing::info!("Started new conversation: {}", id);

        let backend = Arc::clone(backend);
        let clear_id = id.clone();
        tokio::spawn(async move {
            if let Err(e) = backend.clear_conversation(Some(clear_id.as_str())).await {
                tracing::debug!("Conversation clear failed (ignored): {}", e);
            }
        });

        id
    }
}

impl Default for ConversationIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = ConversationId::new();
        let b = ConversationId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_active_reflects_construction() {
        let identity = ConversationIdentity::new();
        let first = identity.active();
        // Reads do not rotate the id
        assert_eq!(identity.active(), first);
    }
}
