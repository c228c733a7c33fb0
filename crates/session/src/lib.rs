//! Query session management for the FinRAG client.
//!
//! This crate owns the conversational core of the application:
//! - [`ConversationIdentity`] generates and holds the active conversation id
//!   and rotates it when the user starts a new chat.
//! - [`QuerySession`] drives the request lifecycle for one search: state
//!   transitions, the backend round trip, staleness guarding, and the
//!   published state the presentation layer renders from.
//!
//! The presentation boundary is [`SessionSnapshot`] plus the callable
//! operations `submit` and `start_new_conversation`.

pub mod controller;
pub mod conversation;

// Re-export main types
pub use controller::{QuerySession, SessionSnapshot, SessionStatus, ALLOWED_TOP_K};
pub use conversation::{ConversationId, ConversationIdentity};
