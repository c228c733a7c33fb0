//! Backend interface crate for the FinRAG client.
//!
//! This crate defines the contract with the retrieval-augmented-generation
//! backend and provides an HTTP implementation of it. The rest of the
//! application only talks to the `Backend` trait, which keeps the session
//! logic testable against mock backends.
//!
//! # Example
//! ```no_run
//! use finrag_backend::{Backend, HttpBackend, QueryRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = HttpBackend::new("http://127.0.0.1:8000");
//! let request = QueryRequest::new("latest yen intervention news").with_top_k(4);
//! let response = backend.query(&request).await?;
//! println!("{}", response.answer);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod http;

// Re-export main types
pub use client::{
    Backend, ClearResponse, HealthStatus, QueryRequest, QueryResponse, SourceDoc, VectorStats,
};
pub use http::HttpBackend;
