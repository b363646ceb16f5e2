//! Query engine integration.
//!
//! All activity matching and recommendation synthesis happens in a hosted
//! retrieval-augmented LLM service. This module owns the boundary: a
//! [`QueryEngine`] trait at the seam and the [`CloudIndexClient`] HTTP
//! implementation behind it. Everything else in the crate sees only
//! `Arc<dyn QueryEngine>`.

mod cloud;

pub use cloud::CloudIndexClient;

use async_trait::async_trait;

use crate::error::RetrievalError;

/// Response from a full retrieval + synthesis query.
#[derive(Debug, Clone)]
pub struct QueryResponse {
    /// The service's free-text answer, returned to callers verbatim.
    pub text: String,
}

/// A raw retrieved chunk with its similarity score.
///
/// Only the diagnostic probe consumes these; the main flow always goes
/// through [`QueryEngine::query`].
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub score: f32,
    pub text: String,
}

/// The hosted retrieval + LLM service.
///
/// One blocking round trip per call, no client-side retries or caching.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Submit `text` to the service's query capability, retrieving up to
    /// `top_k` chunks before synthesis, and return its answer.
    async fn query(&self, text: &str, top_k: usize) -> Result<QueryResponse, RetrievalError>;

    /// Retrieve the raw top-`top_k` chunks for `text` without synthesis.
    async fn retrieve(&self, text: &str, top_k: usize)
    -> Result<Vec<ScoredChunk>, RetrievalError>;
}
