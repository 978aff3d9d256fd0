use async_trait::async_trait;

use crate::error::SearchResult;
use crate::models::{EmbeddingModel, EmbeddingResult};

/// Turns free text into an embedding vector
///
/// One attempt per call. Retrying is left to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model whose vectors this provider returns
    fn model(&self) -> EmbeddingModel;

    /// Generate the embedding for a single text
    async fn embed(&self, text: &str) -> SearchResult<EmbeddingResult>;
}
