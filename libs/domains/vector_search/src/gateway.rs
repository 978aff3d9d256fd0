use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::Document;

use crate::error::SearchResult;
use crate::models::KnnQuery;

/// Runs a k-NN lookup against the document store
///
/// Returns at most `query.k` documents, most similar first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchGateway: Send + Sync {
    async fn search(&self, query: &KnnQuery) -> SearchResult<Vec<Document>>;
}

#[async_trait]
impl<T> SearchGateway for Arc<T>
where
    T: SearchGateway + ?Sized,
{
    async fn search(&self, query: &KnnQuery) -> SearchResult<Vec<Document>> {
        (**self).search(query).await
    }
}
