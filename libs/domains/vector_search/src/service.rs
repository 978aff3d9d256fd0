//! Vector search service - embeds the query, then runs the k-NN lookup

use std::sync::Arc;

use mongodb::bson::{Bson, Document};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::embedding::EmbeddingProvider;
use crate::error::SearchResult;
use crate::gateway::SearchGateway;
use crate::models::SearchSettings;
use crate::pipeline::remove_path;

/// Relays a text query through the embedding provider into the search gateway
///
/// The two calls run strictly one after the other. A failed embedding never
/// reaches the gateway.
pub struct VectorSearchService<G: SearchGateway> {
    embedder: Arc<dyn EmbeddingProvider>,
    gateway: G,
    settings: SearchSettings,
}

impl<G: SearchGateway> VectorSearchService<G> {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, gateway: G, settings: SearchSettings) -> Self {
        Self {
            embedder,
            gateway,
            settings,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Return the documents nearest to `query`, most similar first
    #[instrument(skip(self, query), fields(query_len = query.len(), index = %self.settings.index))]
    pub async fn search(&self, query: &str) -> SearchResult<Vec<Value>> {
        let embedding = self.embedder.embed(query).await?;

        let model = self.embedder.model();
        if embedding.dimension() != model.dimension() {
            warn!(
                model = %model,
                expected = model.dimension(),
                actual = embedding.dimension(),
                "Embedding dimension does not match model"
            );
        }
        debug!(dimension = embedding.dimension(), "Embedding obtained");

        let knn = self.settings.knn_query(embedding.values);
        let mut documents = self.gateway.search(&knn).await?;
        documents.truncate(knn.k as usize);

        info!(matches = documents.len(), "Vector search completed");

        Ok(documents
            .into_iter()
            .map(|document| self.render(document))
            .collect())
    }

    fn render(&self, mut document: Document) -> Value {
        if self.settings.strip_embedding {
            remove_path(&mut document, &self.settings.path);
        }
        Bson::Document(document).into_relaxed_extjson()
    }
}
