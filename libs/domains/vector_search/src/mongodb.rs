//! MongoDB Atlas implementation of SearchGateway

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{Collection, Database, bson::Document};
use tracing::{debug, instrument};

use crate::error::SearchResult;
use crate::gateway::SearchGateway;
use crate::models::KnnQuery;
use crate::pipeline::build_pipeline;

/// Runs the k-NN aggregation against one Atlas collection
///
/// Cheap to clone; the underlying client pool is shared.
#[derive(Clone, Debug)]
pub struct MongoSearchGateway {
    collection: Collection<Document>,
}

impl MongoSearchGateway {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Document>(collection_name);
        Self { collection }
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }
}

#[async_trait]
impl SearchGateway for MongoSearchGateway {
    #[instrument(
        skip(self, query),
        fields(collection = %self.collection.name(), index = %query.index, stage = %query.stage, k = query.k)
    )]
    async fn search(&self, query: &KnnQuery) -> SearchResult<Vec<Document>> {
        let pipeline = build_pipeline(query);

        let cursor = self.collection.aggregate(pipeline).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        debug!(matches = documents.len(), "Aggregation returned");
        Ok(documents)
    }
}
