//! Vector search routes wired to OpenAI and MongoDB Atlas

use std::sync::Arc;

use axum::Router;
use domain_vector_search::{
    MongoSearchGateway, OpenAIProvider, VectorSearchService, handlers,
};
use tracing::info;

use crate::state::AppState;

pub fn router(state: &AppState) -> eyre::Result<Router> {
    let provider = OpenAIProvider::new(state.config.openai.clone())?;
    let gateway = MongoSearchGateway::new(&state.db, &state.config.search.collection);

    info!(
        collection = gateway.collection_name(),
        index = %state.config.search.index,
        stage = %state.config.search.stage,
        model = %state.config.openai.model,
        "Vector search configured"
    );

    let service =
        VectorSearchService::new(Arc::new(provider), gateway, state.config.search.clone());
    Ok(handlers::router(service))
}
