//! HTTP handlers for the Vector Search API

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use axum_helpers::TextPath;
use axum_helpers::errors::responses::{
    BadGatewayResponse, BadRequestValidationResponse, InternalServerErrorResponse,
};
use serde_json::Value;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::SearchResult;
use crate::gateway::SearchGateway;
use crate::service::VectorSearchService;

/// OpenAPI documentation for the Vector Search API
#[derive(OpenApi)]
#[openapi(
    paths(vector_search),
    components(responses(
        BadRequestValidationResponse,
        BadGatewayResponse,
        InternalServerErrorResponse
    )),
    tags(
        (name = "Vector Search", description = "Semantic search over stored documents")
    )
)]
pub struct ApiDoc;

/// Create the vector search router
pub fn router<G: SearchGateway + 'static>(service: VectorSearchService<G>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/vectorSearch/{query}", get(vector_search::<G>))
        .with_state(shared_service)
}

/// Find the documents most similar to a free-text query
#[utoipa::path(
    get,
    path = "/vectorSearch/{query}",
    tag = "Vector Search",
    params(
        ("query" = String, Path, description = "Free-text query, URL-encoded")
    ),
    responses(
        (status = 200, description = "Matching documents, most similar first", body = Vec<Object>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 502, response = BadGatewayResponse)
    )
)]
async fn vector_search<G: SearchGateway>(
    State(service): State<Arc<VectorSearchService<G>>>,
    TextPath(query): TextPath,
) -> SearchResult<Json<Vec<Value>>> {
    let documents = service.search(&query).await?;
    Ok(Json(documents))
}
