//! OpenAPI documentation configuration

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vector Search API",
        version = "0.1.0",
        description = "Semantic search over MongoDB Atlas using OpenAI embeddings",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    )
)]
struct ServiceInfo;

/// Combined OpenAPI documentation for Vector Search API
///
/// The domain routes are mounted at the root, so their document is merged
/// rather than nested under a prefix.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        ServiceInfo::openapi().merge_from(domain_vector_search::ApiDoc::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_route_documented_at_root() {
        let doc = ApiDoc::openapi();

        assert_eq!(doc.info.title, "Vector Search API");
        assert!(doc.paths.paths.contains_key("/vectorSearch/{query}"));
    }
}
