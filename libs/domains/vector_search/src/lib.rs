//! Vector Search Domain
//!
//! Relays a free-text query to an embedding provider and runs a k-nearest-neighbour
//! aggregation on MongoDB Atlas with the resulting vector.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │      Handlers        │  ← GET /vectorSearch/{query}
//! └──────────┬───────────┘
//!            │
//! ┌──────────▼───────────┐
//! │ VectorSearchService  │  ← validate, embed, search, strip
//! └─────┬──────────┬─────┘
//!       │          │
//! ┌─────▼─────┐ ┌──▼──────────────┐
//! │ Embedding │ │  SearchGateway  │
//! │ Provider  │ │     (trait)     │
//! └─────┬─────┘ └──┬──────────────┘
//!       │          │
//! ┌─────▼─────┐ ┌──▼──────────────┐
//! │  OpenAI   │ │ MongoSearch     │
//! │ Provider  │ │ Gateway         │
//! └───────────┘ └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use core_config::FromEnv;
//! use domain_vector_search::{
//!     handlers, MongoSearchGateway, OpenAIConfig, OpenAIProvider, SearchSettings,
//!     VectorSearchService,
//! };
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let settings = SearchSettings::from_env()?;
//!
//! let provider = OpenAIProvider::new(OpenAIConfig::from_env()?)?;
//! let gateway = MongoSearchGateway::new(&client.database("sample_mflix"), &settings.collection);
//! let service = VectorSearchService::new(Arc::new(provider), gateway, settings);
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod embedding;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod pipeline;
pub mod service;

// Re-export commonly used types
pub use embedding::{EmbeddingProvider, OpenAIConfig, OpenAIProvider};
pub use error::{SearchError, SearchResult};
pub use gateway::SearchGateway;
pub use handlers::ApiDoc;
pub use models::{EmbeddingModel, EmbeddingResult, KnnQuery, SearchSettings, SearchStage};
pub use self::mongodb::MongoSearchGateway;
pub use service::VectorSearchService;
