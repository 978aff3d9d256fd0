use core_config::{ConfigError, FromEnv, env_parse_or, env_required};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Embedding model selection
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum EmbeddingModel {
    /// OpenAI text-embedding-ada-002 (1536 dimensions, legacy)
    #[default]
    #[serde(rename = "text-embedding-ada-002")]
    #[strum(serialize = "text-embedding-ada-002")]
    TextEmbeddingAda002,
    /// OpenAI text-embedding-3-small (1536 dimensions)
    #[serde(rename = "text-embedding-3-small")]
    #[strum(serialize = "text-embedding-3-small")]
    TextEmbedding3Small,
    /// OpenAI text-embedding-3-large (3072 dimensions)
    #[serde(rename = "text-embedding-3-large")]
    #[strum(serialize = "text-embedding-3-large")]
    TextEmbedding3Large,
}

impl EmbeddingModel {
    pub fn dimension(&self) -> usize {
        match self {
            EmbeddingModel::TextEmbeddingAda002 => 1536,
            EmbeddingModel::TextEmbedding3Small => 1536,
            EmbeddingModel::TextEmbedding3Large => 3072,
        }
    }

    pub fn model_name(&self) -> &'static str {
        match self {
            EmbeddingModel::TextEmbeddingAda002 => "text-embedding-ada-002",
            EmbeddingModel::TextEmbedding3Small => "text-embedding-3-small",
            EmbeddingModel::TextEmbedding3Large => "text-embedding-3-large",
        }
    }
}

/// Embedding result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmbeddingResult {
    pub values: Vec<f64>,
    pub tokens_used: u32,
}

impl EmbeddingResult {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            tokens_used: 0,
        }
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }
}

/// Aggregation stage used for the nearest-neighbour lookup
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SearchStage {
    /// Atlas Search `$search` with the `knnBeta` operator
    #[default]
    KnnBeta,
    /// Atlas `$vectorSearch`
    VectorSearch,
}

pub const DEFAULT_INDEX: &str = "vectorIndex";
pub const DEFAULT_PATH: &str = "embedding";
pub const DEFAULT_LIMIT: u32 = 5;
pub const DEFAULT_NUM_CANDIDATES: u32 = 100;

/// Where and how to search.
///
/// Loaded once at startup; every request uses the same settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    pub collection: String,
    pub index: String,
    pub path: String,
    pub limit: u32,
    pub num_candidates: u32,
    pub stage: SearchStage,
    pub strip_embedding: bool,
}

impl SearchSettings {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            index: DEFAULT_INDEX.to_string(),
            path: DEFAULT_PATH.to_string(),
            limit: DEFAULT_LIMIT,
            num_candidates: DEFAULT_NUM_CANDIDATES,
            stage: SearchStage::default(),
            strip_embedding: true,
        }
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_stage(mut self, stage: SearchStage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_strip_embedding(mut self, strip: bool) -> Self {
        self.strip_embedding = strip;
        self
    }

    /// Check the invariants the aggregation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, details: &str| ConfigError::ParseError {
            key: key.to_string(),
            details: details.to_string(),
        };

        if self.collection.trim().is_empty() {
            return Err(invalid("VECTOR_SEARCH_COLLECTION", "must not be empty"));
        }
        if self.index.trim().is_empty() {
            return Err(invalid("VECTOR_SEARCH_INDEX", "must not be empty"));
        }
        if self.path.trim().is_empty() {
            return Err(invalid("VECTOR_SEARCH_PATH", "must not be empty"));
        }
        if self.limit == 0 {
            return Err(invalid("VECTOR_SEARCH_LIMIT", "must be at least 1"));
        }
        if self.stage == SearchStage::VectorSearch && self.num_candidates < self.limit {
            return Err(invalid(
                "VECTOR_SEARCH_NUM_CANDIDATES",
                "must be greater than or equal to VECTOR_SEARCH_LIMIT",
            ));
        }
        Ok(())
    }

    /// Build the query for one request from these settings
    pub fn knn_query(&self, vector: Vec<f64>) -> KnnQuery {
        KnnQuery {
            index: self.index.clone(),
            path: self.path.clone(),
            vector,
            k: self.limit,
            num_candidates: self.num_candidates,
            stage: self.stage,
            strip_embedding: self.strip_embedding,
        }
    }
}

impl FromEnv for SearchSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let settings = Self {
            collection: env_required("VECTOR_SEARCH_COLLECTION")?,
            index: env_parse_or("VECTOR_SEARCH_INDEX", DEFAULT_INDEX.to_string())?,
            path: env_parse_or("VECTOR_SEARCH_PATH", DEFAULT_PATH.to_string())?,
            limit: env_parse_or("VECTOR_SEARCH_LIMIT", DEFAULT_LIMIT)?,
            num_candidates: env_parse_or("VECTOR_SEARCH_NUM_CANDIDATES", DEFAULT_NUM_CANDIDATES)?,
            stage: env_parse_or("VECTOR_SEARCH_STAGE", SearchStage::default())?,
            strip_embedding: env_parse_or("VECTOR_SEARCH_STRIP_EMBEDDING", true)?,
        };
        settings.validate()?;
        Ok(settings)
    }
}

/// A single k-NN lookup handed to the search gateway
#[derive(Debug, Clone, PartialEq)]
pub struct KnnQuery {
    pub index: String,
    pub path: String,
    pub vector: Vec<f64>,
    pub k: u32,
    pub num_candidates: u32,
    pub stage: SearchStage,
    pub strip_embedding: bool,
}
