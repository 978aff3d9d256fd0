use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse_opt, env_parse_or, env_required};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use super::EmbeddingProvider;
use crate::error::{SearchError, SearchResult};
use crate::models::{EmbeddingModel, EmbeddingResult};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI embedding provider configuration
#[derive(Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: EmbeddingModel,
    /// Whole-request timeout; `None` leaves the call unbounded
    pub timeout: Option<Duration>,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: EmbeddingModel::default(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: EmbeddingModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl FromEnv for OpenAIConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = env_required("OPENAI_API_KEY")?;
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()));
        }

        Ok(Self {
            api_key,
            base_url: env_or_default("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            model: env_parse_or("OPENAI_EMBEDDING_MODEL", EmbeddingModel::default())?,
            timeout: env_parse_opt::<u64>("OPENAI_TIMEOUT_SECS")?.map(Duration::from_secs),
        })
    }
}

/// OpenAI embeddings provider
///
/// Holds one `reqwest::Client` so connections are pooled across requests.
#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> SearchResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SearchError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: Option<EmbeddingUsage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f64>,
    #[serde(default)]
    index: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingUsage {
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Prefer the provider's `error.message`, fall back to the raw body
fn provider_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn model(&self) -> EmbeddingModel {
        self.config.model
    }

    #[instrument(skip(self, text), fields(model = %self.config.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> SearchResult<EmbeddingResult> {
        let request = EmbeddingRequest {
            input: text,
            model: self.config.model.model_name(),
        };

        let response = self
            .client
            .post(self.config.embeddings_url())
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| SearchError::Transport(format!("Embedding request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(|e| {
                SearchError::Transport(format!(
                    "Failed to read embedding error response ({}): {}",
                    status, e
                ))
            })?;
            return Err(SearchError::Provider {
                status: status.as_u16(),
                message: provider_message(status, &body),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SearchError::Transport(format!("Failed to read embedding response: {}", e)))?;
        let embedding_response: EmbeddingResponse = serde_json::from_slice(&body)
            .map_err(|e| SearchError::MalformedResponse(e.to_string()))?;

        let tokens_used = embedding_response
            .usage
            .map(|usage| usage.total_tokens)
            .unwrap_or_default();

        let first = embedding_response
            .data
            .into_iter()
            .min_by_key(|d| d.index)
            .ok_or_else(|| SearchError::MalformedResponse("No embedding returned".to_string()))?;

        if first.embedding.is_empty() {
            return Err(SearchError::MalformedResponse(
                "Embedding vector is empty".to_string(),
            ));
        }

        debug!(dimension = first.embedding.len(), tokens_used, "Embedding received");
        trace!(values = ?first.embedding, "Embedding values");

        Ok(EmbeddingResult {
            values: first.embedding,
            tokens_used,
        })
    }
}
