use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use core_config::ConfigError;
use mongodb::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// The embedding provider answered with a non-success status
    #[error("Embedding provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    /// The provider answered 2xx but the payload was unusable
    #[error("Malformed embedding response: {0}")]
    MalformedResponse(String),

    /// Network-level failure reaching the provider or the database
    #[error("Transport error: {0}")]
    Transport(String),

    /// The aggregation itself failed
    #[error("Vector search query failed: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type SearchResult<T> = Result<T, SearchError>;

impl SearchError {
    /// True for failures caused by a dependency rather than the caller
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            SearchError::Provider { .. }
                | SearchError::MalformedResponse(_)
                | SearchError::Transport(_)
                | SearchError::Query(_)
        )
    }
}

impl From<mongodb::error::Error> for SearchError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Io(_)
            | ErrorKind::ServerSelection { .. }
            | ErrorKind::ConnectionPoolCleared { .. } => {
                SearchError::Transport(format!("MongoDB unreachable: {}", err))
            }
            _ => SearchError::Query(err.to_string()),
        }
    }
}

impl From<ConfigError> for SearchError {
    fn from(err: ConfigError) -> Self {
        SearchError::Config(err.to_string())
    }
}

/// Convert SearchError to AppError for standardized HTTP error responses
impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Config(msg) => {
                AppError::InternalServerError(format!("Config error: {}", msg))
            }
            upstream => AppError::BadGateway(upstream.to_string()),
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
