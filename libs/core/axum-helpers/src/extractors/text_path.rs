//! Single string path parameter extractor with JSON rejections.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

/// Extractor for one percent-decoded string path parameter.
///
/// Unlike a bare `Path<String>`, a segment that does not decode to UTF-8 is
/// rejected as a `400` [`ErrorResponse`](crate::ErrorResponse) instead of
/// axum's plain-text body.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::get;
/// use axum_helpers::extractors::TextPath;
///
/// async fn echo(TextPath(text): TextPath) -> String {
///     text
/// }
///
/// let app = Router::new().route("/echo/{text}", get(echo));
/// ```
pub struct TextPath(pub String);

impl<S> FromRequestParts<S> for TextPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        Ok(TextPath(value))
    }
}
