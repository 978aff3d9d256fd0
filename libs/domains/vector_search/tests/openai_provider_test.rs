//! OpenAI provider tests against an in-process stand-in for the embeddings API

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    routing::post,
};
use domain_vector_search::*;
use serde_json::{Value, json};

#[derive(Debug, Clone)]
struct Captured {
    authorization: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct FakeProvider {
    status: StatusCode,
    body: String,
    delay: Duration,
    captured: Arc<Mutex<Vec<Captured>>>,
}

async fn embeddings(
    State(fake): State<FakeProvider>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    fake.captured.lock().unwrap().push(Captured {
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    tokio::time::sleep(fake.delay).await;
    (
        fake.status,
        [(header::CONTENT_TYPE, "application/json")],
        fake.body.clone(),
    )
}

/// Serve `body` with `status` on a random local port; returns the base URL
async fn spawn_provider(
    status: StatusCode,
    body: impl Into<String>,
    delay: Duration,
) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(vec![]));
    let fake = FakeProvider {
        status,
        body: body.into(),
        delay,
        captured: captured.clone(),
    };
    let app = Router::new()
        .route("/v1/embeddings", post(embeddings))
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v1", addr), captured)
}

fn provider(base_url: &str) -> OpenAIProvider {
    OpenAIProvider::new(OpenAIConfig::new("sk-test-key").with_base_url(base_url)).unwrap()
}

#[tokio::test]
async fn test_embed_sends_bearer_and_body() {
    let response = json!({
        "object": "list",
        "data": [ { "object": "embedding", "index": 0, "embedding": [0.5, -0.25, 0.125] } ],
        "model": "text-embedding-ada-002",
        "usage": { "prompt_tokens": 3, "total_tokens": 3 }
    });
    let (base_url, captured) =
        spawn_provider(StatusCode::OK, response.to_string(), Duration::ZERO).await;

    let result = provider(&base_url).embed("space cowboys").await.unwrap();

    assert_eq!(result.values, vec![0.5, -0.25, 0.125]);
    assert_eq!(result.tokens_used, 3);

    let captured = captured.lock().unwrap().clone();
    assert_eq!(captured.len(), 1);
    assert_eq!(
        captured[0].authorization.as_deref(),
        Some("Bearer sk-test-key")
    );
    assert_eq!(
        captured[0].body,
        json!({ "input": "space cowboys", "model": "text-embedding-ada-002" })
    );
}

#[tokio::test]
async fn test_embed_uses_configured_model() {
    let response = json!({ "data": [ { "index": 0, "embedding": [1.0] } ] });
    let (base_url, captured) =
        spawn_provider(StatusCode::OK, response.to_string(), Duration::ZERO).await;

    let config = OpenAIConfig::new("sk-test-key")
        .with_base_url(&base_url)
        .with_model(EmbeddingModel::TextEmbedding3Small);
    let provider = OpenAIProvider::new(config).unwrap();
    assert_eq!(provider.model(), EmbeddingModel::TextEmbedding3Small);

    provider.embed("heist").await.unwrap();

    let captured = captured.lock().unwrap().clone();
    assert_eq!(captured[0].body["model"], "text-embedding-3-small");
}

#[tokio::test]
async fn test_embed_returns_first_result_by_index() {
    let response = json!({
        "data": [
            { "index": 1, "embedding": [9.0, 9.0] },
            { "index": 0, "embedding": [1.0, 2.0] }
        ]
    });
    let (base_url, _) = spawn_provider(StatusCode::OK, response.to_string(), Duration::ZERO).await;

    let result = provider(&base_url).embed("heist").await.unwrap();

    assert_eq!(result.values, vec![1.0, 2.0]);
    assert_eq!(result.tokens_used, 0);
}

#[tokio::test]
async fn test_non_success_is_provider_error_with_status() {
    let response = json!({
        "error": {
            "message": "Incorrect API key provided: sk-test-key",
            "type": "invalid_request_error",
            "code": "invalid_api_key"
        }
    });
    let (base_url, _) = spawn_provider(
        StatusCode::UNAUTHORIZED,
        response.to_string(),
        Duration::ZERO,
    )
    .await;

    let err = provider(&base_url).embed("heist").await.unwrap_err();

    match err {
        SearchError::Provider { status, message } => {
            assert_eq!(status, 401);
            assert!(message.starts_with("Incorrect API key provided"));
        }
        other => panic!("expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_error_body_is_kept_verbatim() {
    let (base_url, _) = spawn_provider(
        StatusCode::SERVICE_UNAVAILABLE,
        "overloaded",
        Duration::ZERO,
    )
    .await;

    let err = provider(&base_url).embed("heist").await.unwrap_err();

    assert!(matches!(
        err,
        SearchError::Provider { status: 503, ref message } if message == "overloaded"
    ));
    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_empty_data_is_malformed() {
    let (base_url, _) =
        spawn_provider(StatusCode::OK, json!({ "data": [] }).to_string(), Duration::ZERO).await;

    let err = provider(&base_url).embed("heist").await.unwrap_err();

    assert!(matches!(err, SearchError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_undecodable_body_is_malformed() {
    let (base_url, _) = spawn_provider(StatusCode::OK, "<html>ok</html>", Duration::ZERO).await;

    let err = provider(&base_url).embed("heist").await.unwrap_err();

    assert!(matches!(err, SearchError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_unreachable_provider_is_transport_error() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = provider(&format!("http://{}/v1", addr))
        .embed("heist")
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::Transport(_)));
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let response = json!({ "data": [ { "index": 0, "embedding": [1.0] } ] });
    let (base_url, _) = spawn_provider(
        StatusCode::OK,
        response.to_string(),
        Duration::from_secs(5),
    )
    .await;

    let config = OpenAIConfig::new("sk-test-key")
        .with_base_url(&base_url)
        .with_timeout(Duration::from_millis(100));
    let err = OpenAIProvider::new(config)
        .unwrap()
        .embed("heist")
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::Transport(_)));
}

#[tokio::test]
async fn test_truncated_error_body_is_transport_error() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        // Drain the request so the client is waiting on the response
        let mut request = Vec::new();
        let mut chunk = [0u8; 4096];
        while !request.ends_with(b"}") {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
        }
        // Promise more body than is sent, then hang up
        socket
            .write_all(
                b"HTTP/1.1 500 Internal Server Error\r\n\
                  Content-Type: application/json\r\n\
                  Content-Length: 64\r\n\r\n\
                  {\"error\":",
            )
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let err = provider(&format!("http://{}/v1", addr))
        .embed("heist")
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::Transport(ref msg) if msg.contains("500")));
}
