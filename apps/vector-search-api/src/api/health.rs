//! Readiness endpoint backed by a MongoDB ping

use axum::{Router, extract::State, response::Response, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use database::mongodb::check_health_detailed;

use crate::state::AppState;

/// Create the readiness router; liveness comes from `axum_helpers::health_router`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .with_state(state)
}

/// Readiness check - verifies MongoDB answers a ping
async fn readiness_check(State(state): State<AppState>) -> Response {
    let mongodb: HealthCheckFuture = Box::pin(async {
        let status =
            check_health_detailed(&state.mongo_client, state.config.mongodb.database()).await;
        if status.healthy {
            Ok(())
        } else {
            Err(status
                .message
                .unwrap_or_else(|| "ping failed".to_string()))
        }
    });

    run_health_checks(vec![("mongodb", mongodb)]).await
}
