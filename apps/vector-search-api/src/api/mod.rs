//! API routes module

pub mod health;
pub mod search;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: &AppState) -> eyre::Result<Router> {
    Ok(Router::new()
        .merge(search::router(state)?)
        .merge(health::router(state.clone())))
}
