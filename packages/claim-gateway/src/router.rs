//! HTTP router setup.

use crate::handlers;
use crate::middleware::{api_key_auth, inject_request_id};
use crate::sdk::ClaimSdk;
use crate::state::AppState;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create<S: ClaimSdk>(state: Arc<AppState<S>>) -> Router {
    let protected = Router::new()
        .route("/claim", post(handlers::claim::<S>))
        .route_layer(middleware::from_fn(api_key_auth));

    Router::new()
        .route("/health", get(handlers::health::<S>))
        .route("/ready", get(handlers::ready::<S>))
        .route("/metrics", get(handlers::metrics::<S>))
        .route("/phase", get(handlers::phase::<S>))
        .route("/eligibility/{wallet}", get(handlers::eligibility::<S>))
        .route("/eligibility/{wallet}/refetch", post(handlers::refetch::<S>))
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}
