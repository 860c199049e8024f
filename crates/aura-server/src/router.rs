use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all Aura endpoints. Write endpoints sit behind
/// the configured auth provider.
pub fn build_router(state: AppState) -> Router {
    let auth = middleware::from_fn_with_state(state.clone(), handler::require_auth);

    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route(
            "/v1/ingest",
            post(handler::ingest_handler).route_layer(auth.clone()),
        )
        .route(
            "/v1/entries",
            get(handler::list_handler)
                .merge(post(handler::append_handler).route_layer(auth)),
        )
        .route("/v1/entries/subject/:subject_id", get(handler::subject_handler))
        .route("/v1/entries/search", get(handler::search_handler))
        .route("/v1/records", get(handler::records_handler))
        .route("/v1/stats", get(handler::stats_handler))
        .route("/v1/verify", get(handler::verify_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
