pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::{ApiKey, ApiState};

use axum::{Router, middleware as axum_middleware, routing::get};

use crate::infra::http::middleware::log_responses;

pub fn build_api_router(state: ApiState) -> Router {
    let auth_state = state.clone();

    Router::new()
        .route("/api/v1/search", get(handlers::search_players))
        .route("/api/v1/player/{fide_id}", get(handlers::get_player))
        .route(
            "/api/v1/federation/{code}/top",
            get(handlers::top_players),
        )
        .route(
            "/api/v1/federation/{code}/stats",
            get(handlers::federation_stats),
        )
        .route(
            "/api/v1/rating-distribution",
            get(handlers::rating_distribution),
        )
        .route(
            "/api/v1/titled-players/stats",
            get(handlers::titled_players),
        )
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            auth_state,
            middleware::api_auth,
        ))
        .layer(axum_middleware::from_fn(log_responses))
}
