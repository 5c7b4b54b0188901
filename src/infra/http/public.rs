use axum::{
    Json, Router,
    extract::State,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};

use super::{api::ApiState, api::models::WelcomeResponse, db_health_response, middleware::log_responses};

const WELCOME_MESSAGE: &str = "Welcome to the Chess Stats API";

/// Unauthenticated routes outside the `/api/v1` prefix.
pub fn build_public_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
}

async fn index() -> impl IntoResponse {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE,
    })
}

async fn health(State(state): State<ApiState>) -> Response {
    db_health_response(state.players.health_check().await)
}
