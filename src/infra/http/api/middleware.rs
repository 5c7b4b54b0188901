use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::ApiError;
use super::state::ApiState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests without the configured API key. A no-op when no key is set.
pub async fn api_auth(State(state): State<ApiState>, request: Request<Body>, next: Next) -> Response {
    let Some(expected) = state.api_key.as_ref() else {
        return next.run(request).await;
    };

    let authorized = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|candidate| expected.matches(candidate));

    if !authorized {
        return ApiError::unauthorized().into_response();
    }

    next.run(request).await
}
