pub mod api;
mod middleware;
mod public;

pub use api::{ApiKey, ApiState, build_api_router as build_api_v1_router};
pub use public::build_public_router;

use axum::Router;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware as axum_middleware;
use axum::response::{IntoResponse, Response};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::application::error::ErrorReport;
use crate::application::players::PlayerServiceError;

use self::middleware::set_request_context;

fn db_health_response(result: Result<(), PlayerServiceError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

/// CORS policy for the configured origins; `*` allows any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    target = "chess_stats::http",
                    origin = %origin,
                    error = %err,
                    "Ignoring invalid CORS origin"
                );
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Full application router: public routes, the versioned API, CORS and request ids.
pub fn build_router(state: ApiState, cors_origins: &[String]) -> Router {
    build_public_router(state.clone())
        .merge(build_api_v1_router(state))
        .layer(cors_layer(cors_origins))
        .layer(axum_middleware::from_fn(set_request_context))
}
