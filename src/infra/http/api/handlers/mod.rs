//! API handlers organized by resource type.
//!
//! Error conversions shared by the resource modules live here.

mod players;
mod stats;

pub use players::*;
pub use stats::*;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::StatusCode;

use crate::application::pagination::PaginationError;
use crate::application::players::PlayerServiceError;
use crate::application::repos::RepoError;
use crate::application::stats::StatsError;
use crate::domain::error::DomainError;
use crate::domain::types::FederationCode;

use super::error::{ApiError, codes};

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::NotFound => ApiError::not_found("resource not found"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Unavailable(message) => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_UNAVAILABLE,
            "Database unavailable",
            Some(message),
        ),
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(constraint),
        ),
        RepoError::Persistence(message) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(message),
        ),
    }
}

pub(crate) fn stats_to_api(err: StatsError) -> ApiError {
    match err {
        StatsError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn player_to_api(err: PlayerServiceError) -> ApiError {
    match err {
        PlayerServiceError::NotFound(_) => ApiError::not_found("player not found"),
        PlayerServiceError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn domain_to_api(err: DomainError) -> ApiError {
    ApiError::invalid_input("Invalid parameter", err.to_string())
}

pub(crate) fn pagination_to_api(err: PaginationError) -> ApiError {
    ApiError::invalid_input("Invalid pagination", err.to_string())
}

pub(crate) fn query_to_api(err: QueryRejection) -> ApiError {
    ApiError::bad_request("Invalid query string", Some(err.body_text()))
}

pub(crate) fn path_to_api(err: PathRejection) -> ApiError {
    ApiError::bad_request("Invalid path parameter", Some(err.body_text()))
}

/// Parse an optional federation query value; blank means "not given".
pub(crate) fn optional_federation(raw: Option<&str>) -> Result<Option<FederationCode>, ApiError> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(FederationCode::parse)
        .transpose()
        .map_err(domain_to_api)
}
