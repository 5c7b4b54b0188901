//! Aggregate statistics handlers

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;

use crate::domain::types::{FederationCode, TopLimit};

use super::{domain_to_api, optional_federation, path_to_api, query_to_api, stats_to_api};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{DataResponse, RatingDistributionQuery, TopPlayersQuery};
use crate::infra::http::api::state::ApiState;

fn federation_from_path(
    code: Result<Path<String>, PathRejection>,
) -> Result<FederationCode, ApiError> {
    let Path(code) = code.map_err(path_to_api)?;
    FederationCode::parse(&code).map_err(domain_to_api)
}

pub async fn top_players(
    State(state): State<ApiState>,
    code: Result<Path<String>, PathRejection>,
    query: Result<Query<TopPlayersQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let federation = federation_from_path(code)?;
    let Query(query) = query.map_err(query_to_api)?;
    let limit = TopLimit::from_optional(query.limit).map_err(domain_to_api)?;

    let top = state
        .stats
        .top_players(federation, limit)
        .await
        .map_err(stats_to_api)?;

    Ok(Json(DataResponse::success(top)))
}

pub async fn federation_stats(
    State(state): State<ApiState>,
    code: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let federation = federation_from_path(code)?;

    let stats = state
        .stats
        .federation_stats(federation)
        .await
        .map_err(stats_to_api)?;

    Ok(Json(DataResponse::success(stats)))
}

pub async fn rating_distribution(
    State(state): State<ApiState>,
    query: Result<Query<RatingDistributionQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(query_to_api)?;
    let federation = optional_federation(query.federation.as_deref())?;

    let distribution = state
        .stats
        .rating_distribution(federation)
        .await
        .map_err(stats_to_api)?;

    Ok(Json(DataResponse::success(distribution)))
}

pub async fn titled_players(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let table = state.stats.titled_players().await.map_err(stats_to_api)?;
    Ok(Json(DataResponse::success(table)))
}
