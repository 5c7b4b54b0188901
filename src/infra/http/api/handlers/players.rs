//! Player lookup and search handlers

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;

use crate::application::pagination::PageRequest;
use crate::application::repos::PlayerQueryFilter;
use crate::domain::types::{RatingFloor, Title};

use super::{
    domain_to_api, optional_federation, pagination_to_api, path_to_api, player_to_api,
    query_to_api,
};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{DataResponse, ListResponse, SearchQuery};
use crate::infra::http::api::state::ApiState;

pub async fn search_players(
    State(state): State<ApiState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(query_to_api)?;

    let filter = PlayerQueryFilter {
        name: query.name,
        federation: optional_federation(query.federation.as_deref())?,
        min_rating: query
            .min_rating
            .map(RatingFloor::new)
            .transpose()
            .map_err(domain_to_api)?,
        title: query
            .title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(Title::parse)
            .transpose()
            .map_err(domain_to_api)?,
    };
    let page = PageRequest::new(query.skip, query.limit).map_err(pagination_to_api)?;

    let players = state
        .players
        .search_players(&filter, page)
        .await
        .map_err(player_to_api)?;

    Ok(Json(ListResponse::success(players)))
}

pub async fn get_player(
    State(state): State<ApiState>,
    fide_id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(fide_id) = fide_id.map_err(path_to_api)?;

    let player = state
        .players
        .get_player(fide_id)
        .await
        .map_err(player_to_api)?;

    Ok(Json(DataResponse::success(player)))
}
