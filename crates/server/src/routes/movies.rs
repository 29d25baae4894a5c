use std::time::Instant;

use axum::{extract::{Path, State}, http::StatusCode, Json};
use service::catalog::{Catalog, MovieList, MovieRecord};

use crate::errors::JsonApiError;
use crate::observability::observe;
use crate::startup::ServerState;

/// All years and their movies
pub async fn get_all(State(state): State<ServerState>) -> Result<Json<Catalog>, JsonApiError> {
    let started = Instant::now();
    let res = state.catalog.get_all().await;
    observe("get_all", started, &res);
    Ok(Json(res?))
}

/// Movies of one year
pub async fn get_by_year(
    State(state): State<ServerState>,
    Path(year): Path<u32>,
) -> Result<Json<MovieList>, JsonApiError> {
    let started = Instant::now();
    let res = state.catalog.get_by_year(year).await;
    observe("get_by_year", started, &res);
    Ok(Json(res?))
}

/// Fetch a year that is not stored yet
pub async fn add_by_year(
    State(state): State<ServerState>,
    Path(year): Path<u32>,
) -> Result<(StatusCode, Json<MovieList>), JsonApiError> {
    let started = Instant::now();
    let res = state.catalog.add_by_year(year).await;
    observe("add_by_year", started, &res);
    Ok((StatusCode::CREATED, Json(res?)))
}

/// Re-fetch a year, replacing what is stored
pub async fn update_by_year(
    State(state): State<ServerState>,
    Path(year): Path<u32>,
) -> Result<Json<MovieList>, JsonApiError> {
    let started = Instant::now();
    let res = state.catalog.update_by_year(year).await;
    observe("update_by_year", started, &res);
    Ok(Json(res?))
}

/// Delete one movie by name (case-insensitive)
pub async fn delete_by_name(
    State(state): State<ServerState>,
    Path((year, name)): Path<(u32, String)>,
) -> Result<Json<MovieRecord>, JsonApiError> {
    let started = Instant::now();
    let res = state.catalog.delete_by_name(year, &name).await;
    observe("delete_by_name", started, &res);
    Ok(Json(res?))
}
