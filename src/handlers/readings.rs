//! Reading CRUD handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::{NewReading, ReadingUpdate};
use crate::state::AppState;
use crate::store::ReadingStore;

#[derive(Debug, Deserialize)]
pub struct ReadingListQuery {
    pub crack_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ReadingListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = match params.crack_id.as_deref() {
        Some(crack_id) => ReadingStore::list_by_crack(&state.pool, crack_id).await?,
        None => ReadingStore::list(&state.pool).await?,
    };
    Ok(Json(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewReading>,
) -> Result<impl IntoResponse, AppError> {
    let row = ReadingStore::create(&state.pool, &body).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let row = ReadingStore::get(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("reading not found: {}", id)))?;
    Ok(Json(row))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ReadingUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let row = ReadingStore::update(&state.pool, id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("reading not found: {}", id)))?;
    Ok(Json(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ReadingStore::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
