//! Crack CRUD handlers. The scan flow hits `exists` (or `read`) first and
//! only posts a new registration when the tag id is unknown; a duplicate
//! post is answered with 409 rather than an insert attempt.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{CrackUpdate, NewCrack};
use crate::state::AppState;
use crate::store::CrackStore;

#[derive(Debug, Deserialize)]
pub struct CrackListQuery {
    pub project_id: Option<i64>,
}

#[derive(Serialize)]
struct ExistsBody {
    exists: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CrackListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = match params.project_id {
        Some(project_id) => CrackStore::list_by_project(&state.pool, project_id).await?,
        None => CrackStore::list(&state.pool).await?,
    };
    Ok(Json(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewCrack>,
) -> Result<impl IntoResponse, AppError> {
    let row = CrackStore::create(&state.pool, &body).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let row = CrackStore::get(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("crack not found: {}", id)))?;
    Ok(Json(row))
}

pub async fn exists(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let exists = CrackStore::exists(&state.pool, &id).await?;
    Ok(Json(ExistsBody { exists }))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CrackUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let row = CrackStore::update(&state.pool, &id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("crack not found: {}", id)))?;
    Ok(Json(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    CrackStore::delete(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
