//! Project CRUD handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::error::AppError;
use crate::models::{NewProject, ProjectUpdate};
use crate::state::AppState;
use crate::store::ProjectStore;

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = ProjectStore::list(&state.pool).await?;
    Ok(Json(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewProject>,
) -> Result<impl IntoResponse, AppError> {
    let row = ProjectStore::create(&state.pool, &body).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let row = ProjectStore::get(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("project not found: {}", id)))?;
    Ok(Json(row))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ProjectUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let row = ProjectStore::update(&state.pool, id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("project not found: {}", id)))?;
    Ok(Json(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ProjectStore::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
