//! Export endpoints: one CSV per entity and the complete workbook. Each
//! loads its full table(s) into memory before serializing.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::export::{build_workbook, to_csv, Sheet};
use crate::models::{CRACK_COLUMNS, PROJECT_COLUMNS, READING_COLUMNS};
use crate::state::AppState;
use crate::store::{CrackStore, ProjectStore, ReadingStore};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn to_values<T: Serialize>(rows: &[T]) -> Result<Vec<Value>, AppError> {
    rows.iter()
        .map(|r| serde_json::to_value(r).map_err(|e| AppError::Export(e.to_string())))
        .collect()
}

fn csv_response(filename: &str, csv: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", filename),
            ),
        ],
        csv,
    )
}

pub async fn projects_csv(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = to_values(&ProjectStore::list(&state.pool).await?)?;
    Ok(csv_response(
        "proyectos_registrados.csv",
        to_csv(PROJECT_COLUMNS, &rows),
    ))
}

pub async fn cracks_csv(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = to_values(&CrackStore::list(&state.pool).await?)?;
    Ok(csv_response(
        "cracks_registrados.csv",
        to_csv(CRACK_COLUMNS, &rows),
    ))
}

pub async fn readings_csv(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = to_values(&ReadingStore::list(&state.pool).await?)?;
    Ok(csv_response(
        "readings_registrados.csv",
        to_csv(READING_COLUMNS, &rows),
    ))
}

/// GET /export/complete: all three tables as one workbook, a sheet each.
pub async fn complete_workbook(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let projects = to_values(&ProjectStore::list(&state.pool).await?)?;
    let cracks = to_values(&CrackStore::list(&state.pool).await?)?;
    let readings = to_values(&ReadingStore::list(&state.pool).await?)?;

    let sheets = [
        Sheet { name: "Proyectos", columns: PROJECT_COLUMNS, rows: &projects },
        Sheet { name: "Grietas", columns: CRACK_COLUMNS, rows: &cracks },
        Sheet { name: "Registros", columns: READING_COLUMNS, rows: &readings },
    ];
    let bytes = build_workbook(&sheets)?;

    let filename = format!(
        "datos_completos_{}.xlsx",
        chrono::Utc::now().format("%Y-%m-%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    ))
}
