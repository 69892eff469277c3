//! Project accessors, one statement per operation.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{NewProject, Project, ProjectUpdate};
use crate::sql::update_statement;

pub struct ProjectStore;

impl ProjectStore {
    /// All projects, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Project>, AppError> {
        let rows = sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY id DESC")
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Project>, AppError> {
        let row = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    pub async fn create(pool: &PgPool, new: &NewProject) -> Result<Project, AppError> {
        tracing::debug!(name = %new.name, "creating project");
        let row = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(&new.name)
        .bind(&new.description)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    /// Update the fields present in the patch. Returns None when the project
    /// does not exist.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        patch: &ProjectUpdate,
    ) -> Result<Option<Project>, AppError> {
        let assignments = patch.assignments();
        if assignments.is_empty() {
            return Err(AppError::Validation("no updatable fields provided".into()));
        }
        let q = update_statement("projects", assignments, "id");
        tracing::debug!(sql = %q.sql, "query");
        let mut query = sqlx::query_as::<_, Project>(&q.sql);
        for p in q.params {
            query = query.bind(p);
        }
        let row = query.bind(id).fetch_optional(pool).await?;
        Ok(row)
    }

    /// Delete a project. Its cracks and their readings go with it via the
    /// schema's cascades.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<(), AppError> {
        tracing::debug!(id, "deleting project");
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
