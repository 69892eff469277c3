//! Reading accessors. Readings accumulate per crack, one per inspection
//! visit, ordered most recent first.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{NewReading, Reading, ReadingUpdate};
use crate::sql::update_statement;

pub struct ReadingStore;

impl ReadingStore {
    pub async fn list(pool: &PgPool) -> Result<Vec<Reading>, AppError> {
        let rows = sqlx::query_as::<_, Reading>(
            "SELECT * FROM readings ORDER BY fecha DESC, hora DESC",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_by_crack(pool: &PgPool, crack_id: &str) -> Result<Vec<Reading>, AppError> {
        let rows = sqlx::query_as::<_, Reading>(
            "SELECT * FROM readings WHERE crack_id = $1 ORDER BY fecha DESC, hora DESC",
        )
        .bind(crack_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Reading>, AppError> {
        let row = sqlx::query_as::<_, Reading>("SELECT * FROM readings WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    pub async fn create(pool: &PgPool, new: &NewReading) -> Result<Reading, AppError> {
        tracing::debug!(crack_id = %new.crack_id, "recording reading");
        let row = sqlx::query_as::<_, Reading>(
            r#"
            INSERT INTO readings (
                crack_id, fecha, hora, nombre_inspector, lectura_x, lectura_y,
                medida_a, medida_b, ambiente_temperatura_c, ambiente_hr_percent,
                ambiente_clima, operacion_equipo_en_servicio, operacion_vibraciones,
                integridad, observaciones, foto
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16
            )
            RETURNING *
            "#,
        )
        .bind(&new.crack_id)
        .bind(&new.fecha)
        .bind(&new.hora)
        .bind(&new.nombre_inspector)
        .bind(new.lectura_x)
        .bind(new.lectura_y)
        .bind(new.medida_a)
        .bind(new.medida_b)
        .bind(new.ambiente_temperatura_c)
        .bind(new.ambiente_hr_percent)
        .bind(&new.ambiente_clima)
        .bind(new.operacion_equipo_en_servicio)
        .bind(new.operacion_vibraciones)
        .bind(&new.integridad)
        .bind(&new.observaciones)
        .bind(&new.foto)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    pub async fn update(
        pool: &PgPool,
        id: i64,
        patch: &ReadingUpdate,
    ) -> Result<Option<Reading>, AppError> {
        let assignments = patch.assignments();
        if assignments.is_empty() {
            return Err(AppError::Validation("no updatable fields provided".into()));
        }
        let q = update_statement("readings", assignments, "id");
        tracing::debug!(sql = %q.sql, "query");
        let mut query = sqlx::query_as::<_, Reading>(&q.sql);
        for p in q.params {
            query = query.bind(p);
        }
        let row = query.bind(id).fetch_optional(pool).await?;
        Ok(row)
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<(), AppError> {
        tracing::debug!(id, "deleting reading");
        sqlx::query("DELETE FROM readings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
