//! Crack accessors. The crack id is a scanned tag value supplied by the
//! caller, so creation is an atomic insert-if-absent: a second registration
//! of the same tag is a conflict, never an overwrite.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{Crack, CrackUpdate, NewCrack};
use crate::sql::update_statement;

pub struct CrackStore;

impl CrackStore {
    pub async fn list(pool: &PgPool) -> Result<Vec<Crack>, AppError> {
        let rows = sqlx::query_as::<_, Crack>("SELECT * FROM cracks ORDER BY name")
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_by_project(pool: &PgPool, project_id: i64) -> Result<Vec<Crack>, AppError> {
        let rows =
            sqlx::query_as::<_, Crack>("SELECT * FROM cracks WHERE project_id = $1 ORDER BY name")
                .bind(project_id)
                .fetch_all(pool)
                .await?;
        Ok(rows)
    }

    pub async fn get(pool: &PgPool, id: &str) -> Result<Option<Crack>, AppError> {
        let row = sqlx::query_as::<_, Crack>("SELECT * FROM cracks WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    /// Whether a tag id is already registered. The scan flow checks this to
    /// branch between the detail screen and the registration form.
    pub async fn exists(pool: &PgPool, id: &str) -> Result<bool, AppError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM cracks WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    /// Register a crack under its scanned id. `ON CONFLICT DO NOTHING` makes
    /// the existence check and the insert one statement; no returned row
    /// means the id was already taken.
    pub async fn create(pool: &PgPool, new: &NewCrack) -> Result<Crack, AppError> {
        tracing::debug!(id = %new.id, project_id = new.project_id, "registering crack");
        let row = sqlx::query_as::<_, Crack>(
            r#"
            INSERT INTO cracks (
                id, project_id, name, edificio_area, nivel_cota, muro, cara,
                gps_lat, gps_lon, elemento_tipo, elemento_material,
                elemento_espesor_cm, grieta_orientacion, grieta_longitud_visible_m,
                grieta_ancho_inicial_mm, grieta_clasificacion_preliminar,
                instrumentacion_modelo, instrumentacion_n_serie,
                instrumentacion_resolucion_mm, instrumentacion_eje_x,
                instrumentacion_eje_y, instrumentacion_lectura_cero,
                instrumentacion_adhesivo, instrumentacion_medida_a,
                instrumentacion_medida_b, instalacion_fecha, instalacion_hora,
                instalacion_instalador, instalacion_foto, instalacion_observaciones,
                umbral_verde_mm_sem, umbral_amarillo_mm_scm, umbral_rojo_mm_scm
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28,
                $29, $30, $31, $32, $33
            )
            ON CONFLICT (id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(&new.id)
        .bind(new.project_id)
        .bind(&new.name)
        .bind(&new.edificio_area)
        .bind(&new.nivel_cota)
        .bind(&new.muro)
        .bind(&new.cara)
        .bind(new.gps_lat)
        .bind(new.gps_lon)
        .bind(&new.elemento_tipo)
        .bind(&new.elemento_material)
        .bind(new.elemento_espesor_cm)
        .bind(&new.grieta_orientacion)
        .bind(new.grieta_longitud_visible_m)
        .bind(new.grieta_ancho_inicial_mm)
        .bind(&new.grieta_clasificacion_preliminar)
        .bind(&new.instrumentacion_modelo)
        .bind(&new.instrumentacion_n_serie)
        .bind(new.instrumentacion_resolucion_mm)
        .bind(new.instrumentacion_eje_x)
        .bind(new.instrumentacion_eje_y)
        .bind(new.instrumentacion_lectura_cero)
        .bind(&new.instrumentacion_adhesivo)
        .bind(new.instrumentacion_medida_a)
        .bind(new.instrumentacion_medida_b)
        .bind(&new.instalacion_fecha)
        .bind(&new.instalacion_hora)
        .bind(&new.instalacion_instalador)
        .bind(&new.instalacion_foto)
        .bind(&new.instalacion_observaciones)
        .bind(new.umbral_verde_mm_sem)
        .bind(new.umbral_amarillo_mm_scm)
        .bind(new.umbral_rojo_mm_scm)
        .fetch_optional(pool)
        .await?;
        row.ok_or_else(|| AppError::Conflict(format!("crack already registered: {}", new.id)))
    }

    pub async fn update(
        pool: &PgPool,
        id: &str,
        patch: &CrackUpdate,
    ) -> Result<Option<Crack>, AppError> {
        let assignments = patch.assignments();
        if assignments.is_empty() {
            return Err(AppError::Validation("no updatable fields provided".into()));
        }
        let q = update_statement("cracks", assignments, "id");
        tracing::debug!(sql = %q.sql, "query");
        let mut query = sqlx::query_as::<_, Crack>(&q.sql);
        for p in q.params {
            query = query.bind(p);
        }
        let row = query.bind(id).fetch_optional(pool).await?;
        Ok(row)
    }

    pub async fn delete(pool: &PgPool, id: &str) -> Result<(), AppError> {
        tracing::debug!(id, "deleting crack");
        sqlx::query("DELETE FROM cracks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
