//! Versioned schema migrations, applied once at startup. Each migration runs
//! in its own transaction and is recorded in `schema_migrations`, so a
//! restart never re-runs DDL and a new revision is a new entry here, not an
//! ad hoc ALTER at a call site.

use sqlx::PgPool;

use crate::error::AppError;

struct Migration {
    version: i64,
    label: &'static str,
    statements: &'static [&'static str],
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        label: "base schema",
        statements: &[
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id          BIGSERIAL PRIMARY KEY,
                name        TEXT NOT NULL,
                description TEXT,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS cracks (
                id                              TEXT PRIMARY KEY,
                project_id                      BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                name                            TEXT NOT NULL,
                edificio_area                   TEXT,
                nivel_cota                      TEXT,
                muro                            TEXT,
                cara                            TEXT,
                gps_lat                         DOUBLE PRECISION,
                gps_lon                         DOUBLE PRECISION,
                elemento_tipo                   TEXT,
                elemento_material               TEXT,
                elemento_espesor_cm             DOUBLE PRECISION,
                grieta_orientacion              TEXT,
                grieta_longitud_visible_m       DOUBLE PRECISION,
                grieta_ancho_inicial_mm         DOUBLE PRECISION,
                grieta_clasificacion_preliminar TEXT,
                instrumentacion_modelo          TEXT,
                instrumentacion_n_serie         TEXT,
                instrumentacion_resolucion_mm   DOUBLE PRECISION,
                instrumentacion_eje_x           DOUBLE PRECISION,
                instrumentacion_eje_y           DOUBLE PRECISION,
                instrumentacion_lectura_cero    DOUBLE PRECISION,
                instrumentacion_adhesivo        TEXT,
                instalacion_fecha               TEXT,
                instalacion_hora                TEXT,
                instalacion_instalador          TEXT,
                instalacion_foto                TEXT,
                instalacion_observaciones       TEXT,
                umbral_verde_mm_sem             DOUBLE PRECISION,
                umbral_amarillo_mm_scm          DOUBLE PRECISION,
                umbral_rojo_mm_scm              DOUBLE PRECISION,
                created_at                      TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS readings (
                id                           BIGSERIAL PRIMARY KEY,
                crack_id                     TEXT NOT NULL REFERENCES cracks(id) ON DELETE CASCADE,
                fecha                        TEXT,
                hora                         TEXT,
                nombre_inspector             TEXT,
                lectura_x                    DOUBLE PRECISION,
                lectura_y                    DOUBLE PRECISION,
                ambiente_temperatura_c       DOUBLE PRECISION,
                ambiente_hr_percent          DOUBLE PRECISION,
                ambiente_clima               TEXT,
                operacion_equipo_en_servicio INTEGER,
                operacion_vibraciones        INTEGER,
                integridad                   TEXT,
                observaciones                TEXT,
                created_at                   TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_cracks_project_id ON cracks (project_id)",
            "CREATE INDEX IF NOT EXISTS idx_readings_crack_id ON readings (crack_id)",
        ],
    },
    // Second field-app revision: extra caliper measurements on both entities
    // and a photo path per reading.
    Migration {
        version: 2,
        label: "field measurements and reading photos",
        statements: &[
            "ALTER TABLE cracks ADD COLUMN IF NOT EXISTS instrumentacion_medida_a DOUBLE PRECISION",
            "ALTER TABLE cracks ADD COLUMN IF NOT EXISTS instrumentacion_medida_b DOUBLE PRECISION",
            "ALTER TABLE readings ADD COLUMN IF NOT EXISTS medida_a DOUBLE PRECISION",
            "ALTER TABLE readings ADD COLUMN IF NOT EXISTS medida_b DOUBLE PRECISION",
            "ALTER TABLE readings ADD COLUMN IF NOT EXISTS foto TEXT",
        ],
    },
];

/// Apply all pending migrations. Safe to call on every startup.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version    BIGINT PRIMARY KEY,
            label      TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    for m in MIGRATIONS {
        let (applied,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE version = $1)")
                .bind(m.version)
                .fetch_one(pool)
                .await?;
        if applied {
            continue;
        }

        let mut tx = pool.begin().await?;
        for stmt in m.statements {
            sqlx::query(stmt).execute(&mut *tx).await?;
        }
        sqlx::query("INSERT INTO schema_migrations (version, label) VALUES ($1, $2)")
            .bind(m.version)
            .bind(m.label)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(version = m.version, label = m.label, "applied migration");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_strictly_increasing() {
        for pair in MIGRATIONS.windows(2) {
            assert!(pair[0].version < pair[1].version);
        }
    }

    #[test]
    fn every_migration_has_statements() {
        for m in MIGRATIONS {
            assert!(!m.statements.is_empty(), "migration {} is empty", m.version);
        }
    }

    #[test]
    fn cascade_is_declared_on_both_foreign_keys() {
        let cracks_ddl = MIGRATIONS[0].statements[1];
        let readings_ddl = MIGRATIONS[0].statements[2];
        assert!(cracks_ddl.contains("REFERENCES projects(id) ON DELETE CASCADE"));
        assert!(readings_ddl.contains("REFERENCES cracks(id) ON DELETE CASCADE"));
    }
}
