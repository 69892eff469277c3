//! Typed row and payload models for the three entities. Every column the API
//! accepts is listed here; unknown JSON keys are rejected at deserialization
//! so request bodies can never steer the SQL column set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sql::BindValue;

/// Push `column = value` pairs for every field present in a patch.
macro_rules! collect_set {
    ($out:expr, $( $field:expr => $col:literal ),+ $(,)?) => {
        $(
            if let Some(v) = &$field {
                $out.push(($col, BindValue::from(v.clone())));
            }
        )+
    };
}

// --- projects ---

pub const PROJECT_COLUMNS: &[&str] = &["id", "name", "description", "created_at"];

/// A monitoring engagement grouping related cracks.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ProjectUpdate {
    pub fn assignments(&self) -> Vec<(&'static str, BindValue)> {
        let mut out = Vec::new();
        collect_set!(out,
            self.name => "name",
            self.description => "description",
        );
        out
    }
}

// --- cracks ---

pub const CRACK_COLUMNS: &[&str] = &[
    "id",
    "project_id",
    "name",
    "edificio_area",
    "nivel_cota",
    "muro",
    "cara",
    "gps_lat",
    "gps_lon",
    "elemento_tipo",
    "elemento_material",
    "elemento_espesor_cm",
    "grieta_orientacion",
    "grieta_longitud_visible_m",
    "grieta_ancho_inicial_mm",
    "grieta_clasificacion_preliminar",
    "instrumentacion_modelo",
    "instrumentacion_n_serie",
    "instrumentacion_resolucion_mm",
    "instrumentacion_eje_x",
    "instrumentacion_eje_y",
    "instrumentacion_lectura_cero",
    "instrumentacion_adhesivo",
    "instrumentacion_medida_a",
    "instrumentacion_medida_b",
    "instalacion_fecha",
    "instalacion_hora",
    "instalacion_instalador",
    "instalacion_foto",
    "instalacion_observaciones",
    "umbral_verde_mm_sem",
    "umbral_amarillo_mm_scm",
    "umbral_rojo_mm_scm",
    "created_at",
];

/// A tracked structural fissure. The id is the scanned tag value, supplied by
/// the field inspector, never generated here.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Crack {
    pub id: String,
    pub project_id: i64,
    pub name: String,
    pub edificio_area: Option<String>,
    pub nivel_cota: Option<String>,
    pub muro: Option<String>,
    pub cara: Option<String>,
    pub gps_lat: Option<f64>,
    pub gps_lon: Option<f64>,
    pub elemento_tipo: Option<String>,
    pub elemento_material: Option<String>,
    pub elemento_espesor_cm: Option<f64>,
    pub grieta_orientacion: Option<String>,
    pub grieta_longitud_visible_m: Option<f64>,
    pub grieta_ancho_inicial_mm: Option<f64>,
    pub grieta_clasificacion_preliminar: Option<String>,
    pub instrumentacion_modelo: Option<String>,
    pub instrumentacion_n_serie: Option<String>,
    pub instrumentacion_resolucion_mm: Option<f64>,
    pub instrumentacion_eje_x: Option<f64>,
    pub instrumentacion_eje_y: Option<f64>,
    pub instrumentacion_lectura_cero: Option<f64>,
    pub instrumentacion_adhesivo: Option<String>,
    pub instrumentacion_medida_a: Option<f64>,
    pub instrumentacion_medida_b: Option<f64>,
    pub instalacion_fecha: Option<String>,
    pub instalacion_hora: Option<String>,
    pub instalacion_instalador: Option<String>,
    pub instalacion_foto: Option<String>,
    pub instalacion_observaciones: Option<String>,
    pub umbral_verde_mm_sem: Option<f64>,
    pub umbral_amarillo_mm_scm: Option<f64>,
    pub umbral_rojo_mm_scm: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCrack {
    pub id: String,
    pub project_id: i64,
    pub name: String,
    #[serde(default)]
    pub edificio_area: Option<String>,
    #[serde(default)]
    pub nivel_cota: Option<String>,
    #[serde(default)]
    pub muro: Option<String>,
    #[serde(default)]
    pub cara: Option<String>,
    #[serde(default)]
    pub gps_lat: Option<f64>,
    #[serde(default)]
    pub gps_lon: Option<f64>,
    #[serde(default)]
    pub elemento_tipo: Option<String>,
    #[serde(default)]
    pub elemento_material: Option<String>,
    #[serde(default)]
    pub elemento_espesor_cm: Option<f64>,
    #[serde(default)]
    pub grieta_orientacion: Option<String>,
    #[serde(default)]
    pub grieta_longitud_visible_m: Option<f64>,
    #[serde(default)]
    pub grieta_ancho_inicial_mm: Option<f64>,
    #[serde(default)]
    pub grieta_clasificacion_preliminar: Option<String>,
    #[serde(default)]
    pub instrumentacion_modelo: Option<String>,
    #[serde(default)]
    pub instrumentacion_n_serie: Option<String>,
    #[serde(default)]
    pub instrumentacion_resolucion_mm: Option<f64>,
    #[serde(default)]
    pub instrumentacion_eje_x: Option<f64>,
    #[serde(default)]
    pub instrumentacion_eje_y: Option<f64>,
    #[serde(default)]
    pub instrumentacion_lectura_cero: Option<f64>,
    #[serde(default)]
    pub instrumentacion_adhesivo: Option<String>,
    #[serde(default)]
    pub instrumentacion_medida_a: Option<f64>,
    #[serde(default)]
    pub instrumentacion_medida_b: Option<f64>,
    #[serde(default)]
    pub instalacion_fecha: Option<String>,
    #[serde(default)]
    pub instalacion_hora: Option<String>,
    #[serde(default)]
    pub instalacion_instalador: Option<String>,
    #[serde(default)]
    pub instalacion_foto: Option<String>,
    #[serde(default)]
    pub instalacion_observaciones: Option<String>,
    #[serde(default)]
    pub umbral_verde_mm_sem: Option<f64>,
    #[serde(default)]
    pub umbral_amarillo_mm_scm: Option<f64>,
    #[serde(default)]
    pub umbral_rojo_mm_scm: Option<f64>,
}

/// Per-field crack edits. `id` and `project_id` are not updatable; a crack
/// stays with the project it was registered under.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrackUpdate {
    pub name: Option<String>,
    pub edificio_area: Option<String>,
    pub nivel_cota: Option<String>,
    pub muro: Option<String>,
    pub cara: Option<String>,
    pub gps_lat: Option<f64>,
    pub gps_lon: Option<f64>,
    pub elemento_tipo: Option<String>,
    pub elemento_material: Option<String>,
    pub elemento_espesor_cm: Option<f64>,
    pub grieta_orientacion: Option<String>,
    pub grieta_longitud_visible_m: Option<f64>,
    pub grieta_ancho_inicial_mm: Option<f64>,
    pub grieta_clasificacion_preliminar: Option<String>,
    pub instrumentacion_modelo: Option<String>,
    pub instrumentacion_n_serie: Option<String>,
    pub instrumentacion_resolucion_mm: Option<f64>,
    pub instrumentacion_eje_x: Option<f64>,
    pub instrumentacion_eje_y: Option<f64>,
    pub instrumentacion_lectura_cero: Option<f64>,
    pub instrumentacion_adhesivo: Option<String>,
    pub instrumentacion_medida_a: Option<f64>,
    pub instrumentacion_medida_b: Option<f64>,
    pub instalacion_fecha: Option<String>,
    pub instalacion_hora: Option<String>,
    pub instalacion_instalador: Option<String>,
    pub instalacion_foto: Option<String>,
    pub instalacion_observaciones: Option<String>,
    pub umbral_verde_mm_sem: Option<f64>,
    pub umbral_amarillo_mm_scm: Option<f64>,
    pub umbral_rojo_mm_scm: Option<f64>,
}

impl CrackUpdate {
    pub fn assignments(&self) -> Vec<(&'static str, BindValue)> {
        let mut out = Vec::new();
        collect_set!(out,
            self.name => "name",
            self.edificio_area => "edificio_area",
            self.nivel_cota => "nivel_cota",
            self.muro => "muro",
            self.cara => "cara",
            self.gps_lat => "gps_lat",
            self.gps_lon => "gps_lon",
            self.elemento_tipo => "elemento_tipo",
            self.elemento_material => "elemento_material",
            self.elemento_espesor_cm => "elemento_espesor_cm",
            self.grieta_orientacion => "grieta_orientacion",
            self.grieta_longitud_visible_m => "grieta_longitud_visible_m",
            self.grieta_ancho_inicial_mm => "grieta_ancho_inicial_mm",
            self.grieta_clasificacion_preliminar => "grieta_clasificacion_preliminar",
            self.instrumentacion_modelo => "instrumentacion_modelo",
            self.instrumentacion_n_serie => "instrumentacion_n_serie",
            self.instrumentacion_resolucion_mm => "instrumentacion_resolucion_mm",
            self.instrumentacion_eje_x => "instrumentacion_eje_x",
            self.instrumentacion_eje_y => "instrumentacion_eje_y",
            self.instrumentacion_lectura_cero => "instrumentacion_lectura_cero",
            self.instrumentacion_adhesivo => "instrumentacion_adhesivo",
            self.instrumentacion_medida_a => "instrumentacion_medida_a",
            self.instrumentacion_medida_b => "instrumentacion_medida_b",
            self.instalacion_fecha => "instalacion_fecha",
            self.instalacion_hora => "instalacion_hora",
            self.instalacion_instalador => "instalacion_instalador",
            self.instalacion_foto => "instalacion_foto",
            self.instalacion_observaciones => "instalacion_observaciones",
            self.umbral_verde_mm_sem => "umbral_verde_mm_sem",
            self.umbral_amarillo_mm_scm => "umbral_amarillo_mm_scm",
            self.umbral_rojo_mm_scm => "umbral_rojo_mm_scm",
        );
        out
    }
}

// --- readings ---

pub const READING_COLUMNS: &[&str] = &[
    "id",
    "crack_id",
    "fecha",
    "hora",
    "nombre_inspector",
    "lectura_x",
    "lectura_y",
    "medida_a",
    "medida_b",
    "ambiente_temperatura_c",
    "ambiente_hr_percent",
    "ambiente_clima",
    "operacion_equipo_en_servicio",
    "operacion_vibraciones",
    "integridad",
    "observaciones",
    "foto",
    "created_at",
];

/// One timestamped measurement event for a crack. The operational flags are
/// recorded as 0/1 integers, matching the field data sheets.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Reading {
    pub id: i64,
    pub crack_id: String,
    pub fecha: Option<String>,
    pub hora: Option<String>,
    pub nombre_inspector: Option<String>,
    pub lectura_x: Option<f64>,
    pub lectura_y: Option<f64>,
    pub medida_a: Option<f64>,
    pub medida_b: Option<f64>,
    pub ambiente_temperatura_c: Option<f64>,
    pub ambiente_hr_percent: Option<f64>,
    pub ambiente_clima: Option<String>,
    pub operacion_equipo_en_servicio: Option<i32>,
    pub operacion_vibraciones: Option<i32>,
    pub integridad: Option<String>,
    pub observaciones: Option<String>,
    pub foto: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewReading {
    pub crack_id: String,
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(default)]
    pub hora: Option<String>,
    #[serde(default)]
    pub nombre_inspector: Option<String>,
    #[serde(default)]
    pub lectura_x: Option<f64>,
    #[serde(default)]
    pub lectura_y: Option<f64>,
    #[serde(default)]
    pub medida_a: Option<f64>,
    #[serde(default)]
    pub medida_b: Option<f64>,
    #[serde(default)]
    pub ambiente_temperatura_c: Option<f64>,
    #[serde(default)]
    pub ambiente_hr_percent: Option<f64>,
    #[serde(default)]
    pub ambiente_clima: Option<String>,
    #[serde(default)]
    pub operacion_equipo_en_servicio: Option<i32>,
    #[serde(default)]
    pub operacion_vibraciones: Option<i32>,
    #[serde(default)]
    pub integridad: Option<String>,
    #[serde(default)]
    pub observaciones: Option<String>,
    #[serde(default)]
    pub foto: Option<String>,
}

/// Per-field reading edits. `crack_id` is not updatable; a measurement
/// belongs to the crack it was taken on.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadingUpdate {
    pub fecha: Option<String>,
    pub hora: Option<String>,
    pub nombre_inspector: Option<String>,
    pub lectura_x: Option<f64>,
    pub lectura_y: Option<f64>,
    pub medida_a: Option<f64>,
    pub medida_b: Option<f64>,
    pub ambiente_temperatura_c: Option<f64>,
    pub ambiente_hr_percent: Option<f64>,
    pub ambiente_clima: Option<String>,
    pub operacion_equipo_en_servicio: Option<i32>,
    pub operacion_vibraciones: Option<i32>,
    pub integridad: Option<String>,
    pub observaciones: Option<String>,
    pub foto: Option<String>,
}

impl ReadingUpdate {
    pub fn assignments(&self) -> Vec<(&'static str, BindValue)> {
        let mut out = Vec::new();
        collect_set!(out,
            self.fecha => "fecha",
            self.hora => "hora",
            self.nombre_inspector => "nombre_inspector",
            self.lectura_x => "lectura_x",
            self.lectura_y => "lectura_y",
            self.medida_a => "medida_a",
            self.medida_b => "medida_b",
            self.ambiente_temperatura_c => "ambiente_temperatura_c",
            self.ambiente_hr_percent => "ambiente_hr_percent",
            self.ambiente_clima => "ambiente_clima",
            self.operacion_equipo_en_servicio => "operacion_equipo_en_servicio",
            self.operacion_vibraciones => "operacion_vibraciones",
            self.integridad => "integridad",
            self.observaciones => "observaciones",
            self.foto => "foto",
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_crack_defaults_optional_fields() {
        let crack: NewCrack = serde_json::from_str(
            r#"{"id": "QR-001", "project_id": 1, "name": "Muro Norte"}"#,
        )
        .unwrap();
        assert_eq!(crack.id, "QR-001");
        assert_eq!(crack.project_id, 1);
        assert!(crack.edificio_area.is_none());
        assert!(crack.umbral_rojo_mm_scm.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = serde_json::from_str::<NewProject>(
            r#"{"name": "Edificio A", "descripcion": "typo"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("descripcion"));
    }

    #[test]
    fn crack_patch_ignores_absent_fields() {
        let patch: CrackUpdate =
            serde_json::from_str(r#"{"muro": "M-3", "gps_lat": -33.45}"#).unwrap();
        let assignments = patch.assignments();
        let columns: Vec<&str> = assignments.iter().map(|(c, _)| *c).collect();
        assert_eq!(columns, vec!["muro", "gps_lat"]);
    }

    #[test]
    fn reading_patch_cannot_move_between_cracks() {
        let err = serde_json::from_str::<ReadingUpdate>(r#"{"crack_id": "QR-002"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn column_lists_match_row_serialization() {
        let project = Project {
            id: 1,
            name: "Edificio A".into(),
            description: None,
            created_at: chrono::Utc::now(),
        };
        let value = serde_json::to_value(&project).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        for col in PROJECT_COLUMNS {
            assert!(keys.contains(col), "missing column {}", col);
        }
        assert_eq!(keys.len(), PROJECT_COLUMNS.len());
    }
}
