//! Parameterized UPDATE statements built from typed field allow-lists.
//! Column names only ever come from the `&'static str` lists in `models`,
//! never from request input.

use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

/// A value bound into a partial-update statement.
#[derive(Clone, Debug)]
pub enum BindValue {
    Text(String),
    F64(f64),
    I64(i64),
    I32(i32),
}

impl From<String> for BindValue {
    fn from(v: String) -> Self {
        BindValue::Text(v)
    }
}

impl From<f64> for BindValue {
    fn from(v: f64) -> Self {
        BindValue::F64(v)
    }
}

impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        BindValue::I64(v)
    }
}

impl From<i32> for BindValue {
    fn from(v: i32) -> Self {
        BindValue::I32(v)
    }
}

impl<'q> Encode<'q, Postgres> for BindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            BindValue::Text(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s_ref, buf)
            }
            BindValue::F64(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf),
            BindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf),
            BindValue::I32(n) => <i32 as Encode<Postgres>>::encode_by_ref(n, buf),
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            BindValue::Text(_) => PgTypeInfo::with_name("TEXT"),
            BindValue::F64(_) => PgTypeInfo::with_name("FLOAT8"),
            BindValue::I64(_) => PgTypeInfo::with_name("INT8"),
            BindValue::I32(_) => PgTypeInfo::with_name("INT4"),
        })
    }
}

impl sqlx::Type<Postgres> for BindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

/// Build `UPDATE <table> SET .. WHERE <pk> = $n RETURNING *` from the fields
/// present in a patch. The caller binds the params in order, then the key.
pub fn update_statement(
    table: &str,
    assignments: Vec<(&'static str, BindValue)>,
    pk_column: &str,
) -> QueryBuf {
    let mut params = Vec::with_capacity(assignments.len());
    let mut sets = Vec::with_capacity(assignments.len());
    for (column, value) in assignments {
        params.push(value);
        sets.push(format!("{} = ${}", column, params.len()));
    }
    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING *",
        table,
        sets.join(", "),
        pk_column,
        params.len() + 1
    );
    QueryBuf { sql, params }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_statement_numbers_placeholders_in_order() {
        let q = update_statement(
            "cracks",
            vec![
                ("name", BindValue::Text("Muro Norte".into())),
                ("umbral_rojo_mm_scm", BindValue::F64(2.5)),
            ],
            "id",
        );
        assert_eq!(
            q.sql,
            "UPDATE cracks SET name = $1, umbral_rojo_mm_scm = $2 WHERE id = $3 RETURNING *"
        );
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn single_assignment_keys_on_second_placeholder() {
        let q = update_statement(
            "projects",
            vec![("description", BindValue::Text("torre sur".into()))],
            "id",
        );
        assert_eq!(
            q.sql,
            "UPDATE projects SET description = $1 WHERE id = $2 RETURNING *"
        );
    }
}
