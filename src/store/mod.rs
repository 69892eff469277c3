//! Entity stores and database bootstrap. Each store is a unit struct whose
//! operations take the pool explicitly and execute exactly one SQL statement.

use std::str::FromStr;

use sqlx::ConnectOptions;

use crate::error::AppError;

mod cracks;
mod projects;
mod readings;

pub use cracks::CrackStore;
pub use projects::ProjectStore;
pub use readings::ReadingStore;

/// Create the target database if it does not exist, connecting to the
/// server's `postgres` maintenance database. No-op for the default database.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await
            .map_err(AppError::Db)?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_db_name_and_admin_url() {
        let (admin, name) =
            parse_db_name_from_url("postgres://user:pw@localhost:5432/grietas").unwrap();
        assert_eq!(admin, "postgres://user:pw@localhost:5432/postgres");
        assert_eq!(name, "grietas");
    }

    #[test]
    fn strips_query_params_from_db_name() {
        let (_, name) =
            parse_db_name_from_url("postgres://localhost/grietas?sslmode=disable").unwrap();
        assert_eq!(name, "grietas");
    }
}
