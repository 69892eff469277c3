//! Runtime configuration from environment variables. Call `dotenvy::dotenv()`
//! before `Config::from_env` if `.env` support is wanted.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Listen address, built from `PORT` (default 3000).
    pub bind_addr: String,
    /// Maximum number of pooled database connections.
    pub db_pool_max: u32,
}

impl Config {
    pub fn from_env() -> Config {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/grietas".into());
        let port = port_from(env::var("PORT").ok().as_deref());
        let db_pool_max = env::var("DB_POOL_MAX")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        Config {
            database_url,
            bind_addr: format!("0.0.0.0:{}", port),
            db_pool_max,
        }
    }
}

fn port_from(value: Option<&str>) -> u16 {
    value.and_then(|v| v.parse().ok()).unwrap_or(3000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_to_3000() {
        assert_eq!(port_from(None), 3000);
        assert_eq!(port_from(Some("not a port")), 3000);
    }

    #[test]
    fn port_parses_when_valid() {
        assert_eq!(port_from(Some("8080")), 8080);
    }
}
