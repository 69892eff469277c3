//! Crack monitoring backend: projects, cracks, and periodic readings over
//! REST, backed by PostgreSQL.

pub mod config;
pub mod error;
pub mod export;
pub mod handlers;
pub mod migration;
pub mod models;
pub mod routes;
pub mod sql;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::AppError;
pub use migration::apply_migrations;
pub use routes::{common_routes, common_routes_with_ready, entity_routes};
pub use state::AppState;
pub use store::{ensure_database_exists, CrackStore, ProjectStore, ReadingStore};
