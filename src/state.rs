//! Shared application state for all routes. The pool is the only shared
//! handle; stores receive it explicitly so tests can construct their own.

use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}
