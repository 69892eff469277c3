//! Request handlers, one module per entity plus the export endpoints.

pub mod cracks;
pub mod export;
pub mod projects;
pub mod readings;
