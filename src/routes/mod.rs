mod common;
mod entities;

pub use common::{common_routes, common_routes_with_ready};
pub use entities::entity_routes;
