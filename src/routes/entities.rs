//! Entity CRUD and export routes, one route per entity per operation. The
//! static `/export` segments are registered alongside the `/:id` captures;
//! the router prefers the static match.

use axum::{routing::get, Router};

use crate::handlers::{cracks, export, projects, readings};
use crate::state::AppState;

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/projects", get(projects::list).post(projects::create))
        .route("/projects/export", get(export::projects_csv))
        .route(
            "/projects/:id",
            get(projects::read)
                .put(projects::update)
                .delete(projects::delete),
        )
        .route("/cracks", get(cracks::list).post(cracks::create))
        .route("/cracks/export", get(export::cracks_csv))
        .route(
            "/cracks/:id",
            get(cracks::read).put(cracks::update).delete(cracks::delete),
        )
        .route("/cracks/:id/exists", get(cracks::exists))
        .route("/readings", get(readings::list).post(readings::create))
        .route("/readings/export", get(export::readings_csv))
        .route(
            "/readings/:id",
            get(readings::read)
                .put(readings::update)
                .delete(readings::delete),
        )
        .route("/export/complete", get(export::complete_workbook))
        .with_state(state)
}
