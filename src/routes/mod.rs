//! Router assembly.

pub mod common;
pub mod persons;
pub mod tasks;

pub use common::common_routes;
pub use persons::person_routes;
pub use tasks::task_routes;

use crate::state::AppState;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Form posts are small; anything larger is rejected before reaching a handler.
pub const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Every route of the application with tracing and body limits applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(person_routes(state.clone()))
        .merge(task_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES)),
        )
}
