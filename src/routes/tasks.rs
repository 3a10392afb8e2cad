use crate::handlers::tasks::{add, add_form, change_status, delete, list, sort_by_date, sort_by_priority};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn task_routes(state: AppState) -> Router {
    Router::new()
        .route("/task", get(list))
        .route("/task/actions/add", get(add_form).post(add))
        .route("/task/sort/priority", get(sort_by_priority))
        .route("/task/sort/date", get(sort_by_date))
        .route("/task/:id/actions/status", post(change_status))
        .route("/task/:id/actions/delete", post(delete))
        .with_state(state)
}
