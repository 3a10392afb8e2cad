use crate::handlers::persons::{add, add_form, list, validate_email};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn person_routes(state: AppState) -> Router {
    Router::new()
        .route("/persons", get(list))
        .route("/persons/actions/add", get(add_form).post(add))
        .route("/persons/:id/actions/validate-email", post(validate_email))
        .with_state(state)
}
