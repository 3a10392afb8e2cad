//! HTTP handlers for the persons and tasks pages.

pub mod persons;
pub mod tasks;

use crate::error::AppError;
use axum::extract::rejection::FormRejection;
use axum::Form;
use std::collections::HashMap;

type FormBody = Result<Form<HashMap<String, String>>, FormRejection>;

/// Unreadable bodies become the same failure as any other bad submission.
fn form_body(body: FormBody) -> Result<HashMap<String, String>, AppError> {
    body.map(|Form(fields)| fields).map_err(|e| {
        tracing::debug!(error = %e, "form rejected");
        AppError::BadRequest("bad input format".into())
    })
}
