//! Typed errors and HTML mapping.

use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("invalid identifier: '{0}'")]
    InvalidIdentifier(String),
    #[error("invalid primary key: table {table} column {column}")]
    InvalidPrimaryKey { table: String, column: String },
    #[error("duplicate column: table {table} column {column}")]
    DuplicateColumn { table: String, column: String },
    #[error("duplicate join: {0}")]
    DuplicateJoin(String),
    #[error("{kind} column '{column}' not declared on table {table}")]
    MissingColumn {
        kind: &'static str,
        table: String,
        column: String,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error("config: {0}")]
    Config(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unknown column '{column}' on table {table}")]
    UnknownColumn { table: String, column: String },
    #[error("{message}\n Create with: {suggestion}")]
    MissingTable { message: String, suggestion: String },
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("row shape: {0}")]
    RowShape(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::NotFound(_) | AppError::BadRequest(_) => tracing::warn!(error = %self, "request failed"),
            _ => tracing::error!(error = %self, "request failed"),
        }
        // Served as 200: htmx only swaps successful responses into the page.
        Html(crate::views::error::page(&self)).into_response()
    }
}
