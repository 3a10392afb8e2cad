//! Shared application state for all routes.

use crate::store::Db;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
}
