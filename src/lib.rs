//! Taskboard: server-rendered persons and tasks pages over SQLite, built on a
//! declarative table definition, a generic table accessor and a query builder.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod schema;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;
pub mod views;

pub use error::{AppError, DefinitionError};
pub use model::{Person, Task};
pub use routes::{app, common_routes, person_routes, task_routes};
pub use schema::{ColumnType, JoinSpec, TableDefinition};
pub use service::{Record, Select, Table};
pub use settings::Settings;
pub use sql::{Direction, Operator, SqlValue};
pub use state::AppState;
pub use store::{apply_schema, connect, Db};
