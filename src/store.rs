//! Database handle: SQLite pool plus the schema every statement is qualified with.

use crate::error::AppError;
use crate::settings::Settings;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Bundled schema file; `{schema}` is replaced by the quoted schema name.
pub const SCHEMA_SQL: &str = include_str!("../schema.sql");

#[derive(Clone, Debug)]
pub struct Db {
    pub pool: SqlitePool,
    pub schema: String,
}

impl Db {
    pub fn new(pool: SqlitePool, schema: impl Into<String>) -> Self {
        Db {
            pool,
            schema: schema.into(),
        }
    }
}

fn quote_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// ATTACH statement for a non-default schema: `<schema>.sqlite` next to the main database file.
fn attach_statement(database_url: &str, schema: &str) -> Option<String> {
    if schema == "main" {
        return None;
    }
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or("");
    let file = if path.is_empty() || path.contains(":memory:") {
        ":memory:".to_string()
    } else {
        Path::new(path)
            .with_file_name(format!("{}.sqlite", schema))
            .to_string_lossy()
            .into_owned()
    };
    Some(format!(
        "ATTACH DATABASE '{}' AS {}",
        file.replace('\'', "''"),
        quote_ident(schema)
    ))
}

/// Open the pool, creating the database file if missing.
pub async fn connect(settings: &Settings) -> Result<Db, AppError> {
    let opts = SqliteConnectOptions::from_str(&settings.database_url)
        .map_err(|e| AppError::Config(format!("invalid DATABASE_URL: {}", e)))?
        .create_if_missing(true);
    let attach = attach_statement(&settings.database_url, &settings.db_schema);

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .after_connect(move |conn, _meta| {
            let attach = attach.clone();
            Box::pin(async move {
                if let Some(sql) = attach {
                    tracing::debug!(sql = %sql, "attach");
                    sqlx::query(&sql).execute(&mut *conn).await?;
                }
                Ok(())
            })
        })
        .connect_with(opts)
        .await?;
    Ok(Db::new(pool, settings.db_schema.clone()))
}

/// Create the persons and tasks tables in the configured schema if they do not exist.
pub async fn apply_schema(db: &Db) -> Result<(), AppError> {
    let sql = SCHEMA_SQL.replace("{schema}", &quote_ident(&db.schema));
    tracing::debug!(schema = %db.schema, "applying schema file");
    sqlx::raw_sql(&sql).execute(&db.pool).await?;
    Ok(())
}

/// Cheap liveness probe used by the readiness route.
pub async fn ping(db: &Db) -> Result<(), AppError> {
    sqlx::query("SELECT 1").fetch_optional(&db.pool).await?;
    Ok(())
}
