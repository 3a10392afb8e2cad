use sqlx::sqlite::SqlitePoolOptions;
use taskboard::{apply_schema, Db};

/// In-memory database with the bundled schema applied. One connection so every
/// statement sees the same memory database.
pub async fn memory_db() -> Db {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");
    let db = Db::new(pool, "main");
    apply_schema(&db).await.expect("apply schema");
    db
}
