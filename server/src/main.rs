//! Taskboard server: reads settings from the environment, opens the SQLite pool,
//! applies the schema file and serves the persons and tasks pages.
//!
//! Run from repo root: `cargo run -p taskboard-server`

use taskboard::{app, apply_schema, connect, AppState, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("taskboard=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let db = connect(&settings).await?;
    apply_schema(&db).await?;

    let router = app(AppState { db });
    let listener = TcpListener::bind(settings.bind_address()).await?;
    tracing::info!(schema = %settings.db_schema, "listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
