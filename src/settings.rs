//! Process configuration read from the environment (after `.env`, if present).

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    /// SQLite schema that qualifies every table reference. Anything other than
    /// `main` is attached per connection (see `store::connect`). `temp` is rejected:
    /// it is private to one connection, so tables created there are invisible to the rest of the pool.
    pub db_schema: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let non_empty = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let port = match non_empty("PORT") {
            Some(p) => p
                .parse()
                .map_err(|_| AppError::Config(format!("PORT must be a port number, got '{}'", p)))?,
            None => 3000,
        };
        let max_connections = match non_empty("DB_MAX_CONNECTIONS") {
            Some(n) => n
                .parse()
                .map_err(|_| AppError::Config(format!("DB_MAX_CONNECTIONS must be a number, got '{}'", n)))?,
            None => 5,
        };
        let db_schema = non_empty("DB_SCHEMA").unwrap_or_else(|| "main".into());
        if db_schema.eq_ignore_ascii_case("temp") {
            return Err(AppError::Config(
                "DB_SCHEMA cannot be 'temp': it is not shared between pooled connections".into(),
            ));
        }
        Ok(Settings {
            database_url: non_empty("DATABASE_URL").unwrap_or_else(|| "sqlite://database.sqlite".into()),
            db_schema,
            host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            max_connections,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
