//! Generic table accessor: read, insert, update, delete and query entry point for a record type.

use crate::error::AppError;
use crate::schema::TableDefinition;
use crate::service::Select;
use crate::sql::{self, Operator, QueryBuf, SqlValue};
use crate::store::Db;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::marker::PhantomData;

/// A row type stored in one table. Field names serialize to the declared column names.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    /// Definition built once per type (typically behind a `OnceLock`).
    fn definition() -> &'static TableDefinition;

    fn table(db: &Db) -> Table<Self>
    where
        Self: Sized,
    {
        Table::new(db)
    }
}

pub struct Table<T> {
    db: Db,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Table<T> {
    pub fn new(db: &Db) -> Self {
        Table {
            db: db.clone(),
            _record: PhantomData,
        }
    }

    pub fn definition(&self) -> &'static TableDefinition {
        T::definition()
    }

    /// Query builder over this table; no fields means every declared column.
    pub fn select<I, S>(&self, fields: I) -> Select<T>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Select::new(self.db.clone(), fields)
    }

    pub fn select_all(&self) -> Select<T> {
        self.select(std::iter::empty::<String>())
    }

    /// Fetch the row whose primary key equals `key`.
    pub async fn read(&self, key: &str) -> Result<T, AppError> {
        let def = T::definition();
        let mut rows = self
            .select_all()
            .filter(def.primary_key.as_str(), Operator::Eq, key)
            .limit(1)
            .run()
            .await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(format!("{} '{}'", def.table, key)));
        }
        Ok(rows.swap_remove(0))
    }

    /// Insert every declared column. Returns the record unchanged.
    pub async fn insert(&self, record: T) -> Result<T, AppError> {
        let def = T::definition();
        let values = to_object(&record)?;
        let q = sql::insert(def, &self.db.schema, &values);
        self.execute(&q, "insert").await?;
        Ok(record)
    }

    /// Rewrite every declared column of the row matching the record's key.
    pub async fn update(&self, record: T) -> Result<T, AppError> {
        let def = T::definition();
        let values = to_object(&record)?;
        let q = sql::update(def, &self.db.schema, &values)?;
        if self.execute(&q, "update").await? == 0 {
            let key = values.get(&def.primary_key).cloned().unwrap_or(Value::Null);
            return Err(AppError::NotFound(format!("{} {}", def.table, key)));
        }
        Ok(record)
    }

    /// Delete by primary key. Deleting a missing key is not an error.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let def = T::definition();
        let q = sql::delete(def, &self.db.schema, SqlValue::from(id));
        self.execute(&q, "delete").await?;
        Ok(())
    }

    async fn execute(&self, q: &QueryBuf, op: &'static str) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, op, "execute");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        match query.execute(&self.db.pool).await {
            Ok(done) => Ok(done.rows_affected()),
            Err(e) => {
                tracing::error!(table = %T::definition().table, op, error = %e, "statement failed");
                Err(AppError::Db(e))
            }
        }
    }
}

fn to_object<T: Serialize>(record: &T) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(record)? {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("record must serialize to an object".into())),
    }
}
