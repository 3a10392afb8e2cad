//! Query builder: accumulates projection, conditions, grouping, ordering, paging and joins,
//! then runs one statement. Reusable: every `run`/`count` executes the current state.

use crate::error::AppError;
use crate::schema::{JoinSpec, TableDefinition};
use crate::service::rows::row_to_json;
use crate::service::Record;
use crate::sql::{self, Condition, Direction, Operator, Order, QueryBuf, SelectSpec, SqlValue};
use crate::store::Db;
use serde_json::Value;
use sqlx::Row;
use std::marker::PhantomData;

pub struct Select<T> {
    db: Db,
    def: &'static TableDefinition,
    spec: SelectSpec,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Select<T> {
    pub(crate) fn new<I, S>(db: Db, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let def = T::definition();
        let mut spec = SelectSpec::for_table(def);
        spec.fields = fields.into_iter().map(Into::into).collect();
        Select {
            db,
            def,
            spec,
            _record: PhantomData,
        }
    }

    pub fn distinct(mut self) -> Self {
        self.spec.distinct = true;
        self
    }

    /// Append a condition; conditions are AND-ed in the order they were added.
    pub fn filter(mut self, field: impl Into<String>, op: Operator, value: impl Into<SqlValue>) -> Self {
        self.spec.conditions.push(Condition {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn group_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.group_by.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.spec.orders.push(Order {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.spec.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.spec.offset = Some(n);
        self
    }

    /// LEFT JOIN another table. A join with the same name as an existing one replaces it.
    pub fn join(mut self, join: JoinSpec) -> Self {
        self.spec.joins.retain(|j| j.name != join.name);
        self.spec.joins.push(join);
        self
    }

    pub fn to_query(&self) -> Result<QueryBuf, AppError> {
        sql::select(self.def, &self.db.schema, &self.spec)
    }

    pub fn to_count_query(&self) -> Result<QueryBuf, AppError> {
        sql::count(self.def, &self.db.schema, &self.spec)
    }

    /// Run and deserialize every row into `T`.
    pub async fn run(&self) -> Result<Vec<T>, AppError> {
        let rows = self.run_json().await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(AppError::from))
            .collect()
    }

    /// Run and return rows as JSON objects; use for projections that do not fit `T`.
    pub async fn run_json(&self) -> Result<Vec<Value>, AppError> {
        let q = self.to_query()?;
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        match query.fetch_all(&self.db.pool).await {
            Ok(rows) => Ok(rows.iter().map(|r| row_to_json(r, self.def, &self.spec.joins)).collect()),
            Err(e) => Err(self.enrich(e)),
        }
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let q = self.to_count_query()?;
        tracing::debug!(sql = %q.sql, params = ?q.params, "count");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        match query.fetch_one(&self.db.pool).await {
            Ok(row) => Ok(row.try_get::<i64, _>("count")?),
            Err(e) => Err(self.enrich(e)),
        }
    }

    /// Log the failure; a missing table gets a CREATE TABLE suggestion appended.
    fn enrich(&self, e: sqlx::Error) -> AppError {
        let missing_table = matches!(&e, sqlx::Error::Database(db) if db.message().contains("no such table"));
        if missing_table {
            let err = AppError::MissingTable {
                message: e.to_string(),
                suggestion: sql::create_table(self.def, &self.db.schema),
            };
            tracing::error!(table = %self.def.table, error = %err, "missing table");
            err
        } else {
            tracing::error!(table = %self.def.table, error = %e, "query failed");
            AppError::Db(e)
        }
    }
}
