//! Builds parameterized SELECT, COUNT, INSERT, UPDATE and DELETE from a table definition.
//! Identifiers come from definitions only and are always quoted; every value is a parameter.

use crate::error::AppError;
use crate::schema::{ColumnDef, ColumnType, JoinSpec, TableDefinition};
use crate::sql::SqlValue;
use serde_json::{Map, Value};

/// SpatiaLite conversion applied to geometry columns on read.
pub const GEOJSON_FUNCTION: &str = "AsGeoJSON";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
}

impl Operator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Condition {
    pub field: String,
    pub op: Operator,
    pub value: SqlValue,
}

#[derive(Clone, Debug)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

/// Accumulated state of a read query. Conditions are AND-ed in insertion order.
#[derive(Clone, Debug, Default)]
pub struct SelectSpec {
    pub fields: Vec<String>,
    pub distinct: bool,
    pub conditions: Vec<Condition>,
    pub group_by: Vec<String>,
    pub orders: Vec<Order>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub joins: Vec<JoinSpec>,
}

impl SelectSpec {
    /// Empty query seeded with the definition's one-to-one joins.
    pub fn for_table(def: &TableDefinition) -> Self {
        SelectSpec {
            joins: def.one_to_one.clone(),
            ..SelectSpec::default()
        }
    }
}

/// Quote identifier for SQLite (safe: only from definitions).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Schema-qualified table name.
fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

fn column_ref(qualifier: &str, column: &str) -> String {
    format!("{}.{}", quoted(qualifier), quoted(column))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: SqlValue) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// Resolve a field to (qualifier, column). Plain names address the main table,
/// `<join>.<column>` addresses a joined table.
fn resolve<'a>(def: &'a TableDefinition, joins: &'a [JoinSpec], field: &str) -> Result<(&'a str, &'a ColumnDef), AppError> {
    let unknown = || AppError::UnknownColumn {
        table: def.table.clone(),
        column: field.to_string(),
    };
    match field.split_once('.') {
        Some((join_name, column)) => {
            let join = joins.iter().find(|j| j.name == join_name).ok_or_else(unknown)?;
            let col = join.related.column_def(column).ok_or_else(unknown)?;
            Ok((join.name.as_str(), col))
        }
        None => {
            let col = def.column_def(field).ok_or_else(unknown)?;
            Ok((def.table.as_str(), col))
        }
    }
}

/// Ranked columns sort by declared position. Unranked values and NULL rank -1: first
/// ascending, last descending.
fn order_expression(qualifier: &str, col: &ColumnDef) -> String {
    let expr = column_ref(qualifier, &col.name);
    if !col.is_ranked() {
        return expr;
    }
    let arms: Vec<String> = col
        .ranking
        .iter()
        .enumerate()
        .map(|(i, v)| format!("WHEN {} THEN {}", literal(v), i))
        .collect();
    format!("CASE {} {} ELSE -1 END", expr, arms.join(" "))
}

fn projected(qualifier: &str, def: &TableDefinition, column: &str, alias: &str) -> String {
    let expr = column_ref(qualifier, column);
    if def.is_geometry(column) {
        format!("{}({}) AS {}", GEOJSON_FUNCTION, expr, quoted(alias))
    } else {
        format!("{} AS {}", expr, quoted(alias))
    }
}

fn select_column_list(def: &TableDefinition, spec: &SelectSpec) -> Result<String, AppError> {
    let mut cols: Vec<String> = Vec::new();
    let mut push = |c: String| {
        if !cols.contains(&c) {
            cols.push(c);
        }
    };

    if spec.fields.is_empty() {
        for c in def.column_names().filter(|c| !def.is_geometry(c)) {
            push(projected(&def.table, def, c, c));
        }
    } else {
        for field in &spec.fields {
            let (qualifier, col) = resolve(def, &spec.joins, field)?;
            if qualifier == def.table {
                if !def.is_geometry(&col.name) {
                    push(projected(&def.table, def, &col.name, field));
                }
            } else if let Some(join) = spec.joins.iter().find(|j| j.name == qualifier) {
                push(projected(qualifier, &join.related, &col.name, field));
            }
        }
    }

    for g in &def.geometry {
        push(projected(&def.table, def, g, g));
    }

    if spec.fields.is_empty() {
        for join in &spec.joins {
            for c in join.related.column_names() {
                let alias = format!("{}.{}", join.name, c);
                push(projected(&join.name, &join.related, c, &alias));
            }
        }
    }

    Ok(cols.join(", "))
}

fn from_clause(def: &TableDefinition, schema: &str, joins: &[JoinSpec]) -> Result<String, AppError> {
    let mut out = format!("{} AS {}", qualified_table(schema, &def.table), quoted(&def.table));
    for join in joins {
        if !def.has_column(&join.local_column) {
            return Err(AppError::UnknownColumn {
                table: def.table.clone(),
                column: join.local_column.clone(),
            });
        }
        out.push_str(&format!(
            " LEFT JOIN {} AS {} ON {} = {}",
            qualified_table(schema, &join.related.table),
            quoted(&join.name),
            column_ref(&def.table, &join.local_column),
            column_ref(&join.name, &join.related.primary_key)
        ));
    }
    Ok(out)
}

fn where_clause(def: &TableDefinition, spec: &SelectSpec, q: &mut QueryBuf) -> Result<String, AppError> {
    let mut parts = Vec::with_capacity(spec.conditions.len());
    for cond in &spec.conditions {
        let (qualifier, col) = resolve(def, &spec.joins, &cond.field)?;
        let n = q.push_param(cond.value.clone());
        parts.push(format!("{} {} ?{}", column_ref(qualifier, &col.name), cond.op.as_sql(), n));
    }
    Ok(if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    })
}

/// SELECT with projection, joins, WHERE, GROUP BY, ORDER BY, LIMIT, OFFSET.
/// Params are the condition values, in condition order.
pub fn select(def: &TableDefinition, schema: &str, spec: &SelectSpec) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let cols = select_column_list(def, spec)?;
    let from = from_clause(def, schema, &spec.joins)?;
    let where_clause = where_clause(def, spec, &mut q)?;

    let mut group_parts = Vec::with_capacity(spec.group_by.len());
    for field in &spec.group_by {
        let (qualifier, col) = resolve(def, &spec.joins, field)?;
        group_parts.push(column_ref(qualifier, &col.name));
    }
    let group_clause = if group_parts.is_empty() {
        String::new()
    } else {
        format!(" GROUP BY {}", group_parts.join(", "))
    };

    let mut order_parts = Vec::with_capacity(spec.orders.len());
    for order in &spec.orders {
        let (qualifier, col) = resolve(def, &spec.joins, &order.field)?;
        order_parts.push(format!("{} {}", order_expression(qualifier, col), order.direction.as_sql()));
    }
    let order_clause = if order_parts.is_empty() {
        String::new()
    } else {
        format!(" ORDER BY {}", order_parts.join(", "))
    };

    // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
    let offset = spec.offset.filter(|n| *n > 0);
    let limit_clause = match (spec.limit, offset) {
        (Some(n), _) => format!(" LIMIT {}", n),
        (None, Some(_)) => " LIMIT -1".to_string(),
        (None, None) => String::new(),
    };
    let offset_clause = offset.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();

    q.sql = format!(
        "SELECT {}{} FROM {}{}{}{}{}{}",
        if spec.distinct { "DISTINCT " } else { "" },
        cols,
        from,
        where_clause,
        group_clause,
        order_clause,
        limit_clause,
        offset_clause
    );
    Ok(q)
}

/// SELECT COUNT(*) with the same joins and WHERE as `select`.
pub fn count(def: &TableDefinition, schema: &str, spec: &SelectSpec) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let from = from_clause(def, schema, &spec.joins)?;
    let where_clause = where_clause(def, spec, &mut q)?;
    q.sql = format!("SELECT COUNT(*) AS \"count\" FROM {}{}", from, where_clause);
    Ok(q)
}

/// INSERT of every declared column, values bound in declaration order. Missing keys bind NULL.
pub fn insert(def: &TableDefinition, schema: &str, record: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::with_capacity(def.columns.len());
    let mut placeholders = Vec::with_capacity(def.columns.len());
    for c in &def.columns {
        let v = record.get(&c.name).map(SqlValue::from_json).unwrap_or(SqlValue::Null);
        let n = q.push_param(v);
        cols.push(quoted(&c.name));
        placeholders.push(format!("?{}", n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        qualified_table(schema, &def.table),
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

fn key_of(def: &TableDefinition, record: &Map<String, Value>) -> Result<SqlValue, AppError> {
    match record.get(&def.primary_key) {
        Some(v) if !v.is_null() => Ok(SqlValue::from_json(v)),
        _ => Err(AppError::BadRequest(format!(
            "record for {} has no value for primary key '{}'",
            def.table, def.primary_key
        ))),
    }
}

/// UPDATE of every declared non-key column; the key is bound as the last parameter.
pub fn update(def: &TableDefinition, schema: &str, record: &Map<String, Value>) -> Result<QueryBuf, AppError> {
    let key = key_of(def, record)?;
    let mut q = QueryBuf::new();
    let mut sets = Vec::with_capacity(def.columns.len());
    for c in def.columns.iter().filter(|c| c.name != def.primary_key) {
        let v = record.get(&c.name).map(SqlValue::from_json).unwrap_or(SqlValue::Null);
        let n = q.push_param(v);
        sets.push(format!("{} = ?{}", quoted(&c.name), n));
    }
    let key_param = q.push_param(key);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ?{}",
        qualified_table(schema, &def.table),
        sets.join(", "),
        quoted(&def.primary_key),
        key_param
    );
    Ok(q)
}

/// DELETE by primary key.
pub fn delete(def: &TableDefinition, schema: &str, id: SqlValue) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(id);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ?{}",
        qualified_table(schema, &def.table),
        quoted(&def.primary_key),
        n
    );
    q
}

/// CREATE TABLE derived from declared column types. Used to enrich "no such table" errors.
pub fn create_table(def: &TableDefinition, schema: &str) -> String {
    let cols: Vec<String> = def
        .columns
        .iter()
        .map(|c| {
            let ty = match &c.column_type {
                ColumnType::Boolean => "BOOLEAN".to_string(),
                ColumnType::Number => "NUMERIC".to_string(),
                ColumnType::Text => "TEXT".to_string(),
                ColumnType::Relation { table, foreign_key } => {
                    format!("TEXT REFERENCES {}({})", quoted(table), quoted(foreign_key))
                }
            };
            if c.name == def.primary_key {
                format!("{} {} PRIMARY KEY", quoted(&c.name), ty)
            } else {
                format!("{} {}", quoted(&c.name), ty)
            }
        })
        .collect();
    format!("CREATE TABLE {} ({})", qualified_table(schema, &def.table), cols.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn persons() -> TableDefinition {
        TableDefinition::new("persons", "id")
            .text("id")
            .text("firstname")
            .number("age")
            .boolean("emailValidated")
    }

    fn tasks() -> TableDefinition {
        TableDefinition::new("tasks", "id")
            .text("id")
            .text("title")
            .ranked("priority", ["low", "medium", "high"])
            .relation("ownerId", "persons", "id")
            .one_to_one(JoinSpec::new("owner", "ownerId", Arc::new(persons())))
    }

    fn record(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn select_all_projects_declared_columns() {
        let spec = SelectSpec::for_table(&persons());
        let q = select(&persons(), "main", &spec).unwrap();
        assert_eq!(
            q.sql,
            "SELECT \"persons\".\"id\" AS \"id\", \"persons\".\"firstname\" AS \"firstname\", \
             \"persons\".\"age\" AS \"age\", \"persons\".\"emailValidated\" AS \"emailValidated\" \
             FROM \"main\".\"persons\" AS \"persons\""
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn conditions_are_anded_in_order_with_matching_params() {
        let mut spec = SelectSpec::for_table(&persons());
        spec.conditions.push(Condition {
            field: "age".into(),
            op: Operator::Gte,
            value: SqlValue::Integer(18),
        });
        spec.conditions.push(Condition {
            field: "firstname".into(),
            op: Operator::Like,
            value: "J%".into(),
        });
        spec.conditions.push(Condition {
            field: "age".into(),
            op: Operator::Lt,
            value: SqlValue::Integer(65),
        });
        let q = select(&persons(), "main", &spec).unwrap();
        assert!(q.sql.ends_with(
            " WHERE \"persons\".\"age\" >= ?1 AND \"persons\".\"firstname\" LIKE ?2 AND \"persons\".\"age\" < ?3"
        ));
        assert_eq!(
            q.params,
            vec![SqlValue::Integer(18), SqlValue::Text("J%".into()), SqlValue::Integer(65)]
        );
    }

    #[test]
    fn clauses_follow_sql_order() {
        let mut spec = SelectSpec::for_table(&persons());
        spec.fields = vec!["firstname".into()];
        spec.distinct = true;
        spec.group_by = vec!["firstname".into()];
        spec.orders.push(Order {
            field: "age".into(),
            direction: Direction::Desc,
        });
        spec.orders.push(Order {
            field: "id".into(),
            direction: Direction::Asc,
        });
        spec.limit = Some(10);
        spec.offset = Some(20);
        let q = select(&persons(), "main", &spec).unwrap();
        assert_eq!(
            q.sql,
            "SELECT DISTINCT \"persons\".\"firstname\" AS \"firstname\" FROM \"main\".\"persons\" AS \"persons\" \
             GROUP BY \"persons\".\"firstname\" ORDER BY \"persons\".\"age\" DESC, \"persons\".\"id\" ASC \
             LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn offset_without_limit_is_unbounded() {
        let mut spec = SelectSpec::for_table(&persons());
        spec.offset = Some(5);
        let q = select(&persons(), "main", &spec).unwrap();
        assert!(q.sql.ends_with(" LIMIT -1 OFFSET 5"));
    }

    #[test]
    fn zero_offset_is_omitted() {
        let mut spec = SelectSpec::for_table(&persons());
        spec.offset = Some(0);
        let q = select(&persons(), "main", &spec).unwrap();
        assert!(!q.sql.contains("OFFSET"));
        assert!(!q.sql.contains("LIMIT"));
    }

    #[test]
    fn ranked_column_orders_by_declared_position() {
        let mut spec = SelectSpec::for_table(&tasks());
        spec.orders.push(Order {
            field: "priority".into(),
            direction: Direction::Desc,
        });
        let q = select(&tasks(), "main", &spec).unwrap();
        assert!(q.sql.ends_with(
            " ORDER BY CASE \"tasks\".\"priority\" WHEN 'low' THEN 0 WHEN 'medium' THEN 1 WHEN 'high' THEN 2 ELSE -1 END DESC"
        ));
    }

    #[test]
    fn one_to_one_joins_are_left_joined_and_nested() {
        let spec = SelectSpec::for_table(&tasks());
        let q = select(&tasks(), "app", &spec).unwrap();
        assert!(q.sql.contains(
            " FROM \"app\".\"tasks\" AS \"tasks\" LEFT JOIN \"app\".\"persons\" AS \"owner\" \
             ON \"tasks\".\"ownerId\" = \"owner\".\"id\""
        ));
        assert!(q.sql.contains("\"owner\".\"firstname\" AS \"owner.firstname\""));
    }

    #[test]
    fn conditions_may_address_joined_columns() {
        let mut spec = SelectSpec::for_table(&tasks());
        spec.conditions.push(Condition {
            field: "owner.age".into(),
            op: Operator::Gt,
            value: SqlValue::Integer(40),
        });
        let q = select(&tasks(), "main", &spec).unwrap();
        assert!(q.sql.ends_with(" WHERE \"owner\".\"age\" > ?1"));
    }

    #[test]
    fn geometry_columns_are_converted() {
        let def = TableDefinition::new("places", "id").text("id").text("name").text("area").geometry("area");
        let q = select(&def, "main", &SelectSpec::for_table(&def)).unwrap();
        assert!(q.sql.starts_with(
            "SELECT \"places\".\"id\" AS \"id\", \"places\".\"name\" AS \"name\", \
             AsGeoJSON(\"places\".\"area\") AS \"area\" FROM"
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut spec = SelectSpec::for_table(&persons());
        spec.orders.push(Order {
            field: "age; DROP TABLE persons".into(),
            direction: Direction::Asc,
        });
        assert!(matches!(
            select(&persons(), "main", &spec),
            Err(AppError::UnknownColumn { .. })
        ));

        let mut spec = SelectSpec::for_table(&persons());
        spec.fields = vec!["nobody.firstname".into()];
        assert!(matches!(
            select(&persons(), "main", &spec),
            Err(AppError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn count_reuses_where_clause() {
        let mut spec = SelectSpec::for_table(&persons());
        spec.conditions.push(Condition {
            field: "emailValidated".into(),
            op: Operator::Eq,
            value: SqlValue::Bool(true),
        });
        spec.limit = Some(3);
        let q = count(&persons(), "main", &spec).unwrap();
        assert_eq!(
            q.sql,
            "SELECT COUNT(*) AS \"count\" FROM \"main\".\"persons\" AS \"persons\" WHERE \"persons\".\"emailValidated\" = ?1"
        );
        assert_eq!(q.params, vec![SqlValue::Bool(true)]);
    }

    #[test]
    fn insert_binds_every_declared_column() {
        let q = insert(
            &persons(),
            "main",
            &record(json!({"id": "a-b-c-d", "firstname": "Jane", "age": 30, "emailValidated": false})),
        );
        assert_eq!(
            q.sql,
            "INSERT INTO \"main\".\"persons\" (\"id\", \"firstname\", \"age\", \"emailValidated\") VALUES (?1, ?2, ?3, ?4)"
        );
        assert_eq!(q.params.len(), 4);
    }

    #[test]
    fn update_binds_the_key() {
        let q = update(
            &persons(),
            "main",
            &record(json!({"id": "x' OR '1'='1", "firstname": "Jane", "age": 30, "emailValidated": true})),
        )
        .unwrap();
        assert_eq!(
            q.sql,
            "UPDATE \"main\".\"persons\" SET \"firstname\" = ?1, \"age\" = ?2, \"emailValidated\" = ?3 WHERE \"id\" = ?4"
        );
        assert_eq!(q.params.last(), Some(&SqlValue::Text("x' OR '1'='1".into())));
    }

    #[test]
    fn update_requires_a_key() {
        let r = update(&persons(), "main", &record(json!({"firstname": "Jane"})));
        assert!(matches!(r, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn delete_binds_the_key() {
        let q = delete(&persons(), "main", "a-b-c-d".into());
        assert_eq!(q.sql, "DELETE FROM \"main\".\"persons\" WHERE \"id\" = ?1");
        assert_eq!(q.params, vec![SqlValue::Text("a-b-c-d".into())]);
    }

    #[test]
    fn create_table_follows_declared_types() {
        assert_eq!(
            create_table(&tasks(), "main"),
            "CREATE TABLE \"main\".\"tasks\" (\"id\" TEXT PRIMARY KEY, \"title\" TEXT, \"priority\" TEXT, \
             \"ownerId\" TEXT REFERENCES \"persons\"(\"id\"))"
        );
    }
}
