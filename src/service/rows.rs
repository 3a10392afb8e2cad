//! Row mapping: SQLite rows to JSON objects, decoded by storage class and declared column type.

use crate::schema::{ColumnType, JoinSpec, TableDefinition};
use serde_json::{Map, Number, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// Map a row to a JSON object. Columns aliased `<join>.<column>` are nested under the
/// join name; a join whose columns are all NULL (no match) maps to `null`.
pub fn row_to_json(row: &SqliteRow, def: &TableDefinition, joins: &[JoinSpec]) -> Value {
    let mut map = Map::new();
    let mut nested: Vec<(String, Map<String, Value>)> = Vec::new();

    for (idx, col) in row.columns().iter().enumerate() {
        let name = col.name();
        match name.split_once('.') {
            Some((join_name, column)) => {
                let related = joins.iter().find(|j| j.name == join_name).map(|j| j.related.as_ref());
                let v = cell_to_value(row, idx, related.and_then(|r| declared(r, column)), related.is_some_and(|r| r.is_geometry(column)));
                match nested.iter_mut().find(|(n, _)| n == join_name) {
                    Some((_, m)) => {
                        m.insert(column.to_string(), v);
                    }
                    None => {
                        let mut m = Map::new();
                        m.insert(column.to_string(), v);
                        nested.push((join_name.to_string(), m));
                    }
                }
            }
            None => {
                let v = cell_to_value(row, idx, declared(def, name), def.is_geometry(name));
                map.insert(name.to_string(), v);
            }
        }
    }

    for (join_name, m) in nested {
        let v = if m.values().all(Value::is_null) {
            Value::Null
        } else {
            Value::Object(m)
        };
        map.insert(join_name, v);
    }
    Value::Object(map)
}

fn declared<'a>(def: &'a TableDefinition, column: &str) -> Option<&'a ColumnType> {
    def.column_def(column).map(|c| &c.column_type)
}

fn cell_to_value(row: &SqliteRow, idx: usize, declared: Option<&ColumnType>, geometry: bool) -> Value {
    let storage = match row.try_get_raw(idx) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_string(),
        Err(e) => {
            tracing::warn!(column = idx, error = %e, "unreadable column");
            return Value::Null;
        }
    };

    match storage.as_str() {
        "INTEGER" => {
            let Ok(n) = row.try_get_unchecked::<i64, _>(idx) else {
                return Value::Null;
            };
            match declared {
                Some(ColumnType::Boolean) => Value::Bool(n != 0),
                _ => Value::Number(n.into()),
            }
        }
        "REAL" => {
            let Ok(f) = row.try_get_unchecked::<f64, _>(idx) else {
                return Value::Null;
            };
            match declared {
                Some(ColumnType::Boolean) => Value::Bool(f != 0.0),
                // Whole numbers stored as REAL (NUMERIC affinity) read back as integers.
                Some(ColumnType::Number) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    Value::Number((f as i64).into())
                }
                _ => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
            }
        }
        "BLOB" => match row.try_get_unchecked::<Vec<u8>, _>(idx) {
            Ok(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
            Err(_) => Value::Null,
        },
        _ => {
            let Ok(s) = row.try_get_unchecked::<String, _>(idx) else {
                return Value::Null;
            };
            if geometry {
                return serde_json::from_str(&s).unwrap_or(Value::String(s));
            }
            match declared {
                Some(ColumnType::Boolean) => match s.to_ascii_lowercase().as_str() {
                    "true" | "1" => Value::Bool(true),
                    "false" | "0" => Value::Bool(false),
                    _ => Value::String(s),
                },
                Some(ColumnType::Number) => s
                    .parse::<i64>()
                    .map(|n| Value::Number(n.into()))
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number))
                    .unwrap_or(Value::String(s)),
                _ => Value::String(s),
            }
        }
    }
}
