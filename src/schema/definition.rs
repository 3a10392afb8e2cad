//! Declarative table definitions: name, primary key, typed columns, joins, geometry.

use std::sync::Arc;

/// Declared type of a column. Drives row decoding and the suggested DDL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Number,
    Boolean,
    /// Text column holding the key of a row in another table.
    Relation { table: String, foreign_key: String },
}

#[derive(Clone, Debug)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    /// Ordered values of a categorical column. When set, ordering on the column
    /// follows this order instead of the text collation.
    pub ranking: Vec<String>,
}

impl ColumnDef {
    pub fn is_ranked(&self) -> bool {
        !self.ranking.is_empty()
    }
}

/// LEFT JOIN of a related table on `local_column = related.primary_key`.
/// Joined columns come back nested under `name` in mapped rows.
#[derive(Clone, Debug)]
pub struct JoinSpec {
    pub name: String,
    pub local_column: String,
    pub related: Arc<TableDefinition>,
}

impl JoinSpec {
    pub fn new(name: impl Into<String>, local_column: impl Into<String>, related: Arc<TableDefinition>) -> Self {
        JoinSpec {
            name: name.into(),
            local_column: local_column.into(),
            related,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TableDefinition {
    pub table: String,
    pub primary_key: String,
    pub columns: Vec<ColumnDef>,
    pub one_to_one: Vec<JoinSpec>,
    /// Columns read through the geo-JSON conversion function.
    pub geometry: Vec<String>,
}

impl TableDefinition {
    pub fn new(table: impl Into<String>, primary_key: impl Into<String>) -> Self {
        TableDefinition {
            table: table.into(),
            primary_key: primary_key.into(),
            columns: Vec::new(),
            one_to_one: Vec::new(),
            geometry: Vec::new(),
        }
    }

    pub fn column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push(ColumnDef {
            name: name.into(),
            column_type,
            ranking: Vec::new(),
        });
        self
    }

    pub fn text(self, name: impl Into<String>) -> Self {
        self.column(name, ColumnType::Text)
    }

    pub fn number(self, name: impl Into<String>) -> Self {
        self.column(name, ColumnType::Number)
    }

    pub fn boolean(self, name: impl Into<String>) -> Self {
        self.column(name, ColumnType::Boolean)
    }

    pub fn relation(self, name: impl Into<String>, table: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        self.column(
            name,
            ColumnType::Relation {
                table: table.into(),
                foreign_key: foreign_key.into(),
            },
        )
    }

    /// Text column whose values sort in the given order (lowest first).
    pub fn ranked<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.push(ColumnDef {
            name: name.into(),
            column_type: ColumnType::Text,
            ranking: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn one_to_one(mut self, join: JoinSpec) -> Self {
        self.one_to_one.push(join);
        self
    }

    pub fn geometry(mut self, name: impl Into<String>) -> Self {
        self.geometry.push(name.into());
        self
    }

    pub fn column_def(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_def(name).is_some()
    }

    pub fn is_geometry(&self, name: &str) -> bool {
        self.geometry.iter().any(|g| g == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}
