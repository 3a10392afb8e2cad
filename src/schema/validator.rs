//! Definition validation: primary key, column references, identifiers.

use crate::error::DefinitionError;
use crate::schema::TableDefinition;
use std::collections::HashSet;

/// Identifiers end up quoted in SQL, but `.` is reserved for `<join>.<column>` field paths.
fn valid_identifier(name: &str) -> bool {
    !name.is_empty() && !name.contains('.') && !name.contains('\0')
}

pub fn validate(def: &TableDefinition) -> Result<(), DefinitionError> {
    if !valid_identifier(&def.table) {
        return Err(DefinitionError::InvalidIdentifier(def.table.clone()));
    }

    let mut seen = HashSet::new();
    for c in &def.columns {
        if !valid_identifier(&c.name) {
            return Err(DefinitionError::InvalidIdentifier(c.name.clone()));
        }
        if !seen.insert(c.name.as_str()) {
            return Err(DefinitionError::DuplicateColumn {
                table: def.table.clone(),
                column: c.name.clone(),
            });
        }
    }

    if !def.has_column(&def.primary_key) {
        return Err(DefinitionError::InvalidPrimaryKey {
            table: def.table.clone(),
            column: def.primary_key.clone(),
        });
    }

    for g in &def.geometry {
        if !def.has_column(g) {
            return Err(DefinitionError::MissingColumn {
                kind: "geometry",
                table: def.table.clone(),
                column: g.clone(),
            });
        }
    }

    let mut join_names = HashSet::new();
    for join in &def.one_to_one {
        if !valid_identifier(&join.name) || join.name == def.table {
            return Err(DefinitionError::InvalidIdentifier(join.name.clone()));
        }
        if !join_names.insert(join.name.as_str()) {
            return Err(DefinitionError::DuplicateJoin(join.name.clone()));
        }
        if !def.has_column(&join.local_column) {
            return Err(DefinitionError::MissingColumn {
                kind: "join",
                table: def.table.clone(),
                column: join.local_column.clone(),
            });
        }
        validate(&join.related)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::JoinSpec;
    use std::sync::Arc;

    fn persons() -> TableDefinition {
        TableDefinition::new("persons", "id").text("id").text("firstname").number("age")
    }

    #[test]
    fn accepts_well_formed_definition() {
        assert!(validate(&persons()).is_ok());
    }

    #[test]
    fn rejects_primary_key_not_declared() {
        let def = TableDefinition::new("persons", "uuid").text("id");
        assert!(matches!(validate(&def), Err(DefinitionError::InvalidPrimaryKey { .. })));
    }

    #[test]
    fn rejects_duplicate_column() {
        let def = persons().text("age");
        assert!(matches!(validate(&def), Err(DefinitionError::DuplicateColumn { .. })));
    }

    #[test]
    fn rejects_undeclared_geometry_column() {
        let def = persons().geometry("location");
        assert!(matches!(
            validate(&def),
            Err(DefinitionError::MissingColumn { kind: "geometry", .. })
        ));
    }

    #[test]
    fn rejects_join_on_unknown_column() {
        let def = TableDefinition::new("tasks", "id")
            .text("id")
            .one_to_one(JoinSpec::new("owner", "ownerId", Arc::new(persons())));
        assert!(matches!(
            validate(&def),
            Err(DefinitionError::MissingColumn { kind: "join", .. })
        ));
    }

    #[test]
    fn rejects_dotted_identifier() {
        let def = TableDefinition::new("persons", "id").text("id").text("a.b");
        assert!(matches!(validate(&def), Err(DefinitionError::InvalidIdentifier(_))));
    }
}
