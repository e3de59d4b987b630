//! Schema differ.
//!
//! Compares a desired [`TableSchema`] against the live columns of the
//! same table and derives the ordered [`ReconciliationPlan`] that
//! transforms one into the other.

use std::collections::HashMap;

use crate::error::{Result, SchemaError};
use crate::plan::{Operation, ReconciliationPlan};
use crate::schema::{LiveColumn, TableSchema};

/// Computes the minimal set of structural operations for one table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaDiffer;

impl SchemaDiffer {
    /// Creates a new differ.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Diffs `desired` against `live` and returns the plan.
    ///
    /// Plan order: `DropPrimaryKey` (if the live key goes away or
    /// moves) comes first, so later type changes are never blocked by
    /// the key constraint. Column adds, drops and type alterations
    /// follow. `AddPrimaryKey` comes last, after every column it could
    /// depend on exists with its final type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaConflict`] if more than one desired
    /// field is marked primary; composite keys are not representable
    /// and an ambiguous plan must not be emitted.
    pub fn diff(&self, desired: &TableSchema, live: &[LiveColumn]) -> Result<ReconciliationPlan> {
        let desired_primary = single_primary(desired)?;

        let live_by_name: HashMap<&str, &LiveColumn> =
            live.iter().map(|c| (c.name.as_str(), c)).collect();

        let live_primary: Vec<&str> = live
            .iter()
            .filter(|c| c.is_primary)
            .map(|c| c.name.as_str())
            .collect();

        // The live key survives only if it is a single column and the
        // desired schema asks for the key on that same column.
        let key_unchanged = match (&live_primary[..], desired_primary) {
            ([current], Some(wanted)) => *current == wanted,
            ([], None) => true,
            _ => false,
        };

        let mut plan = ReconciliationPlan::new();

        if !live_primary.is_empty() && !key_unchanged {
            plan.push(Operation::DropPrimaryKey);
        }

        // Columns to add: desired but not live.
        for field in desired.fields.values() {
            if !live_by_name.contains_key(field.name.as_str()) {
                plan.push(Operation::add_column(&field.name, field.column_type));
            }
        }

        // Columns to drop: live but not desired, in catalog order.
        for column in live {
            if !desired.fields.contains_key(&column.name) {
                plan.push(Operation::drop_column(&column.name));
            }
        }

        // Columns present on both sides with a differing mapped type.
        for field in desired.fields.values() {
            if let Some(column) = live_by_name.get(field.name.as_str()) {
                if column.column_type != field.column_type {
                    plan.push(Operation::alter_column_type(
                        &field.name,
                        column.column_type,
                        field.column_type,
                    ));
                }
            }
        }

        if let Some(name) = desired_primary {
            if !key_unchanged {
                plan.push(Operation::add_primary_key(name));
            }
        }

        Ok(plan)
    }
}

/// Returns the single desired primary-key column, if any.
fn single_primary(desired: &TableSchema) -> Result<Option<&str>> {
    let primaries: Vec<&str> = desired.primary_fields().map(|f| f.name.as_str()).collect();
    match primaries[..] {
        [] => Ok(None),
        [one] => Ok(Some(one)),
        _ => Err(SchemaError::SchemaConflict(format!(
            "table '{}' marks {} fields as primary key; only one is allowed",
            desired.name,
            primaries.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TableField;
    use crate::types::ColumnType;

    fn live(name: &str, ty: ColumnType, primary: bool) -> LiveColumn {
        LiveColumn {
            name: name.to_string(),
            column_type: ty,
            is_nullable: !primary,
            is_primary: primary,
        }
    }

    /// Replays a plan against live columns, as the database would.
    fn apply(live: &[LiveColumn], plan: &ReconciliationPlan) -> Vec<LiveColumn> {
        let mut columns = live.to_vec();
        for op in plan {
            match op {
                Operation::AddColumn { name, column_type } => {
                    columns.push(LiveColumn {
                        name: name.clone(),
                        column_type: *column_type,
                        is_nullable: true,
                        is_primary: false,
                    });
                }
                Operation::DropColumn { name } => columns.retain(|c| &c.name != name),
                Operation::AlterColumnType { name, to, .. } => {
                    for c in &mut columns {
                        if &c.name == name {
                            c.column_type = *to;
                        }
                    }
                }
                Operation::DropPrimaryKey => {
                    for c in &mut columns {
                        c.is_primary = false;
                    }
                }
                Operation::AddPrimaryKey { name } => {
                    for c in &mut columns {
                        c.is_primary = &c.name == name;
                    }
                }
            }
        }
        columns
    }

    #[test]
    fn test_equal_schemas_yield_empty_plan() {
        let desired = TableSchema::new("users")
            .unwrap()
            .field(TableField::new("id", ColumnType::Integer).primary_key())
            .field(TableField::new("name", ColumnType::Text));
        let columns = vec![
            live("id", ColumnType::Integer, true),
            live("name", ColumnType::Text, false),
        ];

        let plan = SchemaDiffer::new().diff(&desired, &columns).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_add_drop_and_alter() {
        // live: {a: INTEGER (pk), b: TEXT}
        // desired: {a: INTEGER, b: VARCHAR, c: DATE}, no primary key
        let desired = TableSchema::new("t")
            .unwrap()
            .field(TableField::new("a", ColumnType::Integer))
            .field(TableField::new("b", ColumnType::Varchar))
            .field(TableField::new("c", ColumnType::Date));
        let columns = vec![
            live("a", ColumnType::Integer, true),
            live("b", ColumnType::Text, false),
        ];

        let plan = SchemaDiffer::new().diff(&desired, &columns).unwrap();
        let ops = plan.operations;

        assert_eq!(ops.len(), 3);
        // The key drop must precede any column alteration.
        assert_eq!(ops[0], Operation::DropPrimaryKey);
        assert!(ops.contains(&Operation::add_column("c", ColumnType::Date)));
        assert!(ops.contains(&Operation::alter_column_type(
            "b",
            ColumnType::Text,
            ColumnType::Varchar
        )));
        let drop_pos = ops
            .iter()
            .position(|o| *o == Operation::DropPrimaryKey)
            .unwrap();
        let alter_pos = ops
            .iter()
            .position(|o| matches!(o, Operation::AlterColumnType { .. }))
            .unwrap();
        assert!(drop_pos < alter_pos);
    }

    #[test]
    fn test_drop_column() {
        let desired = TableSchema::new("t")
            .unwrap()
            .field(TableField::new("a", ColumnType::Integer));
        let columns = vec![
            live("a", ColumnType::Integer, false),
            live("obsolete", ColumnType::Text, false),
        ];

        let plan = SchemaDiffer::new().diff(&desired, &columns).unwrap();
        assert_eq!(plan.operations, vec![Operation::drop_column("obsolete")]);
    }

    #[test]
    fn test_primary_key_kept_in_place() {
        let desired = TableSchema::new("t")
            .unwrap()
            .field(TableField::new("id", ColumnType::Integer).primary_key());
        let columns = vec![live("id", ColumnType::Integer, true)];

        let plan = SchemaDiffer::new().diff(&desired, &columns).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_primary_key_moves_between_columns() {
        let desired = TableSchema::new("t")
            .unwrap()
            .field(TableField::new("a", ColumnType::Integer))
            .field(TableField::new("b", ColumnType::Integer).primary_key());
        let columns = vec![
            live("a", ColumnType::Integer, true),
            live("b", ColumnType::Integer, false),
        ];

        let plan = SchemaDiffer::new().diff(&desired, &columns).unwrap();
        assert_eq!(
            plan.operations,
            vec![Operation::DropPrimaryKey, Operation::add_primary_key("b")]
        );
    }

    #[test]
    fn test_primary_key_added_last() {
        let desired = TableSchema::new("t")
            .unwrap()
            .field(TableField::new("a", ColumnType::Integer))
            .field(TableField::new("id", ColumnType::Integer).primary_key());
        let columns = vec![live("a", ColumnType::Integer, false)];

        let plan = SchemaDiffer::new().diff(&desired, &columns).unwrap();
        let ops = plan.operations;
        assert_eq!(*ops.last().unwrap(), Operation::add_primary_key("id"));
        assert!(ops.contains(&Operation::add_column("id", ColumnType::Integer)));
    }

    #[test]
    fn test_live_composite_key_fully_dropped() {
        let desired = TableSchema::new("t")
            .unwrap()
            .field(TableField::new("a", ColumnType::Integer).primary_key())
            .field(TableField::new("b", ColumnType::Integer));
        let columns = vec![
            live("a", ColumnType::Integer, true),
            live("b", ColumnType::Integer, true),
        ];

        let plan = SchemaDiffer::new().diff(&desired, &columns).unwrap();
        assert_eq!(
            plan.operations,
            vec![Operation::DropPrimaryKey, Operation::add_primary_key("a")]
        );
    }

    #[test]
    fn test_multiple_desired_primaries_conflict() {
        let desired = TableSchema::new("t")
            .unwrap()
            .field(TableField::new("a", ColumnType::Integer).primary_key())
            .field(TableField::new("b", ColumnType::Integer).primary_key());

        let result = SchemaDiffer::new().diff(&desired, &[]);
        assert!(matches!(result, Err(SchemaError::SchemaConflict(_))));
    }

    #[test]
    fn test_reconciliation_is_idempotent() {
        let desired = TableSchema::new("t")
            .unwrap()
            .field(TableField::new("a", ColumnType::Integer))
            .field(TableField::new("b", ColumnType::Varchar))
            .field(TableField::new("c", ColumnType::Date).primary_key());
        let columns = vec![
            live("a", ColumnType::Integer, true),
            live("b", ColumnType::Text, false),
            live("stale", ColumnType::Numeric, false),
        ];

        let differ = SchemaDiffer::new();
        let first = differ.diff(&desired, &columns).unwrap();
        assert!(!first.is_empty());

        let updated = apply(&columns, &first);
        let second = differ.diff(&desired, &updated).unwrap();
        assert!(second.is_empty(), "second pass not empty: {second:?}");
    }
}
