//! Reconciliation operations and plans.
//!
//! An [`Operation`] is one structural change; a [`ReconciliationPlan`]
//! is the ordered sequence the differ derived. Plans are created and
//! consumed entirely within one reconciliation call and never
//! persisted.

use serde::{Deserialize, Serialize};

use crate::types::ColumnType;

/// A single structural change to a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Add a column.
    AddColumn {
        /// Column name.
        name: String,
        /// Portable column type.
        column_type: ColumnType,
    },

    /// Drop a column.
    DropColumn {
        /// Column name.
        name: String,
    },

    /// Change a column's type.
    AlterColumnType {
        /// Column name.
        name: String,
        /// Current type, as mapped from the live catalog.
        from: ColumnType,
        /// Desired type.
        to: ColumnType,
    },

    /// Drop the table's primary-key constraint.
    DropPrimaryKey,

    /// Add a single-column primary key.
    AddPrimaryKey {
        /// Column name.
        name: String,
    },
}

impl Operation {
    /// Creates an `AddColumn` operation.
    #[must_use]
    pub fn add_column(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self::AddColumn {
            name: name.into(),
            column_type,
        }
    }

    /// Creates a `DropColumn` operation.
    #[must_use]
    pub fn drop_column(name: impl Into<String>) -> Self {
        Self::DropColumn { name: name.into() }
    }

    /// Creates an `AlterColumnType` operation.
    #[must_use]
    pub fn alter_column_type(name: impl Into<String>, from: ColumnType, to: ColumnType) -> Self {
        Self::AlterColumnType {
            name: name.into(),
            from,
            to,
        }
    }

    /// Creates an `AddPrimaryKey` operation.
    #[must_use]
    pub fn add_primary_key(name: impl Into<String>) -> Self {
        Self::AddPrimaryKey { name: name.into() }
    }

    /// Returns a human-readable description of this operation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::AddColumn { name, column_type } => {
                format!("Add column '{name}' ({column_type})")
            }
            Self::DropColumn { name } => format!("Drop column '{name}'"),
            Self::AlterColumnType { name, from, to } => {
                format!("Alter column '{name}' from {from} to {to}")
            }
            Self::DropPrimaryKey => "Drop primary key".to_string(),
            Self::AddPrimaryKey { name } => format!("Add primary key on '{name}'"),
        }
    }
}

/// An ordered sequence of operations for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    /// Operations in application order.
    pub operations: Vec<Operation>,
}

impl ReconciliationPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an operation.
    pub fn push(&mut self, op: Operation) {
        self.operations.push(op);
    }

    /// Returns true if nothing needs to change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of operations in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Iterates over operations in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }
}

impl IntoIterator for ReconciliationPlan {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a ReconciliationPlan {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions() {
        assert_eq!(
            Operation::add_column("due", ColumnType::Date).description(),
            "Add column 'due' (DATE)"
        );
        assert_eq!(
            Operation::alter_column_type("note", ColumnType::Text, ColumnType::Varchar)
                .description(),
            "Alter column 'note' from TEXT to VARCHAR(255)"
        );
        assert_eq!(Operation::DropPrimaryKey.description(), "Drop primary key");
    }

    #[test]
    fn test_plan_ordering_preserved() {
        let mut plan = ReconciliationPlan::new();
        plan.push(Operation::DropPrimaryKey);
        plan.push(Operation::add_column("c", ColumnType::Date));
        plan.push(Operation::add_primary_key("c"));

        let ops: Vec<_> = plan.iter().collect();
        assert!(matches!(ops[0], Operation::DropPrimaryKey));
        assert!(matches!(ops[2], Operation::AddPrimaryKey { .. }));
    }
}
