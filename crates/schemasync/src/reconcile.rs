//! Reconciliation orchestrator.
//!
//! [`SchemaManager`] drives a reconciliation end to end: introspect the
//! live table, diff it against the desired schema, then apply the plan
//! one statement at a time. Each statement commits on its own, so a
//! failure mid-plan leaves earlier operations applied; only the failing
//! statement is rolled back.

use tracing::{info, warn};

use crate::decision::DecisionHandler;
use crate::dialect::SqlDialect;
use crate::diff::SchemaDiffer;
use crate::error::{Result, SchemaError};
use crate::plan::Operation;
use crate::schema::{LiveColumn, TableSchema};
use crate::session::DbSession;

/// How a reconciliation call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The plan was applied; `operations` is the number of operations
    /// it contained (zero when the table was already up to date).
    Applied {
        /// Operations applied.
        operations: usize,
    },
    /// The caller declined the missing-primary-key confirmation;
    /// nothing was executed.
    Cancelled,
}

/// Orchestrates schema reconciliation over an injected session,
/// dialect and decision handler.
pub struct SchemaManager<S, D, U> {
    session: S,
    dialect: D,
    differ: SchemaDiffer,
    decisions: U,
}

impl<S, D, U> SchemaManager<S, D, U>
where
    S: DbSession,
    D: SqlDialect,
    U: DecisionHandler,
{
    /// Creates a new manager.
    pub fn new(session: S, dialect: D, decisions: U) -> Self {
        Self {
            session,
            dialect,
            differ: SchemaDiffer::new(),
            decisions,
        }
    }

    /// Lists public-schema tables, alphabetically sorted.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        self.session.fetch_table_names().await
    }

    /// Reads a table's live columns in position order.
    pub async fn get_columns(&self, table: &str) -> Result<Vec<LiveColumn>> {
        self.session.fetch_columns(table).await
    }

    /// Creates a new table from the desired schema. A single
    /// `CREATE TABLE IF NOT EXISTS` statement; no diffing.
    pub async fn create(&self, schema: &TableSchema) -> Result<()> {
        ensure_single_primary(schema)?;

        let statement = self.dialect.create_table_sql(schema);
        info!(table = %schema.name, "Creating table");
        self.session.execute_ddl(&statement).await?;
        self.decisions
            .notify_info(&format!("Table '{}' created.", schema.name));
        Ok(())
    }

    /// Reconciles the live table to match `desired`.
    ///
    /// Validation happens before any statement executes; once the plan
    /// starts applying, each operation commits independently and a
    /// failure leaves prior operations in place.
    ///
    /// # Errors
    ///
    /// [`SchemaError::SchemaConflict`] if more than one field is marked
    /// primary, [`SchemaError::Introspection`] if the catalog read
    /// fails, [`SchemaError::Statement`] if an operation fails (after
    /// any declined forced-cast retry).
    pub async fn reconcile(&self, desired: &TableSchema) -> Result<ReconcileOutcome> {
        ensure_single_primary(desired)?;

        let live = self.session.fetch_columns(&desired.name).await?;

        // Human gate: nobody asked for a key and the table has none.
        let desired_has_primary = desired.primary_fields().next().is_some();
        let live_has_primary = live.iter().any(|c| c.is_primary);
        if !desired_has_primary && !live_has_primary {
            let proceed = self.decisions.confirm(
                "Warning",
                &format!(
                    "Table '{}' has no primary key. Continue without one?",
                    desired.name
                ),
            );
            if !proceed {
                self.decisions
                    .notify_info(&format!("Reconciliation of '{}' cancelled.", desired.name));
                return Ok(ReconcileOutcome::Cancelled);
            }
        }

        let plan = self.differ.diff(desired, &live)?;
        if plan.is_empty() {
            info!(table = %desired.name, "Schema already up to date");
            self.decisions
                .notify_info(&format!("Table '{}' is already up to date.", desired.name));
            return Ok(ReconcileOutcome::Applied { operations: 0 });
        }

        let total = plan.len();
        for operation in &plan {
            self.apply(&desired.name, operation).await?;
        }

        info!(table = %desired.name, operations = total, "Reconciliation complete");
        self.decisions.notify_info(&format!(
            "Saved changes to '{}' ({total} operations).",
            desired.name
        ));
        Ok(ReconcileOutcome::Applied { operations: total })
    }

    /// Drops a table.
    pub async fn delete_table(&self, name: &str) -> Result<()> {
        let statement = self.dialect.drop_table_sql(name);
        info!(table = %name, "Dropping table");
        self.session.execute_ddl(&statement).await?;
        self.decisions
            .notify_info(&format!("Table '{name}' deleted."));
        Ok(())
    }

    /// Drops a single column.
    pub async fn delete_column(&self, table: &str, column: &str) -> Result<()> {
        let statement = self.dialect.drop_column_sql(table, column);
        info!(table = %table, column = %column, "Dropping column");
        self.session.execute_ddl(&statement).await?;
        self.decisions
            .notify_info(&format!("Column '{column}' deleted from '{table}'."));
        Ok(())
    }

    /// Applies one operation as one statement, with the two-phase
    /// forced-cast retry for type alterations.
    async fn apply(&self, table: &str, operation: &Operation) -> Result<()> {
        info!(table = %table, "{}", operation.description());

        let statement = self.dialect.statement(table, operation);
        match self.session.execute_ddl(&statement).await {
            Ok(()) => Ok(()),
            Err(original) => {
                if let Operation::AlterColumnType { name, to, .. } = operation {
                    warn!(table = %table, column = %name, "Safe cast rejected");
                    let forced = self.decisions.confirm(
                        "Potential data loss",
                        &format!(
                            "Column '{name}' cannot be converted to {to} automatically. \
                             Force the conversion? Values that do not fit may be lost."
                        ),
                    );
                    if forced {
                        let retry = self.dialect.forced_cast_statement(table, name, *to);
                        return match self.session.execute_ddl(&retry).await {
                            Ok(()) => Ok(()),
                            Err(err) => {
                                self.decisions.notify_error(&err.to_string());
                                Err(err)
                            }
                        };
                    }
                }
                self.decisions.notify_error(&original.to_string());
                Err(original)
            }
        }
    }
}

/// Rejects desired schemas with more than one primary-key field before
/// any statement executes. Composite keys are not representable.
fn ensure_single_primary(schema: &TableSchema) -> Result<()> {
    let count = schema.primary_fields().count();
    if count > 1 {
        return Err(SchemaError::SchemaConflict(format!(
            "table '{}' marks {count} fields as primary key; only one is allowed",
            schema.name
        )));
    }
    Ok(())
}
