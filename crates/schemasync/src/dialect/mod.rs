//! SQL dialect for reconciliation operations.
//!
//! The dialect turns one [`Operation`](crate::plan::Operation) into
//! exactly one DDL statement. Only PostgreSQL is implemented; the
//! trait is the seam that keeps the orchestrator free of SQL text.

mod postgres;

pub use postgres::PostgresDialect;

use crate::plan::Operation;
use crate::schema::TableSchema;
use crate::types::ColumnType;

/// Trait for database-specific DDL generation.
pub trait SqlDialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Generates the single DDL statement for an operation.
    fn statement(&self, table: &str, operation: &Operation) -> String;

    /// Generates the forced variant of a type alteration: a lossy cast
    /// that may succeed where [`SqlDialect::statement`] was rejected.
    fn forced_cast_statement(&self, table: &str, column: &str, to: ColumnType) -> String;

    /// Generates the CREATE TABLE statement for a desired schema.
    fn create_table_sql(&self, schema: &TableSchema) -> String;

    /// Generates a DROP TABLE statement.
    fn drop_table_sql(&self, table: &str) -> String;

    /// Generates a standalone DROP COLUMN statement.
    fn drop_column_sql(&self, table: &str, column: &str) -> String;

    /// Returns the native type name used in DDL.
    fn type_name(&self, column_type: ColumnType) -> &'static str {
        column_type.to_native()
    }

    /// Quotes an identifier (table name, column name, etc.).
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{name}\"")
    }
}
