//! Schema reconciliation for PostgreSQL tables.
//!
//! `schemasync` takes a desired table description — columns, portable
//! types, nullability, a single primary key — and reconciles the live
//! database schema to match it, without hand-written migration
//! scripts.
//!
//! # Architecture
//!
//! - **Sanitizer** ([`ident`]) - normalizes user-supplied names into
//!   safe identifiers
//! - **Type mapper** ([`types`]) - portable [`ColumnType`] values
//!   mapped to and from native type names (lossily, in one direction)
//! - **Differ** ([`diff`]) - derives the ordered operation plan from a
//!   desired schema and the introspected live columns
//! - **Dialect** ([`dialect`]) - one DDL statement per operation
//! - **Session** ([`session`]) - catalog introspection and
//!   per-statement commit/rollback execution
//! - **Orchestrator** ([`reconcile`]) - sequences the plan, consults
//!   the caller's [`DecisionHandler`] at the human-in-the-loop gates
//!
//! # Execution model
//!
//! Every operation becomes exactly one DDL statement, committed on its
//! own. There is no atomicity across a plan: if the fourth statement
//! fails, the first three stay applied. Type alterations are
//! two-phase — a safe cast first, then (with the caller's consent) a
//! lossy forced cast.
//!
//! # Example
//!
//! ```rust,ignore
//! use schemasync::prelude::*;
//!
//! let session = PgSession::connect(&config.url()).await?;
//! let manager = SchemaManager::new(session, PostgresDialect::new(), ApproveAll);
//!
//! let desired = TableSchema::new("tasks")?
//!     .field(TableField::new("id", ColumnType::Integer).primary_key())
//!     .field(TableField::new("title", ColumnType::Varchar).not_null())
//!     .field(TableField::new("due", ColumnType::Date));
//!
//! match manager.reconcile(&desired).await? {
//!     ReconcileOutcome::Applied { operations } => println!("{operations} changes"),
//!     ReconcileOutcome::Cancelled => println!("cancelled"),
//! }
//! ```

pub mod config;
pub mod decision;
pub mod dialect;
pub mod diff;
pub mod error;
pub mod ident;
pub mod plan;
pub mod reconcile;
pub mod schema;
pub mod session;
pub mod types;

pub use error::{Result, SchemaError};
pub use types::ColumnType;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::DatabaseConfig;
    pub use crate::decision::{ApproveAll, DecisionHandler};
    pub use crate::dialect::{PostgresDialect, SqlDialect};
    pub use crate::diff::SchemaDiffer;
    pub use crate::error::{Result, SchemaError};
    pub use crate::plan::{Operation, ReconciliationPlan};
    pub use crate::reconcile::{ReconcileOutcome, SchemaManager};
    pub use crate::schema::{LiveColumn, TableField, TableSchema};
    pub use crate::session::{DbSession, PgSession};
    pub use crate::types::ColumnType;
}
