//! Database session.
//!
//! [`DbSession`] is the engine's only seam to the database: two
//! introspection reads and one DDL write. [`PgSession`] implements it
//! over a PostgreSQL pool. Orchestrator tests substitute recording
//! stubs.

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{debug, info, warn};

use crate::error::{Result, SchemaError};
use crate::schema::LiveColumn;
use crate::types::ColumnType;

/// A live database session: catalog reads plus per-statement DDL
/// execution.
#[allow(async_fn_in_trait)]
pub trait DbSession {
    /// Lists public-schema table names, alphabetically sorted. A fresh
    /// snapshot at call time.
    async fn fetch_table_names(&self) -> Result<Vec<String>>;

    /// Reads a table's columns in physical position order, with
    /// primary-key membership resolved against the table's declared
    /// key constraint.
    async fn fetch_columns(&self, table: &str) -> Result<Vec<LiveColumn>>;

    /// Executes one DDL statement in its own transaction.
    ///
    /// Commits immediately on success; rolls back only the failing
    /// statement on error. There is no atomicity across a sequence of
    /// calls: work committed by earlier statements stays applied when
    /// a later statement fails. That trade-off is deliberate — each
    /// structural change is durable the moment it succeeds, at the
    /// cost of partially applied plans.
    async fn execute_ddl(&self, statement: &str) -> Result<()>;
}

const TABLES_QUERY: &str = "\
    SELECT table_name \
    FROM information_schema.tables \
    WHERE table_schema = 'public' \
    ORDER BY table_name";

const COLUMNS_QUERY: &str = "\
    SELECT \
        c.column_name, \
        c.data_type, \
        c.is_nullable, \
        (pk.column_name IS NOT NULL) AS is_primary \
    FROM information_schema.columns c \
    LEFT JOIN ( \
        SELECT ku.column_name \
        FROM information_schema.table_constraints tc \
        JOIN information_schema.key_column_usage ku \
            ON tc.constraint_name = ku.constraint_name \
        WHERE tc.constraint_type = 'PRIMARY KEY' \
            AND tc.table_name = $1 \
    ) pk ON c.column_name = pk.column_name \
    WHERE c.table_name = $2 \
    ORDER BY c.ordinal_position";

/// PostgreSQL session backed by a connection pool.
#[derive(Debug, Clone)]
pub struct PgSession {
    pool: PgPool,
}

impl PgSession {
    /// Connects to the database.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Connection`] if the session cannot be
    /// established.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(SchemaError::Connection)?;
        info!("Connected to the database");
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DbSession for PgSession {
    async fn fetch_table_names(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(TABLES_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| SchemaError::Introspection {
                context: "table list".to_string(),
                source,
            })?;

        rows.iter()
            .map(|row| {
                row.try_get("table_name")
                    .map_err(|source| SchemaError::Introspection {
                        context: "table list".to_string(),
                        source,
                    })
            })
            .collect()
    }

    async fn fetch_columns(&self, table: &str) -> Result<Vec<LiveColumn>> {
        let introspection_error = |source| SchemaError::Introspection {
            context: format!("columns of '{table}'"),
            source,
        };

        let rows = sqlx::query(COLUMNS_QUERY)
            .bind(table)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(introspection_error)?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get("column_name").map_err(introspection_error)?;
                let data_type: String = row.try_get("data_type").map_err(introspection_error)?;
                let is_nullable: String =
                    row.try_get("is_nullable").map_err(introspection_error)?;
                let is_primary: bool = row.try_get("is_primary").map_err(introspection_error)?;

                Ok(LiveColumn {
                    name,
                    column_type: ColumnType::from_native(&data_type),
                    is_nullable: is_nullable == "YES",
                    is_primary,
                })
            })
            .collect()
    }

    async fn execute_ddl(&self, statement: &str) -> Result<()> {
        debug!(sql = %statement, "Executing DDL");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(SchemaError::Connection)?;

        match sqlx::query(statement).execute(&mut *tx).await {
            Ok(_) => tx.commit().await.map_err(|source| SchemaError::Statement {
                statement: statement.to_string(),
                source,
            }),
            Err(source) => {
                warn!(sql = %statement, error = %source, "Statement failed, rolling back");
                tx.rollback().await.ok();
                Err(SchemaError::Statement {
                    statement: statement.to_string(),
                    source,
                })
            }
        }
    }
}
