//! PostgreSQL dialect.
//!
//! Statement shapes follow what the information_schema catalog
//! supports directly: `ALTER TABLE` for every column operation and the
//! `"<table>_pkey"` default constraint name for primary keys.

use crate::plan::Operation;
use crate::schema::TableSchema;
use crate::types::ColumnType;

use super::SqlDialect;

/// PostgreSQL reconciliation dialect.
#[derive(Debug, Clone, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn add_column_sql(&self, table: &str, column: &str, column_type: ColumnType) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            self.quote_identifier(table),
            self.quote_identifier(column),
            self.type_name(column_type)
        )
    }

    fn alter_column_sql(&self, table: &str, column: &str, to: ColumnType) -> String {
        // The USING clause lets the engine attempt a direct cast of
        // existing values; the cast itself may still be rejected.
        format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {} USING {}::{}",
            self.quote_identifier(table),
            self.quote_identifier(column),
            self.type_name(to),
            self.quote_identifier(column),
            self.type_name(to)
        )
    }

    fn drop_primary_key_sql(&self, table: &str) -> String {
        // Postgres names the constraint "<table>_pkey" by default.
        format!(
            "ALTER TABLE {} DROP CONSTRAINT IF EXISTS {}",
            self.quote_identifier(table),
            self.quote_identifier(&format!("{table}_pkey"))
        )
    }

    fn add_primary_key_sql(&self, table: &str, column: &str) -> String {
        format!(
            "ALTER TABLE {} ADD PRIMARY KEY ({})",
            self.quote_identifier(table),
            self.quote_identifier(column)
        )
    }
}

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn statement(&self, table: &str, operation: &Operation) -> String {
        match operation {
            Operation::AddColumn { name, column_type } => {
                self.add_column_sql(table, name, *column_type)
            }
            Operation::DropColumn { name } => self.drop_column_sql(table, name),
            Operation::AlterColumnType { name, to, .. } => self.alter_column_sql(table, name, *to),
            Operation::DropPrimaryKey => self.drop_primary_key_sql(table),
            Operation::AddPrimaryKey { name } => self.add_primary_key_sql(table, name),
        }
    }

    fn forced_cast_statement(&self, table: &str, column: &str, to: ColumnType) -> String {
        // Lossy path: route the cast through text. Text accepts every
        // source value, so conversions the direct cast rejects (e.g.
        // integer -> varchar of formatted values) go through, at the
        // cost of whatever the textual round-trip discards.
        format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {} USING ({}::text)::{}",
            self.quote_identifier(table),
            self.quote_identifier(column),
            self.type_name(to),
            self.quote_identifier(column),
            self.type_name(to)
        )
    }

    fn create_table_sql(&self, schema: &TableSchema) -> String {
        let mut definitions: Vec<String> = Vec::with_capacity(schema.fields.len() + 1);
        let mut primary: Option<&str> = None;

        for field in schema.fields.values() {
            let mut definition = format!(
                "{} {}",
                self.quote_identifier(&field.name),
                self.type_name(field.column_type)
            );
            if !field.is_nullable {
                definition.push_str(" NOT NULL");
            }
            if field.is_primary {
                primary = Some(&field.name);
            }
            definitions.push(definition);
        }

        if let Some(name) = primary {
            definitions.push(format!("PRIMARY KEY ({})", self.quote_identifier(name)));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.quote_identifier(&schema.name),
            definitions.join(", ")
        )
    }

    fn drop_table_sql(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", self.quote_identifier(table))
    }

    fn drop_column_sql(&self, table: &str, column: &str) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN IF EXISTS {}",
            self.quote_identifier(table),
            self.quote_identifier(column)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TableField;

    fn dialect() -> PostgresDialect {
        PostgresDialect::new()
    }

    #[test]
    fn test_add_column() {
        let op = Operation::add_column("due", ColumnType::Date);
        assert_eq!(
            dialect().statement("tasks", &op),
            "ALTER TABLE \"tasks\" ADD COLUMN \"due\" DATE"
        );
    }

    #[test]
    fn test_drop_column() {
        let op = Operation::drop_column("due");
        assert_eq!(
            dialect().statement("tasks", &op),
            "ALTER TABLE \"tasks\" DROP COLUMN IF EXISTS \"due\""
        );
    }

    #[test]
    fn test_alter_column_type_uses_direct_cast() {
        let op = Operation::alter_column_type("note", ColumnType::Text, ColumnType::Varchar);
        assert_eq!(
            dialect().statement("tasks", &op),
            "ALTER TABLE \"tasks\" ALTER COLUMN \"note\" TYPE VARCHAR(255) \
             USING \"note\"::VARCHAR(255)"
        );
    }

    #[test]
    fn test_forced_cast_routes_through_text() {
        let sql = dialect().forced_cast_statement("tasks", "note", ColumnType::Integer);
        assert_eq!(
            sql,
            "ALTER TABLE \"tasks\" ALTER COLUMN \"note\" TYPE INTEGER \
             USING (\"note\"::text)::INTEGER"
        );

        // The forced statement must differ from the safe one.
        let op = Operation::alter_column_type("note", ColumnType::Text, ColumnType::Integer);
        assert_ne!(sql, dialect().statement("tasks", &op));
    }

    #[test]
    fn test_primary_key_statements() {
        let d = dialect();
        assert_eq!(
            d.statement("tasks", &Operation::DropPrimaryKey),
            "ALTER TABLE \"tasks\" DROP CONSTRAINT IF EXISTS \"tasks_pkey\""
        );
        assert_eq!(
            d.statement("tasks", &Operation::add_primary_key("id")),
            "ALTER TABLE \"tasks\" ADD PRIMARY KEY (\"id\")"
        );
    }

    #[test]
    fn test_create_table() {
        let schema = TableSchema::new("tasks")
            .unwrap()
            .field(TableField::new("id", ColumnType::Integer).primary_key())
            .field(TableField::new("title", ColumnType::Varchar).not_null())
            .field(TableField::new("due", ColumnType::Date));

        let sql = dialect().create_table_sql(&schema);
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"tasks\" (\"due\" DATE, \
             \"id\" INTEGER NOT NULL, \"title\" VARCHAR(255) NOT NULL, \
             PRIMARY KEY (\"id\"))"
        );
    }

    #[test]
    fn test_drop_table() {
        assert_eq!(
            dialect().drop_table_sql("tasks"),
            "DROP TABLE IF EXISTS \"tasks\""
        );
    }
}
