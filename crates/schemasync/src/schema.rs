//! Schema representation types.
//!
//! [`TableField`] and [`TableSchema`] describe what the caller wants a
//! table to look like; [`LiveColumn`] is what introspection found. The
//! desired types are transient, built per request and discarded when
//! the reconciliation call completes. Live columns are refreshed on
//! every introspection call and never cached, since structural changes
//! invalidate them immediately.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::ident;
use crate::types::ColumnType;

/// A desired column in a table.
///
/// Construction always sanitizes the name and never fails on the name
/// alone: invalid characters become underscores and a leading digit
/// gets an `f_` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableField {
    /// Sanitized column name.
    pub name: String,
    /// Portable column type.
    pub column_type: ColumnType,
    /// Whether this column is the table's primary key.
    pub is_primary: bool,
    /// Whether the column allows NULL values.
    pub is_nullable: bool,
}

impl TableField {
    /// Creates a new field with a sanitized name.
    #[must_use]
    pub fn new(name: impl AsRef<str>, column_type: ColumnType) -> Self {
        Self {
            name: ident::sanitize(name.as_ref()),
            column_type,
            is_primary: false,
            is_nullable: true,
        }
    }

    /// Marks the field as the primary key. Primary keys are NOT NULL.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.is_primary = true;
        self.is_nullable = false;
        self
    }

    /// Marks the field as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }
}

/// A desired table: a name and a set of fields keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name. Must be a valid identifier.
    pub name: String,
    /// Fields keyed by sanitized field name. Keys are unique and
    /// iterate in a stable order.
    pub fields: BTreeMap<String, TableField>,
}

impl TableSchema {
    /// Creates an empty table schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Validation`] if `name` is not a valid
    /// identifier. Table names are validated, not sanitized: a mangled
    /// table name would silently target the wrong table.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !ident::is_valid_identifier(&name) {
            return Err(SchemaError::Validation(format!(
                "invalid table name: '{name}'"
            )));
        }
        Ok(Self {
            name,
            fields: BTreeMap::new(),
        })
    }

    /// Adds a field, keyed by its sanitized name. A field with the
    /// same sanitized name replaces the previous one.
    #[must_use]
    pub fn field(mut self, field: TableField) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Returns the fields marked as primary key.
    pub fn primary_fields(&self) -> impl Iterator<Item = &TableField> {
        self.fields.values().filter(|f| f.is_primary)
    }
}

/// A column as introspected from the live catalog.
///
/// Not user-constructed; produced only by introspection. `is_primary`
/// is true for every column covered by the table's primary-key
/// constraint, including members of a composite key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveColumn {
    /// Column name as stored in the catalog.
    pub name: String,
    /// Portable type mapped from the native type name.
    pub column_type: ColumnType,
    /// Whether the column allows NULL values.
    pub is_nullable: bool,
    /// Whether the column is part of the primary-key constraint.
    pub is_primary: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_name_is_sanitized() {
        let field = TableField::new("order count!", ColumnType::Integer);
        assert_eq!(field.name, "order_count_");

        let field = TableField::new("1st", ColumnType::Date);
        assert_eq!(field.name, "f_1st");
    }

    #[test]
    fn test_field_builder() {
        let field = TableField::new("id", ColumnType::Integer).primary_key();
        assert!(field.is_primary);
        assert!(!field.is_nullable); // primary keys are NOT NULL

        let field = TableField::new("email", ColumnType::Varchar).not_null();
        assert!(!field.is_nullable);
        assert!(!field.is_primary);
    }

    #[test]
    fn test_table_name_validation() {
        assert!(TableSchema::new("users").is_ok());
        assert!(TableSchema::new("_staging").is_ok());

        for bad in ["", "2fast", "has space", "semi;colon"] {
            assert!(
                matches!(TableSchema::new(bad), Err(SchemaError::Validation(_))),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn test_fields_keyed_by_sanitized_name() {
        let schema = TableSchema::new("users")
            .unwrap()
            .field(TableField::new("full name", ColumnType::Text))
            .field(TableField::new("full_name", ColumnType::Varchar));

        // Both sanitize to the same key; the later field wins.
        assert_eq!(schema.fields.len(), 1);
        assert_eq!(
            schema.fields["full_name"].column_type,
            ColumnType::Varchar
        );
    }

    #[test]
    fn test_primary_fields() {
        let schema = TableSchema::new("users")
            .unwrap()
            .field(TableField::new("id", ColumnType::Integer).primary_key())
            .field(TableField::new("name", ColumnType::Text));

        let primaries: Vec<_> = schema.primary_fields().collect();
        assert_eq!(primaries.len(), 1);
        assert_eq!(primaries[0].name, "id");
    }
}
