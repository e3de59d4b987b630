//! Portable column types.
//!
//! [`ColumnType`] abstracts over the native type names PostgreSQL
//! reports in its catalog. The native-to-portable direction is
//! many-to-one and lossy: any native type the enum does not cover
//! collapses to [`ColumnType::Text`]. That is a one-way normalization,
//! not an error.

use serde::{Deserialize, Serialize};

/// Portable column types supported by the reconciliation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Integer (32-bit).
    Integer,
    /// Floating point.
    Float,
    /// Variable-length character string, 255 chars.
    Varchar,
    /// Date only.
    Date,
    /// Date and time.
    Timestamp,
    /// Arbitrary-precision numeric.
    Numeric,
    /// Unbounded text.
    Text,
    /// Boolean.
    Boolean,
    /// `CHARACTER VARYING(255)` spelled out, as the catalog reports it.
    CharacterVarying,
}

impl ColumnType {
    /// All portable types, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Integer,
        Self::Float,
        Self::Varchar,
        Self::Date,
        Self::Timestamp,
        Self::Numeric,
        Self::Text,
        Self::Boolean,
        Self::CharacterVarying,
    ];

    /// Returns the canonical native type name used in DDL.
    #[must_use]
    pub fn to_native(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
            Self::Varchar => "VARCHAR(255)",
            Self::Date => "DATE",
            Self::Timestamp => "TIMESTAMP",
            Self::Numeric => "NUMERIC",
            Self::Text => "TEXT",
            Self::Boolean => "BOOLEAN",
            Self::CharacterVarying => "CHARACTER VARYING(255)",
        }
    }

    /// Maps a native type name to a portable type.
    ///
    /// Total and case-insensitive. Covers both the canonical DDL
    /// spellings and the names `information_schema` actually reports
    /// (`double precision`, `timestamp without time zone`). Unknown
    /// names map to [`ColumnType::Text`]; this default is lossy and
    /// irreversible by design.
    #[must_use]
    pub fn from_native(native: &str) -> Self {
        match native.trim().to_lowercase().as_str() {
            "integer" | "int" | "int4" => Self::Integer,
            "float" | "real" | "double precision" => Self::Float,
            "varchar" | "varchar(255)" => Self::Varchar,
            "date" => Self::Date,
            "timestamp" | "timestamp without time zone" | "timestamp with time zone" => {
                Self::Timestamp
            }
            "numeric" => Self::Numeric,
            "boolean" | "bool" => Self::Boolean,
            "character varying" | "character varying(255)" => Self::CharacterVarying,
            _ => Self::Text,
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_native())
    }
}
