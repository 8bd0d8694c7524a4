use std::collections::HashSet;

/// Column data type
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    Integer,
    Text,
    /// RFC 3339 timestamp stored as text
    Timestamp,
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    /// SQL literal used as the column default
    pub default: Option<&'static str>,
    /// Allowed values, rendered as a CHECK constraint
    pub one_of: &'static [&'static str],
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
            primary_key: false,
            unique: false,
            default: None,
            one_of: &[],
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            nullable: false,
            ..Self::new(name, col_type)
        }
    }

    /// Create an integer primary key. Values are assigned by SQLite unless the
    /// insert supplies one explicitly.
    pub const fn primary(name: &'static str) -> Self {
        Self {
            primary_key: true,
            ..Self::required(name, ColumnType::Integer)
        }
    }

    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    pub const fn default(self, literal: &'static str) -> Self {
        Self {
            default: Some(literal),
            ..self
        }
    }

    pub const fn one_of(self, values: &'static [&'static str]) -> Self {
        Self {
            one_of: values,
            ..self
        }
    }
}

/// What happens to a referencing row when its parent is deleted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OnDelete {
    Cascade,
    SetNull,
}

impl OnDelete {
    pub fn as_sql(self) -> &'static str {
        match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::SetNull => "SET NULL",
        }
    }
}

/// Foreign key reference
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
    pub on_delete: OnDelete,
}

impl ForeignKey {
    pub const fn cascade(column: &'static str, references_table: &'static str) -> Self {
        Self {
            column,
            references_table,
            references_column: "id",
            on_delete: OnDelete::Cascade,
        }
    }

    pub const fn set_null(column: &'static str, references_table: &'static str) -> Self {
        Self {
            column,
            references_table,
            references_column: "id",
            on_delete: OnDelete::SetNull,
        }
    }

    /// Point the reference at a column other than `id`
    pub const fn to_column(self, references_column: &'static str) -> Self {
        Self {
            references_column,
            ..self
        }
    }
}

/// Index definition
#[derive(Debug, Clone)]
pub struct Index {
    pub columns: &'static [&'static str],
    pub unique: bool,
}

impl Index {
    /// Create a non-unique index
    pub const fn on(columns: &'static [&'static str]) -> Self {
        Self {
            columns,
            unique: false,
        }
    }

    /// Create a unique index
    pub const fn unique(columns: &'static [&'static str]) -> Self {
        Self {
            columns,
            unique: true,
        }
    }
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    /// Fixture file that feeds this table, if any
    pub source_file: Option<&'static str>,
    pub columns: &'static [Column],
    pub foreign_keys: &'static [ForeignKey],
    /// Explicit index definitions
    pub indexes: &'static [Index],
}

impl TableSchema {
    /// Get all tables this table depends on (FK parents)
    pub fn dependencies(&self) -> HashSet<&'static str> {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table)
            .collect()
    }
}
