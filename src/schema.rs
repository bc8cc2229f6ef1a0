//! Schema metadata snapshots.
//!
//! A [`Schema`] is what introspection produces and what the code generator
//! consumes. It round-trips through JSON so generation can run offline.
//!
//! # Example
//! ```
//! use sqlcraft::schema::Schema;
//!
//! let json = r#"{
//!     "name": "public",
//!     "tables": [{
//!         "name": "users",
//!         "columns": [
//!             { "name": "id", "type": "integer", "primary_key": true },
//!             { "name": "email", "typ": "varchar(255)", "nullable": true }
//!         ]
//!     }]
//! }"#;
//!
//! let schema = Schema::from_json(json).unwrap();
//! assert_eq!(schema.tables[0].columns.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SqlResult;

/// Tables of one database schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub tables: Vec<TableDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    #[default]
    Table,
    View,
}

/// Table definition with columns in ordinal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    #[serde(default)]
    pub kind: TableKind,
    pub columns: Vec<ColumnDef>,
}

/// Column definition with its raw database type text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type", alias = "typ")]
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
}

impl Schema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tables: Vec::new(),
        }
    }

    pub fn add_table(&mut self, table: TableDef) {
        self.tables.push(table);
    }

    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn from_json(json: &str) -> SqlResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> SqlResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_file(path: &Path) -> SqlResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: &Path) -> SqlResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl TableDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: TableKind::Table,
            columns: Vec::new(),
        }
    }

    pub fn view(name: &str) -> Self {
        Self {
            kind: TableKind::View,
            ..Self::new(name)
        }
    }

    pub fn add_column(&mut self, col: ColumnDef) {
        self.columns.push(col);
    }

    /// Builder: add a nullable column.
    pub fn column(mut self, name: &str, data_type: &str) -> Self {
        self.columns.push(ColumnDef::new(name, data_type).nullable(true));
        self
    }

    /// Builder: add a NOT NULL column.
    pub fn required(mut self, name: &str, data_type: &str) -> Self {
        self.columns.push(ColumnDef::new(name, data_type));
        self
    }

    /// Builder: add a primary key column.
    pub fn pk(mut self, name: &str, data_type: &str) -> Self {
        let mut col = ColumnDef::new(name, data_type);
        col.primary_key = true;
        col.unique = true;
        self.columns.push(col);
        self
    }
}

impl ColumnDef {
    /// A NOT NULL column without constraints.
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable: false,
            primary_key: false,
            unique: false,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}
