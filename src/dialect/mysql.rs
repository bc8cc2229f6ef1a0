use super::types::{RustType, SqlType};
use super::{Dialect, needs_quoting, quote_with};
use crate::statement::JoinKind;

/// MySQL and MariaDB.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, name: &str) -> String {
        if needs_quoting(name, false) {
            quote_with(name, '`')
        } else {
            name.to_string()
        }
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        // MySQL has no OFFSET without LIMIT; the documented idiom is the max row count
        match (limit, offset) {
            (Some(n), Some(m)) => format!(" LIMIT {} OFFSET {}", n, m),
            (Some(n), None) => format!(" LIMIT {}", n),
            (None, Some(m)) => format!(" LIMIT 18446744073709551615 OFFSET {}", m),
            (None, None) => String::new(),
        }
    }

    fn concat_operator(&self) -> Option<&'static str> {
        None
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn supports_join(&self, kind: JoinKind) -> bool {
        kind != JoinKind::Full
    }

    fn map_type(&self, ty: &SqlType) -> RustType {
        let scalar = match (ty.name.as_str(), ty.unsigned) {
            ("tinyint", false) if ty.modifiers == [1] => RustType::Bool,
            ("bool" | "boolean", _) => RustType::Bool,
            ("tinyint", false) => RustType::I8,
            ("tinyint", true) => RustType::U8,
            ("smallint", false) => RustType::I16,
            ("smallint", true) => RustType::U16,
            ("mediumint" | "int" | "integer", false) => RustType::I32,
            ("mediumint" | "int" | "integer", true) => RustType::U32,
            ("bigint", false) => RustType::I64,
            ("bigint", true) => RustType::U64,
            ("float", _) => RustType::F32,
            ("double" | "double precision" | "real" | "decimal" | "numeric", _) => RustType::F64,
            ("char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" | "enum"
            | "set", _) => RustType::String,
            ("binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob", _) => {
                RustType::Bytes
            }
            ("date", _) => RustType::Date,
            ("time", _) => RustType::Time,
            ("datetime", _) => RustType::Timestamp,
            ("timestamp", _) => RustType::TimestampTz,
            ("json", _) => RustType::Json,
            _ => RustType::Untyped,
        };
        scalar.nested(ty.array_dims)
    }
}
