use super::types::{RustType, SqlType};
use super::{Dialect, needs_quoting, quote_with};

/// SQLite. Declared types follow the affinity rules of section 3.1 of the
/// SQLite datatype documentation rather than an exact name table.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, name: &str) -> String {
        if needs_quoting(name, false) {
            quote_with(name, '"')
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
        match (limit, offset) {
            (Some(n), Some(m)) => format!(" LIMIT {} OFFSET {}", n, m),
            (Some(n), None) => format!(" LIMIT {}", n),
            (None, Some(m)) => format!(" LIMIT -1 OFFSET {}", m),
            (None, None) => String::new(),
        }
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn map_type(&self, ty: &SqlType) -> RustType {
        let name = ty.name.as_str();
        let scalar = match name {
            "boolean" | "bool" => RustType::Bool,
            "date" => RustType::Date,
            "datetime" | "timestamp" => RustType::Timestamp,
            "json" => RustType::Json,
            _ if name.contains("int") => RustType::I64,
            _ if name.contains("char") || name.contains("clob") || name.contains("text") => {
                RustType::String
            }
            _ if name.contains("blob") || name.is_empty() => RustType::Bytes,
            _ if name.contains("real") || name.contains("floa") || name.contains("doub") => {
                RustType::F64
            }
            _ => RustType::Untyped,
        };
        scalar.nested(ty.array_dims)
    }
}
