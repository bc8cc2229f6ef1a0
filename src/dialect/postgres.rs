use super::types::{RustType, SqlType};
use super::{Dialect, needs_quoting, quote_with};

/// PostgreSQL: `$n` placeholders, double-quoted identifiers, case-folding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, name: &str) -> String {
        if needs_quoting(name, true) {
            quote_with(name, '"')
        } else {
            name.to_string()
        }
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "TRUE" } else { "FALSE" }
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn map_type(&self, ty: &SqlType) -> RustType {
        if ty.is_array() {
            return RustType::Array(Box::new(self.map_type(&ty.element())));
        }
        // udt names spell arrays as `_int4`
        if let Some(element) = ty.name.strip_prefix('_') {
            let inner = SqlType {
                name: element.to_string(),
                ..ty.clone()
            };
            return RustType::Array(Box::new(self.map_type(&inner)));
        }

        match ty.name.as_str() {
            "boolean" | "bool" => RustType::Bool,
            "smallint" | "int2" | "smallserial" | "serial2" => RustType::I16,
            "integer" | "int" | "int4" | "serial" | "serial4" => RustType::I32,
            "bigint" | "int8" | "bigserial" | "serial8" => RustType::I64,
            "real" | "float4" => RustType::F32,
            "double precision" | "float8" | "numeric" | "decimal" | "money" => RustType::F64,
            "text" | "varchar" | "character varying" | "character" | "char" | "bpchar"
            | "name" | "citext" | "interval" | "inet" | "cidr" | "macaddr" | "xml" => {
                RustType::String
            }
            "bytea" => RustType::Bytes,
            "uuid" => RustType::Uuid,
            "date" => RustType::Date,
            "time" | "time without time zone" | "timetz" | "time with time zone" => {
                RustType::Time
            }
            "timestamp" | "timestamp without time zone" => RustType::Timestamp,
            "timestamptz" | "timestamp with time zone" => RustType::TimestampTz,
            "json" | "jsonb" => RustType::Json,
            _ => RustType::Untyped,
        }
    }
}
