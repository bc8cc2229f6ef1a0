//! SQL dialects.
//!
//! A [`Dialect`] describes every textual difference between database engines
//! that the serializer and the code generator care about. Nothing outside
//! this module branches on which engine is targeted.

pub mod mysql;
pub mod postgres;
pub mod sqlite;
pub mod types;

use std::fmt;

pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;
pub use types::{RustType, SqlType};

use crate::statement::JoinKind;

/// PostgreSQL dialect instance.
pub static POSTGRES: Postgres = Postgres;
/// MySQL / MariaDB dialect instance.
pub static MYSQL: MySql = MySql;
/// SQLite dialect instance.
pub static SQLITE: Sqlite = Sqlite;

/// SQL reserved words that must be quoted when used as identifiers.
pub const RESERVED_WORDS: &[&str] = &[
    "all", "alter", "and", "as", "asc", "between", "by", "case", "check", "column", "constraint",
    "create", "cross", "default", "delete", "desc", "distinct", "drop", "else", "end", "exists",
    "false", "foreign", "from", "full", "group", "having", "in", "index", "inner", "insert",
    "into", "is", "join", "key", "left", "like", "limit", "not", "null", "offset", "on", "or",
    "order", "outer", "primary", "references", "returning", "right", "select", "set", "table",
    "then", "true", "union", "unique", "update", "user", "using", "values", "when", "where",
];

/// Per-engine SQL text variations.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Short engine name (`postgres`, `mysql`, `sqlite`).
    fn name(&self) -> &'static str;

    /// Quote a single identifier part (no dots) if it needs quoting.
    fn quote_identifier(&self, name: &str) -> String;

    /// Placeholder token for the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String;

    fn bool_literal(&self, value: bool) -> &'static str;

    fn null_literal(&self) -> &'static str {
        "NULL"
    }

    /// Render the LIMIT/OFFSET tail, including its leading space.
    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        let mut sql = String::new();
        if let Some(n) = limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }
        if let Some(n) = offset {
            sql.push_str(&format!(" OFFSET {}", n));
        }
        sql
    }

    /// Infix string concatenation operator, or `None` to render `CONCAT(a, b)`.
    fn concat_operator(&self) -> Option<&'static str> {
        Some("||")
    }

    fn supports_returning(&self) -> bool;

    fn supports_join(&self, kind: JoinKind) -> bool {
        let _ = kind;
        true
    }

    /// Map a parsed database type to the closest Rust type.
    fn map_type(&self, ty: &SqlType) -> RustType;
}

/// Resolve a dialect by name.
pub fn by_name(name: &str) -> Option<&'static dyn Dialect> {
    match name.to_ascii_lowercase().as_str() {
        "postgres" | "postgresql" | "pg" => Some(&POSTGRES),
        "mysql" | "mariadb" => Some(&MYSQL),
        "sqlite" | "sqlite3" => Some(&SQLITE),
        _ => None,
    }
}

/// Whether an identifier part has to be quoted to survive as written.
///
/// `fold_sensitive` marks engines that fold unquoted names to lower case, where
/// any upper-case letter also forces quoting.
pub(crate) fn needs_quoting(name: &str, fold_sensitive: bool) -> bool {
    let lower = name.to_ascii_lowercase();
    name.is_empty()
        || RESERVED_WORDS.contains(&lower.as_str())
        || name.chars().any(|c| !c.is_ascii_alphanumeric() && c != '_')
        || name.chars().next().is_some_and(|c| c.is_ascii_digit())
        || (fold_sensitive && name.chars().any(|c| c.is_ascii_uppercase()))
}

/// Wrap `name` in `quote`, doubling any embedded quote characters.
pub(crate) fn quote_with(name: &str, quote: char) -> String {
    let doubled: String = [quote, quote].iter().collect();
    format!("{q}{}{q}", name.replace(quote, &doubled), q = quote)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(by_name("PostgreSQL").map(|d| d.name()), Some("postgres"));
        assert_eq!(by_name("mariadb").map(|d| d.name()), Some("mysql"));
        assert_eq!(by_name("sqlite3").map(|d| d.name()), Some("sqlite"));
        assert!(by_name("oracle").is_none());
    }

    #[test]
    fn test_needs_quoting() {
        assert!(!needs_quoting("users", true));
        assert!(needs_quoting("order", false));
        assert!(needs_quoting("user name", false));
        assert!(needs_quoting("2fa", false));
        assert!(needs_quoting("userId", true));
        assert!(!needs_quoting("userId", false));
    }

    #[test]
    fn test_quote_with_doubles_embedded_quotes() {
        assert_eq!(quote_with("a\"b", '"'), "\"a\"\"b\"");
        assert_eq!(quote_with("a`b", '`'), "`a``b`");
    }
}
