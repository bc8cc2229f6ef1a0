//! Literal and leaf builders.

use crate::ast::keywords::{DEFAULT, NULL, STAR};
use crate::ast::{ColumnRef, Expr, Value};
use crate::statement::SelectStatement;

/// Column reference from a dotted path (`col`, `table.col`, `schema.table.col`).
pub fn col(path: &str) -> Expr {
    Expr::Column(ColumnRef::parse(path))
}

/// Integer literal, bound as a parameter.
pub fn int(value: i64) -> Expr {
    Expr::Literal(Value::Int(value))
}

pub fn float(value: f64) -> Expr {
    Expr::Literal(Value::Float(value))
}

/// String literal, bound as a parameter.
pub fn text(value: &str) -> Expr {
    Expr::Literal(Value::Text(value.to_string()))
}

/// Any bindable value.
pub fn value(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

/// Alias of [`value`] for call sites that read better as "parameter".
pub fn param(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

/// The `NULL` keyword.
pub fn null() -> Expr {
    Expr::Keyword(&NULL)
}

/// The `*` wildcard.
pub fn star() -> Expr {
    Expr::Keyword(&STAR)
}

/// The `DEFAULT` keyword, only valid in INSERT rows and UPDATE SET values.
pub fn default_value() -> Expr {
    Expr::Keyword(&DEFAULT)
}

/// Inline `TRUE`/`FALSE` in the dialect's spelling; never bound.
pub fn constant(value: bool) -> Expr {
    Expr::Constant(value)
}

/// `CAST(expr AS type_name)`
pub fn cast(expr: impl Into<Expr>, type_name: &str) -> Expr {
    let expr: Expr = expr.into();
    expr.cast(type_name)
}

/// Parenthesized list `(a, b, c)`.
pub fn list<V: Into<Expr>>(items: impl IntoIterator<Item = V>) -> Expr {
    Expr::List(items.into_iter().map(Into::into).collect())
}

/// `EXISTS (SELECT ...)`
pub fn exists(query: SelectStatement) -> Expr {
    Expr::Exists(Box::new(query))
}

/// Scalar sub-select `(SELECT ...)`.
pub fn subquery(query: SelectStatement) -> Expr {
    Expr::Subquery(Box::new(query))
}
