//! Single-pass SQL serialization context.
//!
//! Every top-level build call creates one [`SqlBuilder`], walks the AST into
//! it and calls [`SqlBuilder::finish`]. Nodes append text and bind values;
//! they never return anything. The first error recorded wins and discards
//! the buffer.

use serde::Serialize;
use std::fmt;

use crate::ast::Value;
use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};

/// The statement context an expression is serialized in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementType {
    Select,
    Insert,
    /// The row values of an `INSERT ... VALUES`.
    InsertValues,
    Update,
    /// The right-hand sides of an `UPDATE ... SET`.
    UpdateValues,
    Delete,
}

impl StatementType {
    /// Whether the `DEFAULT` keyword may appear in this context.
    pub fn allows_default(self) -> bool {
        matches!(self, StatementType::InsertValues | StatementType::UpdateValues)
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementType::Select => write!(f, "SELECT"),
            StatementType::Insert | StatementType::InsertValues => write!(f, "INSERT"),
            StatementType::Update | StatementType::UpdateValues => write!(f, "UPDATE"),
            StatementType::Delete => write!(f, "DELETE"),
        }
    }
}

/// Anything that can write itself into a [`SqlBuilder`].
pub trait ToSql {
    fn serialize(&self, statement: StatementType, out: &mut SqlBuilder<'_>);
}

/// Rendered SQL text plus its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Query {
    /// Render the query with every parameter inlined as a literal.
    ///
    /// For logs only. Never execute the result.
    pub fn debug_sql(&self, dialect: &dyn Dialect) -> String {
        let mut out = String::with_capacity(self.sql.len());
        let mut chars = self.sql.chars().peekable();
        let mut next = 0usize;
        let mut quote: Option<char> = None;
        let numbered = dialect.placeholder(1) != dialect.placeholder(2);

        while let Some(c) = chars.next() {
            if let Some(q) = quote {
                out.push(c);
                if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '"' | '`' => {
                    quote = Some(c);
                    out.push(c);
                }
                '$' if numbered => {
                    let mut digits = String::new();
                    while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                        digits.push(*d);
                        chars.next();
                    }
                    let param = digits
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|i| self.params.get(i));
                    match param {
                        Some(value) => out.push_str(&value.to_sql_literal(dialect)),
                        None => {
                            out.push('$');
                            out.push_str(&digits);
                        }
                    }
                }
                '?' if !numbered => {
                    match self.params.get(next) {
                        Some(value) => out.push_str(&value.to_sql_literal(dialect)),
                        None => out.push('?'),
                    }
                    next += 1;
                }
                _ => out.push(c),
            }
        }
        out
    }
}

/// Mutable state for one serialization pass.
pub struct SqlBuilder<'d> {
    dialect: &'d dyn Dialect,
    statement: StatementType,
    buf: String,
    params: Vec<Value>,
    counter: usize,
    error: Option<SqlError>,
}

impl<'d> SqlBuilder<'d> {
    pub fn new(dialect: &'d dyn Dialect, statement: StatementType) -> Self {
        Self {
            dialect,
            statement,
            buf: String::with_capacity(128),
            params: Vec::new(),
            counter: 0,
            error: None,
        }
    }

    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    /// The top-level statement this pass was started for.
    pub fn statement(&self) -> StatementType {
        self.statement
    }

    pub fn write(&mut self, sql: &str) {
        self.buf.push_str(sql);
    }

    /// Write one identifier part, quoted by the dialect if needed.
    pub fn write_ident(&mut self, name: &str) {
        if name == "*" {
            self.buf.push('*');
            return;
        }
        let quoted = self.dialect.quote_identifier(name);
        self.buf.push_str(&quoted);
    }

    /// Allocate the next placeholder for `value`.
    ///
    /// Token and parameter are appended together so their counts never drift.
    pub fn bind(&mut self, value: Value) {
        self.counter += 1;
        let token = self.dialect.placeholder(self.counter);
        self.buf.push_str(&token);
        self.params.push(value);
    }

    /// Record an error. Only the first one is kept.
    pub fn fail(&mut self, error: SqlError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub fn fail_unsupported(&mut self, construct: impl Into<String>, statement: StatementType) {
        self.fail(SqlError::unsupported(construct, statement));
    }

    /// Number of placeholders allocated so far.
    pub fn param_count(&self) -> usize {
        self.counter
    }

    /// Serialize a comma-separated list.
    pub fn write_list<T: ToSql>(&mut self, items: &[T], statement: StatementType) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.buf.push_str(", ");
            }
            item.serialize(statement, self);
        }
    }

    pub fn finish(self) -> SqlResult<Query> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(Query {
                sql: self.buf,
                params: self.params,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MYSQL, POSTGRES};

    #[test]
    fn test_bind_numbers_placeholders() {
        let mut out = SqlBuilder::new(&POSTGRES, StatementType::Select);
        out.write("a = ");
        out.bind(Value::Int(1));
        out.write(" AND b = ");
        out.bind(Value::Text("x".into()));
        let query = out.finish().unwrap();
        assert_eq!(query.sql, "a = $1 AND b = $2");
        assert_eq!(query.params.len(), 2);
    }

    #[test]
    fn test_first_error_wins() {
        let mut out = SqlBuilder::new(&POSTGRES, StatementType::Select);
        out.fail_unsupported("DEFAULT", StatementType::Select);
        out.fail_unsupported("RETURNING", StatementType::Select);
        out.write("SELECT 1");
        let err = out.finish().unwrap_err();
        assert!(err.to_string().ends_with("DEFAULT"));
    }

    #[test]
    fn test_param_count_tracks_placeholders() {
        let mut out = SqlBuilder::new(&MYSQL, StatementType::Select);
        assert_eq!(out.param_count(), 0);
        out.write("a IN (");
        for n in 0..3 {
            if n > 0 {
                out.write(", ");
            }
            out.bind(Value::Int(n));
        }
        out.write(")");
        assert_eq!(out.param_count(), 3);

        let count = out.param_count();
        let query = out.finish().unwrap();
        assert_eq!(query.sql, "a IN (?, ?, ?)");
        assert_eq!(query.sql.matches('?').count(), count);
        assert_eq!(query.params.len(), count);
    }

    #[test]
    fn test_default_context() {
        assert!(StatementType::InsertValues.allows_default());
        assert!(StatementType::UpdateValues.allows_default());
        assert!(!StatementType::Select.allows_default());
        assert!(!StatementType::Insert.allows_default());
    }

    #[test]
    fn test_debug_sql_inlines_params() {
        let query = Query {
            sql: "SELECT * FROM t WHERE a = $1 AND b = $2".to_string(),
            params: vec![Value::Int(7), Value::Text("it's".into())],
        };
        assert_eq!(
            query.debug_sql(&POSTGRES),
            "SELECT * FROM t WHERE a = 7 AND b = 'it''s'"
        );

        let query = Query {
            sql: "SELECT `a?` FROM t WHERE a = ? AND b = ?".to_string(),
            params: vec![Value::Bool(true), Value::Null],
        };
        assert_eq!(
            query.debug_sql(&MYSQL),
            "SELECT `a?` FROM t WHERE a = 1 AND b = NULL"
        );
    }
}
