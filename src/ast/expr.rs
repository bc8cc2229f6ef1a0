use std::ops;

use super::keywords::Keyword;
use super::operators::{
    ATOM_PRECEDENCE, BETWEEN_PRECEDENCE, BinaryOp, COMPARISON_PRECEDENCE, SortOrder, UnaryOp,
};
use super::values::Value;
use crate::dialect::Dialect;
use crate::dialect::types::is_cast_type;
use crate::error::SqlResult;
use crate::serializer::{Query, SqlBuilder, StatementType, ToSql};
use crate::statement::{OrderBy, Projection, SelectStatement};

/// A column reference, optionally qualified (`table.col`, `schema.table.col`).
///
/// Each qualifier part is one identifier and is quoted on its own, so a
/// table literally named `my.table` stays a single part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub qualifier: Vec<String>,
    pub name: String,
}

impl ColumnRef {
    /// Split a dotted path; everything before the last dot is the qualifier.
    pub fn parse(path: &str) -> Self {
        match path.rsplit_once('.') {
            Some((qualifier, name)) => Self {
                qualifier: qualifier.split('.').map(str::to_string).collect(),
                name: name.to_string(),
            },
            None => Self {
                qualifier: Vec::new(),
                name: path.to_string(),
            },
        }
    }
}

/// `CASE [subject] WHEN .. THEN .. [ELSE ..] END`
#[derive(Debug, Clone, PartialEq)]
pub struct CaseExpr {
    pub subject: Option<Expr>,
    pub arms: Vec<(Expr, Expr)>,
    pub otherwise: Option<Expr>,
}

/// An SQL-valued expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Bound as a parameter, except `Value::Null` which renders inline.
    Literal(Value),
    Keyword(&'static Keyword),
    Column(ColumnRef),
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Between {
        operand: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },
    Func {
        name: String,
        args: Vec<Expr>,
    },
    /// `INTERVAL $n`: a typed literal whose text is always bound.
    TypedLiteral {
        keyword: &'static str,
        value: Value,
    },
    Case(Box<CaseExpr>),
    /// Parenthesized, comma-separated list, e.g. the right side of IN.
    List(Vec<Expr>),
    Cast {
        expr: Box<Expr>,
        type_name: String,
    },
    Subquery(Box<SelectStatement>),
    Exists(Box<SelectStatement>),
    /// Inline boolean literal in the dialect's spelling.
    Constant(bool),
}

impl Expr {
    pub fn precedence(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Unary { op, .. } => op.precedence(),
            Expr::Between { .. } => BETWEEN_PRECEDENCE,
            _ => ATOM_PRECEDENCE,
        }
    }

    /// Serialize a standalone expression in SELECT context.
    pub fn render(&self, dialect: &dyn Dialect) -> SqlResult<Query> {
        let mut out = SqlBuilder::new(dialect, StatementType::Select);
        self.serialize(StatementType::Select, &mut out);
        out.finish()
    }

    fn binary(self, op: BinaryOp, right: impl Into<Expr>) -> Expr {
        Expr::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right.into()),
        }
    }

    fn unary(self, op: UnaryOp) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(self),
        }
    }

    pub fn eq(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Eq, other)
    }

    pub fn not_eq(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::NotEq, other)
    }

    pub fn lt(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Lt, other)
    }

    pub fn lt_eq(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::LtEq, other)
    }

    pub fn gt(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Gt, other)
    }

    pub fn gt_eq(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::GtEq, other)
    }

    pub fn and(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::And, other)
    }

    pub fn or(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Or, other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Add, other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn sub(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Sub, other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn mul(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Mul, other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn div(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Div, other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn rem(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Mod, other)
    }

    /// String concatenation: `a || b`, or `CONCAT(a, b)` where `||` is not concat.
    pub fn concat(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Concat, other)
    }

    pub fn like(self, pattern: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Like, pattern)
    }

    pub fn not_like(self, pattern: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::NotLike, pattern)
    }

    pub fn in_list<V: Into<Expr>>(self, values: impl IntoIterator<Item = V>) -> Expr {
        let list = Expr::List(values.into_iter().map(Into::into).collect());
        self.binary(BinaryOp::In, list)
    }

    pub fn not_in_list<V: Into<Expr>>(self, values: impl IntoIterator<Item = V>) -> Expr {
        let list = Expr::List(values.into_iter().map(Into::into).collect());
        self.binary(BinaryOp::NotIn, list)
    }

    pub fn in_subquery(self, query: SelectStatement) -> Expr {
        self.binary(BinaryOp::In, Expr::Subquery(Box::new(query)))
    }

    pub fn not_in_subquery(self, query: SelectStatement) -> Expr {
        self.binary(BinaryOp::NotIn, Expr::Subquery(Box::new(query)))
    }

    pub fn between(self, low: impl Into<Expr>, high: impl Into<Expr>) -> Expr {
        Expr::Between {
            operand: Box::new(self),
            low: Box::new(low.into()),
            high: Box::new(high.into()),
            negated: false,
        }
    }

    pub fn not_between(self, low: impl Into<Expr>, high: impl Into<Expr>) -> Expr {
        Expr::Between {
            operand: Box::new(self),
            low: Box::new(low.into()),
            high: Box::new(high.into()),
            negated: true,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Expr {
        self.unary(UnaryOp::Not)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn neg(self) -> Expr {
        self.unary(UnaryOp::Neg)
    }

    pub fn is_null(self) -> Expr {
        self.unary(UnaryOp::IsNull)
    }

    pub fn is_not_null(self) -> Expr {
        self.unary(UnaryOp::IsNotNull)
    }

    /// `CAST(self AS type_name)`
    pub fn cast(self, type_name: impl Into<String>) -> Expr {
        Expr::Cast {
            expr: Box::new(self),
            type_name: type_name.into(),
        }
    }

    /// Projection with an `AS` alias.
    pub fn alias(self, name: impl Into<String>) -> Projection {
        Projection {
            expr: self,
            alias: Some(name.into()),
        }
    }

    pub fn asc(self) -> OrderBy {
        OrderBy {
            expr: self,
            order: Some(SortOrder::Asc),
        }
    }

    pub fn desc(self) -> OrderBy {
        OrderBy {
            expr: self,
            order: Some(SortOrder::Desc),
        }
    }
}

/// Function and type names go into the SQL text verbatim, so only plain
/// identifiers are accepted.
pub(crate) fn is_plain_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn write_operand(
    child: &Expr,
    parent: u8,
    right_side: bool,
    statement: StatementType,
    out: &mut SqlBuilder<'_>,
) {
    let own = child.precedence();
    let wrap = own < parent
        || (own == parent && (right_side || parent == COMPARISON_PRECEDENCE));
    if wrap {
        out.write("(");
    }
    child.serialize(statement, out);
    if wrap {
        out.write(")");
    }
}

fn write_binary(
    left: &Expr,
    op: BinaryOp,
    right: &Expr,
    statement: StatementType,
    out: &mut SqlBuilder<'_>,
) {
    if op == BinaryOp::Concat && out.dialect().concat_operator().is_none() {
        out.write("CONCAT(");
        left.serialize(statement, out);
        out.write(", ");
        right.serialize(statement, out);
        out.write(")");
        return;
    }

    let prec = op.precedence();
    write_operand(left, prec, false, statement, out);
    out.write(" ");
    match op {
        BinaryOp::Concat => {
            let symbol = out.dialect().concat_operator().unwrap_or("||");
            out.write(symbol);
        }
        _ => out.write(op.symbol()),
    }
    out.write(" ");

    if matches!(op, BinaryOp::In | BinaryOp::NotIn) {
        match right {
            Expr::List(items) if items.is_empty() => {
                out.fail_unsupported("empty IN list", statement);
                out.write("()");
            }
            Expr::List(_) | Expr::Subquery(_) => right.serialize(statement, out),
            _ => {
                out.write("(");
                right.serialize(statement, out);
                out.write(")");
            }
        }
        return;
    }
    write_operand(right, prec, true, statement, out);
}

impl ToSql for ColumnRef {
    fn serialize(&self, _statement: StatementType, out: &mut SqlBuilder<'_>) {
        for part in &self.qualifier {
            out.write_ident(part);
            out.write(".");
        }
        out.write_ident(&self.name);
    }
}

impl ToSql for CaseExpr {
    fn serialize(&self, statement: StatementType, out: &mut SqlBuilder<'_>) {
        if self.arms.is_empty() {
            out.fail_unsupported("CASE without WHEN", statement);
        }
        out.write("(CASE");
        if let Some(subject) = &self.subject {
            out.write(" ");
            subject.serialize(statement, out);
        }
        for (condition, result) in &self.arms {
            out.write(" WHEN ");
            condition.serialize(statement, out);
            out.write(" THEN ");
            result.serialize(statement, out);
        }
        if let Some(otherwise) = &self.otherwise {
            out.write(" ELSE ");
            otherwise.serialize(statement, out);
        }
        out.write(" END)");
    }
}

impl ToSql for Expr {
    fn serialize(&self, statement: StatementType, out: &mut SqlBuilder<'_>) {
        match self {
            Expr::Literal(Value::Null) => {
                let null = out.dialect().null_literal();
                out.write(null);
            }
            Expr::Literal(value) => out.bind(value.clone()),
            Expr::Keyword(keyword) => keyword.serialize(statement, out),
            Expr::Column(column) => column.serialize(statement, out),
            Expr::Binary { left, op, right } => write_binary(left, *op, right, statement, out),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Not => {
                    out.write("NOT ");
                    write_operand(operand, op.precedence(), false, statement, out);
                }
                UnaryOp::Neg => {
                    out.write("-");
                    write_operand(operand, op.precedence(), true, statement, out);
                }
                UnaryOp::IsNull => {
                    write_operand(operand, op.precedence(), true, statement, out);
                    out.write(" IS NULL");
                }
                UnaryOp::IsNotNull => {
                    write_operand(operand, op.precedence(), true, statement, out);
                    out.write(" IS NOT NULL");
                }
            },
            Expr::Between {
                operand,
                low,
                high,
                negated,
            } => {
                write_operand(operand, BETWEEN_PRECEDENCE, true, statement, out);
                out.write(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                write_operand(low, BETWEEN_PRECEDENCE, true, statement, out);
                out.write(" AND ");
                write_operand(high, BETWEEN_PRECEDENCE, true, statement, out);
            }
            Expr::Func { name, args } => {
                if is_plain_name(name) {
                    out.write(name);
                } else {
                    out.fail_unsupported(format!("function name '{}'", name), statement);
                }
                out.write("(");
                out.write_list(args, statement);
                out.write(")");
            }
            Expr::TypedLiteral { keyword, value } => {
                out.write(keyword);
                out.write(" ");
                out.bind(value.clone());
            }
            Expr::Case(case) => case.serialize(statement, out),
            Expr::List(items) => {
                out.write("(");
                out.write_list(items, statement);
                out.write(")");
            }
            Expr::Cast { expr, type_name } => {
                out.write("CAST(");
                expr.serialize(statement, out);
                out.write(" AS ");
                if is_cast_type(type_name) {
                    out.write(type_name);
                } else {
                    out.fail_unsupported(format!("type name '{}'", type_name), statement);
                }
                out.write(")");
            }
            Expr::Subquery(query) => {
                out.write("(");
                query.write_select(out);
                out.write(")");
            }
            Expr::Exists(query) => {
                out.write("EXISTS (");
                query.write_select(out);
                out.write(")");
            }
            Expr::Constant(b) => {
                let literal = out.dialect().bool_literal(*b);
                out.write(literal);
            }
        }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Literal(value)
    }
}

impl From<&'static Keyword> for Expr {
    fn from(keyword: &'static Keyword) -> Self {
        Expr::Keyword(keyword)
    }
}

impl From<SelectStatement> for Expr {
    fn from(query: SelectStatement) -> Self {
        Expr::Subquery(Box::new(query))
    }
}

macro_rules! literal_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Expr {
                fn from(v: $t) -> Self {
                    Expr::Literal(Value::from(v))
                }
            }
        )*
    };
}

literal_from!(
    bool,
    i16,
    i32,
    i64,
    u32,
    f32,
    f64,
    &str,
    String,
    uuid::Uuid,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>
);

impl<R: Into<Expr>> ops::Add<R> for Expr {
    type Output = Expr;

    fn add(self, rhs: R) -> Expr {
        self.binary(BinaryOp::Add, rhs)
    }
}

impl<R: Into<Expr>> ops::Sub<R> for Expr {
    type Output = Expr;

    fn sub(self, rhs: R) -> Expr {
        self.binary(BinaryOp::Sub, rhs)
    }
}

impl<R: Into<Expr>> ops::Mul<R> for Expr {
    type Output = Expr;

    fn mul(self, rhs: R) -> Expr {
        self.binary(BinaryOp::Mul, rhs)
    }
}

impl<R: Into<Expr>> ops::Div<R> for Expr {
    type Output = Expr;

    fn div(self, rhs: R) -> Expr {
        self.binary(BinaryOp::Div, rhs)
    }
}

impl<R: Into<Expr>> ops::Rem<R> for Expr {
    type Output = Expr;

    fn rem(self, rhs: R) -> Expr {
        self.binary(BinaryOp::Mod, rhs)
    }
}

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        self.unary(UnaryOp::Not)
    }
}

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.unary(UnaryOp::Neg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{col, constant, count_star, func, int, interval, null, text};
    use crate::dialect::{MYSQL, POSTGRES, SQLITE};

    fn pg(expr: Expr) -> String {
        expr.render(&POSTGRES).unwrap().sql
    }

    #[test]
    fn test_column_paths() {
        assert_eq!(pg(col("id")), "id");
        assert_eq!(pg(col("users.id")), "users.id");
        assert_eq!(pg(col("public.users.id")), "public.users.id");
        assert_eq!(pg(col("users.order")), "users.\"order\"");
        assert_eq!(pg(col("users.*")), "users.*");
        assert_eq!(pg(col("public.Order.id")), "public.\"Order\".id");
    }

    #[test]
    fn test_precedence_parens() {
        let e = col("a").add(col("b")).mul(col("c"));
        assert_eq!(pg(e), "(a + b) * c");

        let e = col("a").mul(col("b")).add(col("c"));
        assert_eq!(pg(e), "a * b + c");

        let e = col("a").sub(col("b").sub(col("c")));
        assert_eq!(pg(e), "a - (b - c)");

        let e = col("x").eq(1).or(col("y").eq(2)).and(col("z").eq(3));
        assert_eq!(pg(e), "(x = $1 OR y = $2) AND z = $3");

        let e = col("x").eq(1).and(col("y").eq(2)).or(col("z").eq(3));
        assert_eq!(pg(e), "x = $1 AND y = $2 OR z = $3");
    }

    #[test]
    fn test_nested_comparisons_are_parenthesized() {
        let e = col("a").gt(col("b")).eq(col("c").gt(col("d")));
        assert_eq!(pg(e), "(a > b) = (c > d)");

        let e = col("a").is_null().eq(constant(true));
        assert_eq!(pg(e), "(a IS NULL) = TRUE");

        let e = col("a").between(1, 2).eq(constant(false));
        assert_eq!(pg(e), "(a BETWEEN $1 AND $2) = FALSE");

        let e = col("a").add(1).eq(col("b"));
        assert_eq!(pg(e), "a + $1 = b");
    }

    #[test]
    fn test_unary() {
        assert_eq!(pg(col("a").eq(1).and(col("b").eq(2)).not()), "NOT (a = $1 AND b = $2)");
        assert_eq!(pg(col("a").is_null()), "a IS NULL");
        assert_eq!(pg(col("a").eq(1).is_not_null()), "(a = $1) IS NOT NULL");
        assert_eq!(pg(-(-col("a"))), "-(-a)");
    }

    #[test]
    fn test_ops_traits() {
        let e = (col("a") + 1) * 2;
        assert_eq!(pg(e), "(a + $1) * $2");
    }

    #[test]
    fn test_in_and_between() {
        let q = col("id").in_list([1, 2, 3]).render(&POSTGRES).unwrap();
        assert_eq!(q.sql, "id IN ($1, $2, $3)");
        assert_eq!(q.params.len(), 3);

        assert_eq!(pg(col("age").between(18, 65)), "age BETWEEN $1 AND $2");
        assert_eq!(pg(col("age").not_between(1, 2)), "age NOT BETWEEN $1 AND $2");
    }

    #[test]
    fn test_empty_in_list_fails() {
        let err = col("id").in_list(Vec::<i64>::new()).render(&POSTGRES).unwrap_err();
        assert!(err.to_string().contains("empty IN list"));
    }

    #[test]
    fn test_null_renders_inline() {
        let q = col("a").eq(Value::Null).render(&POSTGRES).unwrap();
        assert_eq!(q.sql, "a = NULL");
        assert!(q.params.is_empty());
        assert_eq!(pg(null()), "NULL");
    }

    #[test]
    fn test_constant_per_dialect() {
        assert_eq!(constant(true).render(&POSTGRES).unwrap().sql, "TRUE");
        assert_eq!(constant(true).render(&MYSQL).unwrap().sql, "1");
        assert_eq!(constant(false).render(&SQLITE).unwrap().sql, "0");
    }

    #[test]
    fn test_concat_per_dialect() {
        let e = col("first").concat(text(" ")).concat(col("last"));
        assert_eq!(e.render(&POSTGRES).unwrap().sql, "first || $1 || last");
        assert_eq!(
            e.render(&MYSQL).unwrap().sql,
            "CONCAT(CONCAT(first, ?), last)"
        );
    }

    #[test]
    fn test_function_names_validated() {
        assert_eq!(pg(count_star()), "COUNT(*)");
        assert_eq!(pg(func("pg_catalog.lower", [col("a")])), "pg_catalog.lower(a)");

        let err = func("lower(a); DROP TABLE x; --", [int(1)]).render(&POSTGRES).unwrap_err();
        assert!(err.to_string().contains("function name"));
    }

    #[test]
    fn test_cast() {
        assert_eq!(pg(col("a").cast("numeric(10, 2)")), "CAST(a AS numeric(10, 2))");
        assert!(col("a").cast("int); --").render(&POSTGRES).is_err());
        assert_eq!(
            pg(col("a").cast("timestamp(3) with time zone")),
            "CAST(a AS timestamp(3) with time zone)"
        );
        assert_eq!(pg(col("a").cast("integer[]")), "CAST(a AS integer[])");
    }

    #[test]
    fn test_cast_rejects_parenthesized_injection() {
        let err = col("a").cast("int) OR (1").render(&POSTGRES).unwrap_err();
        assert!(matches!(err, crate::error::SqlError::UnsupportedConstruct { .. }));

        let filtered = col("a").cast("int) OR (1").eq(int(1));
        assert!(filtered.render(&POSTGRES).is_err());
    }

    #[test]
    fn test_interval_binds_text() {
        let q = interval("1 day").render(&MYSQL).unwrap();
        assert_eq!(q.sql, "INTERVAL ?");
        assert_eq!(q.params, vec![Value::Text("1 day".into())]);
    }
}
