use super::{OrderBy, Projection, Source, Statement};
use crate::ast::Expr;
use crate::serializer::{SqlBuilder, StatementType, ToSql};

/// `SELECT [DISTINCT] .. [FROM ..] [WHERE ..] [GROUP BY ..] [HAVING ..]
/// [ORDER BY ..] [LIMIT/OFFSET]`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    distinct: bool,
    projections: Vec<Projection>,
    from: Option<Source>,
    filter: Option<Expr>,
    group_by: Vec<Expr>,
    having: Option<Expr>,
    order_by: Vec<OrderBy>,
    limit: Option<u64>,
    offset: Option<u64>,
}

/// Start a SELECT. An empty projection list renders `*`.
pub fn select<P: Into<Projection>>(projections: impl IntoIterator<Item = P>) -> SelectStatement {
    SelectStatement {
        projections: projections.into_iter().map(Into::into).collect(),
        ..Default::default()
    }
}

impl SelectStatement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one projection.
    pub fn column(mut self, projection: impl Into<Projection>) -> Self {
        self.projections.push(projection.into());
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn from(mut self, source: impl Into<Source>) -> Self {
        self.from = Some(source.into());
        self
    }

    /// Add a WHERE predicate. Repeated calls are combined with AND.
    pub fn filter(mut self, predicate: impl Into<Expr>) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(predicate),
            None => predicate.into(),
        });
        self
    }

    pub fn group_by<E: Into<Expr>>(mut self, exprs: impl IntoIterator<Item = E>) -> Self {
        self.group_by.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Add a HAVING predicate. Repeated calls are combined with AND.
    pub fn having(mut self, predicate: impl Into<Expr>) -> Self {
        self.having = Some(match self.having.take() {
            Some(existing) => existing.and(predicate),
            None => predicate.into(),
        });
        self
    }

    pub fn order_by(mut self, order: impl Into<OrderBy>) -> Self {
        self.order_by.push(order.into());
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Use this query as an aliased FROM source.
    pub fn as_source(self, alias: impl Into<String>) -> Source {
        Source::Subquery {
            query: Box::new(self),
            alias: alias.into(),
        }
    }

    /// Body shared by top-level and nested rendering. Children always see
    /// SELECT context, whatever statement encloses the sub-select.
    pub(crate) fn write_select(&self, out: &mut SqlBuilder<'_>) {
        let ctx = StatementType::Select;
        out.write("SELECT ");
        if self.distinct {
            out.write("DISTINCT ");
        }
        if self.projections.is_empty() {
            out.write("*");
        } else {
            out.write_list(&self.projections, ctx);
        }
        if let Some(from) = &self.from {
            out.write(" FROM ");
            from.serialize(ctx, out);
        }
        if let Some(filter) = &self.filter {
            out.write(" WHERE ");
            filter.serialize(ctx, out);
        }
        if !self.group_by.is_empty() {
            out.write(" GROUP BY ");
            out.write_list(&self.group_by, ctx);
        }
        if let Some(having) = &self.having {
            out.write(" HAVING ");
            having.serialize(ctx, out);
        }
        if !self.order_by.is_empty() {
            out.write(" ORDER BY ");
            out.write_list(&self.order_by, ctx);
        }
        let tail = out.dialect().limit_offset(self.limit, self.offset);
        out.write(&tail);
    }
}

impl Statement for SelectStatement {
    fn statement_type(&self) -> StatementType {
        StatementType::Select
    }

    fn write_sql(&self, out: &mut SqlBuilder<'_>) {
        self.write_select(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Value, col, count_star, default_value, exists, text};
    use crate::dialect::{MYSQL, POSTGRES, SQLITE};
    use crate::error::SqlError;
    use crate::statement::table;

    #[test]
    fn test_select_star() {
        let q = select(Vec::<Expr>::new()).from(table("users")).build(&POSTGRES).unwrap();
        assert_eq!(q.sql, "SELECT * FROM users");
    }

    #[test]
    fn test_clause_order_is_fixed() {
        // builder calls deliberately out of order
        let q = SelectStatement::new()
            .limit(10)
            .order_by(col("name").asc())
            .filter(col("active").eq(true))
            .column(col("name"))
            .column(count_star().alias("n"))
            .group_by([col("name")])
            .having(count_star().gt(1))
            .from(table("users"))
            .offset(20)
            .build(&POSTGRES)
            .unwrap();
        assert_eq!(
            q.sql,
            "SELECT name, COUNT(*) AS n FROM users WHERE active = $1 GROUP BY name \
             HAVING COUNT(*) > $2 ORDER BY name ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(q.params, vec![Value::Bool(true), Value::Int(1)]);
    }

    #[test]
    fn test_filter_calls_combine() {
        let q = select([col("id")])
            .from(table("t"))
            .filter(col("a").eq(1))
            .filter(col("b").eq(2))
            .build(&SQLITE)
            .unwrap();
        assert_eq!(q.sql, "SELECT id FROM t WHERE a = ? AND b = ?");
    }

    #[test]
    fn test_offset_without_limit() {
        let base = select([col("id")]).from(table("t")).offset(5);
        assert_eq!(base.build(&POSTGRES).unwrap().sql, "SELECT id FROM t OFFSET 5");
        assert_eq!(
            base.build(&MYSQL).unwrap().sql,
            "SELECT id FROM t LIMIT 18446744073709551615 OFFSET 5"
        );
        assert_eq!(base.build(&SQLITE).unwrap().sql, "SELECT id FROM t LIMIT -1 OFFSET 5");
    }

    #[test]
    fn test_joins() {
        let source = table("users")
            .alias("u")
            .inner_join(table("orders").alias("o"), col("o.user_id").eq(col("u.id")))
            .left_join(table("refunds").alias("r"), col("r.order_id").eq(col("o.id")))
            .cross_join(table("regions"));
        let q = select([col("u.id")]).from(source).build(&POSTGRES).unwrap();
        assert_eq!(
            q.sql,
            "SELECT u.id FROM users AS u INNER JOIN orders AS o ON o.user_id = u.id \
             LEFT JOIN refunds AS r ON r.order_id = o.id CROSS JOIN regions"
        );
    }

    #[test]
    fn test_full_join_unsupported_on_mysql() {
        let q = select([col("a.id")]).from(table("a").full_join(table("b"), col("a.id").eq(col("b.id"))));
        assert!(q.build(&POSTGRES).is_ok());
        let err = q.build(&MYSQL).unwrap_err();
        assert!(matches!(
            err,
            SqlError::UnsupportedConstruct { ref construct, .. } if construct == "FULL JOIN"
        ));
    }

    #[test]
    fn test_subqueries() {
        let inner = select([col("user_id")]).from(table("orders")).filter(col("total").gt(100));
        let q = select([col("name")])
            .from(table("users"))
            .filter(col("id").in_subquery(inner.clone()))
            .filter(exists(inner.clone()))
            .build(&POSTGRES)
            .unwrap();
        assert_eq!(
            q.sql,
            "SELECT name FROM users WHERE id IN (SELECT user_id FROM orders WHERE total > $1) \
             AND EXISTS (SELECT user_id FROM orders WHERE total > $2)"
        );
        assert_eq!(q.params.len(), 2);

        let q = select(Vec::<Expr>::new())
            .from(inner.as_source("big"))
            .build(&MYSQL)
            .unwrap();
        assert_eq!(
            q.sql,
            "SELECT * FROM (SELECT user_id FROM orders WHERE total > ?) AS big"
        );
    }

    #[test]
    fn test_scalar_subquery_projection() {
        let count = select([count_star()]).from(table("orders")).filter(col("orders.user_id").eq(col("users.id")));
        let q = select([col("users.name").alias("name"), Expr::from(count).alias("orders")])
            .from(table("users"))
            .build(&POSTGRES)
            .unwrap();
        assert_eq!(
            q.sql,
            "SELECT users.name AS name, (SELECT COUNT(*) FROM orders WHERE orders.user_id = users.id) \
             AS orders FROM users"
        );
    }

    #[test]
    fn test_default_rejected_in_select() {
        let err = select([default_value()]).build(&POSTGRES).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported construct in SELECT statement: DEFAULT"
        );
    }

    #[test]
    fn test_distinct_and_quoting() {
        let q = select([col("user.Name")])
            .distinct()
            .from(table("public.user"))
            .filter(col("user.Name").like(text("A%")))
            .build(&POSTGRES)
            .unwrap();
        assert_eq!(
            q.sql,
            "SELECT DISTINCT \"user\".\"Name\" FROM public.\"user\" WHERE \"user\".\"Name\" LIKE $1"
        );
    }
}
