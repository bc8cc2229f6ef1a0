use super::{Projection, Statement, TableRef, write_returning};
use crate::ast::Expr;
use crate::error::SqlError;
use crate::serializer::{SqlBuilder, StatementType, ToSql};

/// `UPDATE t SET c = v, .. WHERE .. [RETURNING ..]`
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    table: TableRef,
    assignments: Vec<(String, Expr)>,
    filter: Option<Expr>,
    returning: Vec<Projection>,
}

pub fn update(table: impl Into<TableRef>) -> UpdateStatement {
    UpdateStatement {
        table: table.into(),
        assignments: Vec::new(),
        filter: None,
        returning: Vec::new(),
    }
}

impl UpdateStatement {
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Expr>) -> Self {
        self.assignments.push((column.into(), value.into()));
        self
    }

    /// Add a WHERE predicate. Repeated calls are combined with AND.
    ///
    /// An UPDATE without one is rejected; use `constant(true)` to touch every row.
    pub fn filter(mut self, predicate: impl Into<Expr>) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(predicate),
            None => predicate.into(),
        });
        self
    }

    pub fn returning<P: Into<Projection>>(mut self, items: impl IntoIterator<Item = P>) -> Self {
        self.returning.extend(items.into_iter().map(Into::into));
        self
    }
}

impl Statement for UpdateStatement {
    fn statement_type(&self) -> StatementType {
        StatementType::Update
    }

    fn write_sql(&self, out: &mut SqlBuilder<'_>) {
        if self.assignments.is_empty() {
            out.fail(SqlError::MissingClause {
                statement: StatementType::Update,
                clause: "SET",
            });
        }
        if self.filter.is_none() {
            out.fail(SqlError::MissingClause {
                statement: StatementType::Update,
                clause: "WHERE",
            });
        }

        out.write("UPDATE ");
        self.table.serialize(StatementType::Update, out);
        out.write(" SET ");
        for (i, (column, value)) in self.assignments.iter().enumerate() {
            if i > 0 {
                out.write(", ");
            }
            out.write_ident(column);
            out.write(" = ");
            value.serialize(StatementType::UpdateValues, out);
        }
        if let Some(filter) = &self.filter {
            out.write(" WHERE ");
            filter.serialize(StatementType::Update, out);
        }
        write_returning(&self.returning, StatementType::Update, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Value, col, constant, default_value};
    use crate::dialect::{MYSQL, POSTGRES};

    #[test]
    fn test_update_with_default() {
        let q = update("users")
            .set("name", "ann")
            .set("updated_at", default_value())
            .filter(col("id").eq(7))
            .returning([col("id")])
            .build(&POSTGRES)
            .unwrap();
        assert_eq!(
            q.sql,
            "UPDATE users SET name = $1, updated_at = DEFAULT WHERE id = $2 RETURNING id"
        );
        assert_eq!(q.params, vec![Value::from("ann"), Value::Int(7)]);
    }

    #[test]
    fn test_default_in_where_rejected() {
        let err = update("users")
            .set("name", "ann")
            .filter(col("id").eq(default_value()))
            .build(&POSTGRES)
            .unwrap_err();
        assert!(err.to_string().contains("UPDATE statement: DEFAULT"));
    }

    #[test]
    fn test_update_requires_where() {
        let err = update("users").set("active", false).build(&POSTGRES).unwrap_err();
        assert!(matches!(
            err,
            SqlError::MissingClause {
                statement: StatementType::Update,
                clause: "WHERE"
            }
        ));

        let q = update("users")
            .set("active", false)
            .filter(constant(true))
            .build(&MYSQL)
            .unwrap();
        assert_eq!(q.sql, "UPDATE users SET active = ? WHERE 1");
    }

    #[test]
    fn test_update_requires_set() {
        let err = update("users").filter(col("id").eq(1)).build(&POSTGRES).unwrap_err();
        assert!(matches!(err, SqlError::MissingClause { clause: "SET", .. }));
    }
}
