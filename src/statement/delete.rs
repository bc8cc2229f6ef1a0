use super::{Projection, Statement, TableRef, write_returning};
use crate::ast::Expr;
use crate::error::SqlError;
use crate::serializer::{SqlBuilder, StatementType, ToSql};

/// `DELETE FROM t WHERE .. [RETURNING ..]`
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    table: TableRef,
    filter: Option<Expr>,
    returning: Vec<Projection>,
}

pub fn delete_from(table: impl Into<TableRef>) -> DeleteStatement {
    DeleteStatement {
        table: table.into(),
        filter: None,
        returning: Vec::new(),
    }
}

impl DeleteStatement {
    /// Add a WHERE predicate. Repeated calls are combined with AND.
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

impl Statement for DeleteStatement {
    fn statement_type(&self) -> StatementType {
        StatementType::Delete
    }

    fn write_sql(&self, out: &mut SqlBuilder<'_>) {
        out.write("DELETE FROM ");
        self.table.write_name(out);
        match &self.filter {
            Some(filter) => {
                out.write(" WHERE ");
                filter.serialize(StatementType::Delete, out);
            }
            None => out.fail(SqlError::MissingClause {
                statement: StatementType::Delete,
                clause: "WHERE",
            }),
        }
        write_returning(&self.returning, StatementType::Delete, out);
    }
}
