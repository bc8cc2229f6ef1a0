use super::{Projection, SelectStatement, Statement, TableRef, write_returning};
use crate::ast::Expr;
use crate::error::SqlError;
use crate::serializer::{SqlBuilder, StatementType};

/// `INSERT INTO t (cols) VALUES (..), (..)` or `INSERT INTO t (cols) SELECT ..`
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    table: TableRef,
    columns: Vec<String>,
    rows: Vec<Vec<Expr>>,
    query: Option<Box<SelectStatement>>,
    returning: Vec<Projection>,
}

pub fn insert_into(table: impl Into<TableRef>) -> InsertStatement {
    InsertStatement {
        table: table.into(),
        columns: Vec::new(),
        rows: Vec::new(),
        query: None,
        returning: Vec::new(),
    }
}

impl InsertStatement {
    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Append one row of values.
    pub fn values<E: Into<Expr>>(mut self, row: impl IntoIterator<Item = E>) -> Self {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }

    /// Insert the rows produced by a query instead of literal rows.
    pub fn query(mut self, query: SelectStatement) -> Self {
        self.query = Some(Box::new(query));
        self
    }

    pub fn returning<P: Into<Projection>>(mut self, items: impl IntoIterator<Item = P>) -> Self {
        self.returning.extend(items.into_iter().map(Into::into));
        self
    }
}

impl Statement for InsertStatement {
    fn statement_type(&self) -> StatementType {
        StatementType::Insert
    }

    fn write_sql(&self, out: &mut SqlBuilder<'_>) {
        out.write("INSERT INTO ");
        self.table.write_name(out);
        if !self.columns.is_empty() {
            out.write(" (");
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    out.write(", ");
                }
                out.write_ident(column);
            }
            out.write(")");
        }

        match (&self.query, self.rows.is_empty()) {
            (Some(_), false) => {
                out.fail_unsupported("VALUES together with a SELECT source", StatementType::Insert);
            }
            (None, true) => out.fail(SqlError::MissingClause {
                statement: StatementType::Insert,
                clause: "VALUES",
            }),
            (Some(query), true) => {
                out.write(" ");
                query.write_select(out);
            }
            (None, false) => {
                out.write(" VALUES ");
                for (i, row) in self.rows.iter().enumerate() {
                    if !self.columns.is_empty() && row.len() != self.columns.len() {
                        out.fail_unsupported(
                            format!(
                                "row {} has {} values for {} columns",
                                i + 1,
                                row.len(),
                                self.columns.len()
                            ),
                            StatementType::Insert,
                        );
                    }
                    if i > 0 {
                        out.write(", ");
                    }
                    out.write("(");
                    out.write_list(row, StatementType::InsertValues);
                    out.write(")");
                }
            }
        }

        write_returning(&self.returning, StatementType::Insert, out);
    }
}
