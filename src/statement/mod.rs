//! Statement builders.
//!
//! Clause order is fixed by each statement type, never by the order of the
//! builder calls. Every statement renders through [`Statement::build`].

mod delete;
mod insert;
mod select;
mod source;
mod update;

pub use delete::{DeleteStatement, delete_from};
pub use insert::{InsertStatement, insert_into};
pub use select::{SelectStatement, select};
pub use source::{JoinKind, Source, TableRef, table};
pub use update::{UpdateStatement, update};

use crate::ast::{Expr, SortOrder};
use crate::dialect::Dialect;
use crate::error::SqlResult;
use crate::serializer::{Query, SqlBuilder, StatementType, ToSql};

/// A complete top-level statement.
pub trait Statement {
    fn statement_type(&self) -> StatementType;

    /// Append the statement text. Validation failures are recorded in `out`.
    fn write_sql(&self, out: &mut SqlBuilder<'_>);

    fn build(&self, dialect: &dyn Dialect) -> SqlResult<Query> {
        let mut out = SqlBuilder::new(dialect, self.statement_type());
        self.write_sql(&mut out);
        let params = out.param_count();
        let query = out.finish()?;
        tracing::trace!(dialect = dialect.name(), sql = %query.sql, params, "built statement");
        Ok(query)
    }
}

/// One entry of a SELECT or RETURNING list.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl From<Expr> for Projection {
    fn from(expr: Expr) -> Self {
        Projection {
            expr,
            alias: None,
        }
    }
}

impl ToSql for Projection {
    fn serialize(&self, statement: StatementType, out: &mut SqlBuilder<'_>) {
        self.expr.serialize(statement, out);
        if let Some(alias) = &self.alias {
            out.write(" AS ");
            out.write_ident(alias);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub expr: Expr,
    pub order: Option<SortOrder>,
}

impl From<Expr> for OrderBy {
    fn from(expr: Expr) -> Self {
        OrderBy {
            expr,
            order: None,
        }
    }
}

impl ToSql for OrderBy {
    fn serialize(&self, statement: StatementType, out: &mut SqlBuilder<'_>) {
        self.expr.serialize(statement, out);
        match self.order {
            Some(SortOrder::Asc) => out.write(" ASC"),
            Some(SortOrder::Desc) => out.write(" DESC"),
            None => {}
        }
    }
}

/// Write ` RETURNING ...` if the list is non-empty and the dialect supports it.
fn write_returning(returning: &[Projection], statement: StatementType, out: &mut SqlBuilder<'_>) {
    if returning.is_empty() {
        return;
    }
    if !out.dialect().supports_returning() {
        out.fail_unsupported("RETURNING", statement);
    }
    out.write(" RETURNING ");
    out.write_list(returning, statement);
}
