use std::fmt;

use super::SelectStatement;
use crate::ast::Expr;
use crate::serializer::{SqlBuilder, StatementType, ToSql};

/// A table name, optionally schema-qualified and aliased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
    pub alias: Option<String>,
}

/// Table reference from `name` or `schema.name`.
pub fn table(path: &str) -> TableRef {
    TableRef::from(path)
}

impl TableRef {
    pub fn new(schema: Option<&str>, name: &str) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.to_string(),
            alias: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Write the (qualified) name without the alias.
    pub(crate) fn write_name(&self, out: &mut SqlBuilder<'_>) {
        if let Some(schema) = &self.schema {
            out.write_ident(schema);
            out.write(".");
        }
        out.write_ident(&self.name);
    }

    pub fn inner_join(self, right: impl Into<Source>, on: impl Into<Expr>) -> Source {
        Source::from(self).inner_join(right, on)
    }

    pub fn left_join(self, right: impl Into<Source>, on: impl Into<Expr>) -> Source {
        Source::from(self).left_join(right, on)
    }

    pub fn right_join(self, right: impl Into<Source>, on: impl Into<Expr>) -> Source {
        Source::from(self).right_join(right, on)
    }

    pub fn full_join(self, right: impl Into<Source>, on: impl Into<Expr>) -> Source {
        Source::from(self).full_join(right, on)
    }

    pub fn cross_join(self, right: impl Into<Source>) -> Source {
        Source::from(self).cross_join(right)
    }
}

impl From<&str> for TableRef {
    fn from(path: &str) -> Self {
        match path.rsplit_once('.') {
            Some((schema, name)) => TableRef::new(Some(schema), name),
            None => TableRef::new(None, path),
        }
    }
}

impl ToSql for TableRef {
    fn serialize(&self, _statement: StatementType, out: &mut SqlBuilder<'_>) {
        self.write_name(out);
        if let Some(alias) = &self.alias {
            out.write(" AS ");
            out.write_ident(alias);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "INNER JOIN"),
            JoinKind::Left => write!(f, "LEFT JOIN"),
            JoinKind::Right => write!(f, "RIGHT JOIN"),
            JoinKind::Full => write!(f, "FULL JOIN"),
            JoinKind::Cross => write!(f, "CROSS JOIN"),
        }
    }
}

/// What a SELECT reads from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Table(TableRef),
    /// `on` is `None` only for CROSS joins; the builder methods enforce it.
    Join {
        left: Box<Source>,
        kind: JoinKind,
        right: Box<Source>,
        on: Option<Expr>,
    },
    Subquery {
        query: Box<SelectStatement>,
        alias: String,
    },
}

impl Source {
    fn join(self, kind: JoinKind, right: impl Into<Source>, on: Option<Expr>) -> Source {
        Source::Join {
            left: Box::new(self),
            kind,
            right: Box::new(right.into()),
            on,
        }
    }

    pub fn inner_join(self, right: impl Into<Source>, on: impl Into<Expr>) -> Source {
        self.join(JoinKind::Inner, right, Some(on.into()))
    }

    pub fn left_join(self, right: impl Into<Source>, on: impl Into<Expr>) -> Source {
        self.join(JoinKind::Left, right, Some(on.into()))
    }

    pub fn right_join(self, right: impl Into<Source>, on: impl Into<Expr>) -> Source {
        self.join(JoinKind::Right, right, Some(on.into()))
    }

    pub fn full_join(self, right: impl Into<Source>, on: impl Into<Expr>) -> Source {
        self.join(JoinKind::Full, right, Some(on.into()))
    }

    pub fn cross_join(self, right: impl Into<Source>) -> Source {
        self.join(JoinKind::Cross, right, None)
    }
}

impl From<TableRef> for Source {
    fn from(table: TableRef) -> Self {
        Source::Table(table)
    }
}

impl From<&str> for Source {
    fn from(path: &str) -> Self {
        Source::Table(TableRef::from(path))
    }
}

impl ToSql for Source {
    fn serialize(&self, statement: StatementType, out: &mut SqlBuilder<'_>) {
        match self {
            Source::Table(table) => table.serialize(statement, out),
            Source::Join {
                left,
                kind,
                right,
                on,
            } => {
                if !out.dialect().supports_join(*kind) {
                    out.fail_unsupported(kind.to_string(), statement);
                }
                left.serialize(statement, out);
                out.write(" ");
                out.write(&kind.to_string());
                out.write(" ");
                let nested = matches!(**right, Source::Join { .. });
                if nested {
                    out.write("(");
                }
                right.serialize(statement, out);
                if nested {
                    out.write(")");
                }
                if let Some(on) = on {
                    out.write(" ON ");
                    on.serialize(statement, out);
                }
            }
            Source::Subquery { query, alias } => {
                out.write("(");
                query.write_select(out);
                out.write(") AS ");
                out.write_ident(alias);
            }
        }
    }
}
