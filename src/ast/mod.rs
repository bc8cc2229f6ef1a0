//! Expression tree.
//!
//! Nodes are immutable once built and own their children. Serialization
//! goes through [`ToSql`](crate::serializer::ToSql) into a
//! [`SqlBuilder`](crate::serializer::SqlBuilder).

pub mod builders;
pub mod expr;
pub mod keywords;
pub mod operators;
pub mod values;

pub use builders::*;
pub use expr::{CaseExpr, ColumnRef, Expr};
pub use keywords::{DEFAULT, Keyword, NULL, STAR};
pub use operators::{BinaryOp, SortOrder, UnaryOp};
pub use values::Value;
