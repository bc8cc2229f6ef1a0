//! # sqlcraft
//!
//! Type-safe SQL construction.
//!
//! Queries are built as an expression tree, then rendered for a chosen
//! [`Dialect`](dialect::Dialect) into SQL text plus an ordered list of bound
//! parameters. A schema-driven generator turns database metadata into typed
//! table and column descriptors that plug straight into the same tree.
//!
//! ## Quick Example
//!
//! ```
//! use sqlcraft::prelude::*;
//!
//! let query = select([col("id"), col("email")])
//!     .from(table("users"))
//!     .filter(col("active").eq(true).and(col("age").gt_eq(18)))
//!     .order_by(col("id").desc())
//!     .limit(10)
//!     .build(&POSTGRES)
//!     .unwrap();
//!
//! assert_eq!(
//!     query.sql,
//!     "SELECT id, email FROM users WHERE active = $1 AND age >= $2 ORDER BY id DESC LIMIT 10"
//! );
//! assert_eq!(query.params, vec![Value::Bool(true), Value::Int(18)]);
//! ```
//!
//! ## Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`ast`] | Expression nodes, literals, CASE and function builders |
//! | [`serializer`] | Placeholder numbering and statement context |
//! | [`statement`] | SELECT / INSERT / UPDATE / DELETE |
//! | [`dialect`] | PostgreSQL, MySQL and SQLite differences |
//! | [`codegen`] | Typed descriptors from schema metadata |
//! | [`session`] | Connection description and live sessions |

pub mod ast;
pub mod codegen;
pub mod config;
pub mod dialect;
pub mod error;
pub mod introspect;
pub mod schema;
pub mod serializer;
pub mod session;
pub mod statement;
pub mod typed;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::dialect::{Dialect, MYSQL, POSTGRES, SQLITE};
    pub use crate::error::{SqlError, SqlResult};
    pub use crate::serializer::{Query, StatementType, ToSql};
    pub use crate::statement::*;
    pub use crate::typed::{Table, TypedColumn, Untyped};
}
