//! Typed table and column descriptors.
//!
//! Generated code implements [`Table`] for one unit struct per table and
//! exposes one [`TypedColumn`] constructor per column. The type parameter
//! only exists at compile time; rendering goes through the ordinary
//! [`Expr`] tree.
//!
//! # Example (from generated code)
//! ```ignore
//! use sqlcraft::prelude::*;
//! use schema::users;
//!
//! SelectStatement::new()
//!     .column(users::id())
//!     .column(users::email())
//!     .from(users::Users::table_ref())
//!     .filter(users::age().typed_eq(25))  // i32 column, i32 value
//!     .build(&POSTGRES)?;
//! ```

use std::marker::PhantomData;

use crate::ast::{ColumnRef, Expr, Value};
use crate::statement::{OrderBy, Projection, TableRef};

/// Implemented by generated table structs.
pub trait Table {
    /// Schema the table was introspected from, if any.
    const SCHEMA: Option<&'static str>;
    const NAME: &'static str;
    /// Column names in ordinal order.
    const COLUMNS: &'static [&'static str];

    fn table_ref() -> TableRef {
        TableRef::new(Self::SCHEMA, Self::NAME)
    }
}

/// A column of a known table whose values have Rust type `T`.
#[derive(Debug)]
pub struct TypedColumn<T> {
    table: &'static str,
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

// Derives would require `T: Clone`.
impl<T> Clone for TypedColumn<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedColumn<T> {}

impl<T> TypedColumn<T> {
    pub const fn new(table: &'static str, name: &'static str) -> Self {
        Self {
            table,
            name,
            _phantom: PhantomData,
        }
    }

    pub const fn table(&self) -> &'static str {
        self.table
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Qualified name (`table.column`).
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }

    pub fn expr(self) -> Expr {
        Expr::Column(ColumnRef {
            qualifier: vec![self.table.to_string()],
            name: self.name.to_string(),
        })
    }

    /// `column = value`, where the value type must match the column type.
    pub fn typed_eq<V: ColumnValue<T> + Into<Value>>(self, value: V) -> Expr {
        self.expr().eq(Expr::Literal(value.into()))
    }

    pub fn typed_not_eq<V: ColumnValue<T> + Into<Value>>(self, value: V) -> Expr {
        self.expr().not_eq(Expr::Literal(value.into()))
    }

    pub fn typed_in<V: ColumnValue<T> + Into<Value>>(
        self,
        values: impl IntoIterator<Item = V>,
    ) -> Expr {
        self.expr().in_list(values.into_iter().map(|v| Expr::Literal(v.into())))
    }
}

impl<T> From<TypedColumn<T>> for Expr {
    fn from(column: TypedColumn<T>) -> Expr {
        column.expr()
    }
}

impl<T> From<TypedColumn<T>> for Projection {
    fn from(column: TypedColumn<T>) -> Projection {
        Projection::from(column.expr())
    }
}

impl<T> From<TypedColumn<T>> for OrderBy {
    fn from(column: TypedColumn<T>) -> OrderBy {
        OrderBy::from(column.expr())
    }
}

/// Bare column name, for INSERT column lists and UPDATE SET targets.
impl<T> From<TypedColumn<T>> for String {
    fn from(column: TypedColumn<T>) -> String {
        column.name.to_string()
    }
}

/// Column type used when the database type has no known Rust mapping.
///
/// Comparisons against an untyped column accept any value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Untyped;

/// Marker for value types that may be compared with a column of type `C`.
pub trait ColumnValue<C> {}

impl ColumnValue<i16> for i16 {}
impl ColumnValue<i32> for i32 {}
impl ColumnValue<i32> for i16 {}
impl ColumnValue<i64> for i64 {}
impl ColumnValue<i64> for i32 {}
impl ColumnValue<u32> for u32 {}

impl ColumnValue<f32> for f32 {}
impl ColumnValue<f64> for f64 {}
impl ColumnValue<f64> for f32 {}

impl ColumnValue<String> for String {}
impl ColumnValue<String> for &str {}

impl ColumnValue<bool> for bool {}

impl ColumnValue<Vec<u8>> for Vec<u8> {}

impl ColumnValue<uuid::Uuid> for uuid::Uuid {}

impl ColumnValue<chrono::NaiveDate> for chrono::NaiveDate {}
impl ColumnValue<chrono::NaiveTime> for chrono::NaiveTime {}
impl ColumnValue<chrono::NaiveDateTime> for chrono::NaiveDateTime {}
impl ColumnValue<chrono::DateTime<chrono::Utc>> for chrono::DateTime<chrono::Utc> {}

impl ColumnValue<serde_json::Value> for serde_json::Value {}

impl<T> ColumnValue<Untyped> for T {}
