//! Ergonomic constructors for [`Expr`](crate::ast::Expr) nodes.

mod case_when;
mod functions;
mod literals;

pub use case_when::{CaseBuilder, CaseElse, CaseWhen, case, case_of};
pub use functions::{
    abs, avg, coalesce, count, count_star, func, interval, length, lower, max, min, now, sum,
    upper,
};
pub use literals::{
    cast, col, constant, default_value, exists, float, int, list, null, param, star, subquery,
    text, value,
};
