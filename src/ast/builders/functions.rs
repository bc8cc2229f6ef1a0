//! Function call builders.

use crate::ast::{Expr, Value, star};

/// `NAME(arg1, arg2, ...)`. The name must be a plain identifier.
pub fn func<A: Into<Expr>>(name: &str, args: impl IntoIterator<Item = A>) -> Expr {
    Expr::Func {
        name: name.to_string(),
        args: args.into_iter().map(Into::into).collect(),
    }
}

fn call1(name: &str, arg: impl Into<Expr>) -> Expr {
    Expr::Func {
        name: name.to_string(),
        args: vec![arg.into()],
    }
}

pub fn count(expr: impl Into<Expr>) -> Expr {
    call1("COUNT", expr)
}

/// `COUNT(*)`
pub fn count_star() -> Expr {
    call1("COUNT", star())
}

pub fn sum(expr: impl Into<Expr>) -> Expr {
    call1("SUM", expr)
}

pub fn avg(expr: impl Into<Expr>) -> Expr {
    call1("AVG", expr)
}

pub fn min(expr: impl Into<Expr>) -> Expr {
    call1("MIN", expr)
}

pub fn max(expr: impl Into<Expr>) -> Expr {
    call1("MAX", expr)
}

pub fn lower(expr: impl Into<Expr>) -> Expr {
    call1("LOWER", expr)
}

pub fn upper(expr: impl Into<Expr>) -> Expr {
    call1("UPPER", expr)
}

pub fn abs(expr: impl Into<Expr>) -> Expr {
    call1("ABS", expr)
}

pub fn length(expr: impl Into<Expr>) -> Expr {
    call1("LENGTH", expr)
}

pub fn coalesce<A: Into<Expr>>(args: impl IntoIterator<Item = A>) -> Expr {
    func("COALESCE", args)
}

/// `NOW()`
pub fn now() -> Expr {
    Expr::Func {
        name: "NOW".to_string(),
        args: Vec::new(),
    }
}

/// `INTERVAL $n`. The interval text is bound, never inlined.
pub fn interval(text: impl Into<String>) -> Expr {
    Expr::TypedLiteral {
        keyword: "INTERVAL",
        value: Value::Text(text.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::col;
    use crate::dialect::POSTGRES;

    #[test]
    fn test_aggregates() {
        let q = sum(col("amount")).render(&POSTGRES).unwrap();
        assert_eq!(q.sql, "SUM(amount)");
        assert_eq!(now().render(&POSTGRES).unwrap().sql, "NOW()");
    }

    #[test]
    fn test_coalesce_binds_default() {
        let q = coalesce([col("nickname"), "anonymous".into()])
            .render(&POSTGRES)
            .unwrap();
        assert_eq!(q.sql, "COALESCE(nickname, $1)");
        assert_eq!(q.params, vec![Value::Text("anonymous".into())]);
    }
}
