//! CASE expression builder.
//!
//! `when` returns a [`CaseWhen`] that only offers `then`, so an arm without
//! a result does not compile.
//!
//! ```ignore
//! case()
//!     .when(col("score").gt_eq(90)).then(text("A"))
//!     .when(col("score").gt_eq(80)).then(text("B"))
//!     .otherwise(text("F"))
//!     .end()
//! ```

use crate::ast::{CaseExpr, Expr};

/// Searched CASE: `CASE WHEN cond THEN ...`
pub fn case() -> CaseBuilder {
    CaseBuilder {
        case: CaseExpr {
            subject: None,
            arms: Vec::new(),
            otherwise: None,
        },
    }
}

/// Simple CASE: `CASE subject WHEN value THEN ...`
pub fn case_of(subject: impl Into<Expr>) -> CaseBuilder {
    CaseBuilder {
        case: CaseExpr {
            subject: Some(subject.into()),
            arms: Vec::new(),
            otherwise: None,
        },
    }
}

#[derive(Debug, Clone)]
pub struct CaseBuilder {
    case: CaseExpr,
}

/// A WHEN waiting for its THEN.
#[derive(Debug, Clone)]
pub struct CaseWhen {
    case: CaseExpr,
    condition: Expr,
}

/// A CASE with its ELSE set; only `end` remains.
#[derive(Debug, Clone)]
pub struct CaseElse {
    case: CaseExpr,
}

impl CaseBuilder {
    pub fn when(self, condition: impl Into<Expr>) -> CaseWhen {
        CaseWhen {
            case: self.case,
            condition: condition.into(),
        }
    }

    pub fn otherwise(mut self, result: impl Into<Expr>) -> CaseElse {
        self.case.otherwise = Some(result.into());
        CaseElse { case: self.case }
    }

    pub fn end(self) -> Expr {
        Expr::Case(Box::new(self.case))
    }
}

impl CaseWhen {
    pub fn then(mut self, result: impl Into<Expr>) -> CaseBuilder {
        self.case.arms.push((self.condition, result.into()));
        CaseBuilder { case: self.case }
    }
}

impl CaseElse {
    pub fn end(self) -> Expr {
        Expr::Case(Box::new(self.case))
    }
}
