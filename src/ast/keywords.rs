//! Keyword literals.
//!
//! These are process-wide statics. Expressions hold `&'static Keyword`
//! references to them, they never bind a parameter and they render the same
//! text in every context.

use crate::serializer::{SqlBuilder, StatementType, ToSql};

#[derive(Debug, PartialEq, Eq)]
pub struct Keyword {
    text: &'static str,
    values_only: bool,
}

impl Keyword {
    pub const fn text(&self) -> &'static str {
        self.text
    }

    /// Whether the keyword is only valid among INSERT/UPDATE values.
    pub const fn values_only(&self) -> bool {
        self.values_only
    }
}

pub static NULL: Keyword = Keyword {
    text: "NULL",
    values_only: false,
};

pub static STAR: Keyword = Keyword {
    text: "*",
    values_only: false,
};

/// Use the column default. Valid in `INSERT ... VALUES` rows and `UPDATE ... SET`.
pub static DEFAULT: Keyword = Keyword {
    text: "DEFAULT",
    values_only: true,
};

impl ToSql for Keyword {
    fn serialize(&self, statement: StatementType, out: &mut SqlBuilder<'_>) {
        if self.values_only && !statement.allows_default() {
            out.fail_unsupported(self.text, statement);
        }
        out.write(self.text);
    }
}
