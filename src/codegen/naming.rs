//! Database identifiers to Rust identifiers.

use crate::error::{SqlError, SqlResult};

/// Strict and reserved Rust keywords, 2021+ edition.
const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

pub fn is_rust_keyword(ident: &str) -> bool {
    RUST_KEYWORDS.contains(&ident)
}

/// snake_case identifier for a database name.
///
/// camelCase is split, anything non-alphanumeric becomes `_`, runs collapse,
/// the result is lower-cased. A leading digit gets a `_` prefix and Rust
/// keywords get a `_` suffix.
pub fn snake_case(table: &str, name: &str) -> SqlResult<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && i > 0 {
                let prev = chars[i - 1];
                let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
                let boundary = prev.is_ascii_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_ascii_uppercase() && next_lower);
                if boundary && !out.ends_with('_') {
                    out.push('_');
                }
            }
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }

    let trimmed = out.trim_end_matches('_');
    if trimmed.is_empty() {
        return Err(SqlError::InvalidIdentifier {
            table: table.to_string(),
            name: name.to_string(),
        });
    }

    let mut ident = if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", trimmed)
    } else {
        trimmed.to_string()
    };
    if is_rust_keyword(&ident) {
        ident.push('_');
    }
    Ok(ident)
}

/// Convert snake_case to PascalCase for type names.
pub fn pascal_case(snake: &str) -> String {
    let pascal: String = snake
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    if pascal.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", pascal)
    } else if pascal == "Self" {
        "Self_".to_string()
    } else {
        pascal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake(name: &str) -> String {
        snake_case("t", name).unwrap()
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake("user_id"), "user_id");
        assert_eq!(snake("userId"), "user_id");
        assert_eq!(snake("UserID"), "user_id");
        assert_eq!(snake("HTTPServer"), "http_server");
        assert_eq!(snake("address2Line"), "address2_line");
        assert_eq!(snake("first name"), "first_name");
        assert_eq!(snake("__weird--name__"), "weird_name");
        assert_eq!(snake("ÉtéData"), "t_data");
    }

    #[test]
    fn test_snake_case_digits_and_keywords() {
        assert_eq!(snake("2fa_secret"), "_2fa_secret");
        assert_eq!(snake("type"), "type_");
        assert_eq!(snake("Self"), "self_");
        assert_eq!(snake("match"), "match_");
    }

    #[test]
    fn test_no_alphanumerics_is_invalid() {
        assert!(matches!(
            snake_case("users", "$$"),
            Err(SqlError::InvalidIdentifier { .. })
        ));
        assert!(snake_case("users", "").is_err());
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("payment_events"), "PaymentEvents");
        assert_eq!(pascal_case("users"), "Users");
        assert_eq!(pascal_case("_2fa_codes"), "_2faCodes");
        assert_eq!(pascal_case("self_"), "Self_");
    }
}
