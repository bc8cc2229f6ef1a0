//! Database type names and their Rust counterparts.
//!
//! Introspection hands back type names in many spellings
//! (`character varying(255)`, `numeric(10, 2)`, `integer[]`,
//! `timestamp(3) with time zone`, `int(10) unsigned`). [`SqlType::parse`]
//! normalizes them so each dialect only has to match on a bare name.

use nom::{
    IResult,
    bytes::complete::{tag, take_till, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0, multispace1, space0},
    combinator::{all_consuming, map, opt, recognize},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded},
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SqlError, SqlResult};

/// A parsed database type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlType {
    /// Lower-cased words without modifiers, e.g. `timestamp with time zone`.
    pub name: String,
    /// Numeric modifiers, e.g. `[10, 2]` for `numeric(10,2)`.
    pub modifiers: Vec<u32>,
    /// Number of `[]` suffixes.
    pub array_dims: usize,
    pub unsigned: bool,
}

/// Rust type a column maps to in generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RustType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    Bytes,
    Uuid,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Json,
    Array(Box<RustType>),
    /// Fallback for types no dialect mapping recognizes.
    Untyped,
}

impl SqlType {
    /// Parse a raw type name as reported by the database.
    pub fn parse(input: &str) -> SqlResult<Self> {
        let cleaned = input.replace('"', "");
        let (_, (segments, dims)) =
            all_consuming(type_expr)(&cleaned).map_err(|e| SqlError::TypeParse {
                input: input.to_string(),
                message: e.to_string(),
            })?;

        let mut words = Vec::new();
        let mut modifiers = Vec::new();
        let mut unsigned = false;
        for (word, modifier) in segments {
            let word = word.to_ascii_lowercase();
            match word.as_str() {
                "unsigned" => unsigned = true,
                "signed" | "zerofill" => {}
                _ => words.push(word),
            }
            if let Some(m) = modifier {
                modifiers = parse_modifiers(m);
            }
        }

        Ok(Self {
            name: words.join(" "),
            modifiers,
            array_dims: dims.len(),
            unsigned,
        })
    }

    /// The same type with one array dimension removed.
    pub fn element(&self) -> Self {
        Self {
            array_dims: self.array_dims.saturating_sub(1),
            ..self.clone()
        }
    }

    pub fn is_array(&self) -> bool {
        self.array_dims > 0
    }
}

fn word(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$'),
    ))(input)
}

fn modifier(input: &str) -> IResult<&str, &str> {
    delimited(char('('), take_till(|c| c == ')'), char(')'))(input)
}

fn segment(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    pair(word, opt(preceded(multispace0, modifier)))(input)
}

fn array_suffix(input: &str) -> IResult<&str, ()> {
    map(
        delimited(pair(multispace0, char('[')), digit0, char(']')),
        |_| (),
    )(input)
}

type Segments<'a> = (Vec<(&'a str, Option<&'a str>)>, Vec<()>);

fn type_expr(input: &str) -> IResult<&str, Segments<'_>> {
    delimited(
        multispace0,
        pair(separated_list0(multispace1, segment), many0(array_suffix)),
        multispace0,
    )(input)
}

fn cast_word(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

fn cast_modifier(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('('),
        pair(digit1, opt(pair(pair(char(','), space0), digit1))),
        char(')'),
    ))(input)
}

/// Whether `input` is safe to splice into `CAST(.. AS <input>)`.
///
/// Accepts words separated by single spaces, an optional `(n)` or `(p, s)`
/// after any word, and trailing `[]` suffixes. Nothing else reaches the SQL.
pub(crate) fn is_cast_type(input: &str) -> bool {
    all_consuming(pair(
        separated_list1(char(' '), pair(cast_word, opt(cast_modifier))),
        many0(tag("[]")),
    ))(input)
    .is_ok()
}

/// Numeric modifier lists; anything else (e.g. MySQL enum members) is dropped.
fn parse_modifiers(raw: &str) -> Vec<u32> {
    raw.split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_default()
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.modifiers.is_empty() {
            let mods: Vec<String> = self.modifiers.iter().map(|m| m.to_string()).collect();
            write!(f, "({})", mods.join(","))?;
        }
        if self.unsigned {
            write!(f, " unsigned")?;
        }
        for _ in 0..self.array_dims {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

impl RustType {
    /// Fully qualified Rust type path used in generated code.
    pub fn rust_path(&self) -> String {
        match self {
            RustType::Bool => "bool".to_string(),
            RustType::I8 => "i8".to_string(),
            RustType::I16 => "i16".to_string(),
            RustType::I32 => "i32".to_string(),
            RustType::I64 => "i64".to_string(),
            RustType::U8 => "u8".to_string(),
            RustType::U16 => "u16".to_string(),
            RustType::U32 => "u32".to_string(),
            RustType::U64 => "u64".to_string(),
            RustType::F32 => "f32".to_string(),
            RustType::F64 => "f64".to_string(),
            RustType::String => "String".to_string(),
            RustType::Bytes => "Vec<u8>".to_string(),
            RustType::Uuid => "uuid::Uuid".to_string(),
            RustType::Date => "chrono::NaiveDate".to_string(),
            RustType::Time => "chrono::NaiveTime".to_string(),
            RustType::Timestamp => "chrono::NaiveDateTime".to_string(),
            RustType::TimestampTz => "chrono::DateTime<chrono::Utc>".to_string(),
            RustType::Json => "serde_json::Value".to_string(),
            RustType::Array(inner) => format!("Vec<{}>", inner.rust_path()),
            RustType::Untyped => "sqlcraft::typed::Untyped".to_string(),
        }
    }

    /// Wrap `self` in `dims` levels of `Vec`.
    pub fn nested(self, dims: usize) -> Self {
        (0..dims).fold(self, |inner, _| RustType::Array(Box::new(inner)))
    }
}
