//! Rust source rendering for generated artifacts.
//!
//! Output depends only on its inputs: no timestamps, no hash-ordered
//! iteration.

use std::fmt::Write;

use super::{GeneratedArtifact, GeneratedColumn};

const HEADER: &str = "// Code generated by sqlcraft. DO NOT EDIT.\n";

/// Names end up inside doc comments and string literals.
fn doc_safe(name: &str) -> String {
    name.escape_default().to_string()
}

fn column_doc(column: &GeneratedColumn) -> String {
    let mut doc = format!("`{}` {}", doc_safe(&column.name), doc_safe(&column.data_type));
    if !column.nullable {
        doc.push_str(" NOT NULL");
    }
    if column.primary_key {
        doc.push_str(", primary key");
    }
    doc
}

/// One module per table.
pub fn render_table(schema: &str, artifact: &GeneratedArtifact) -> String {
    let mut out = String::new();
    let table = &artifact.table;
    let kind = if artifact.is_view { "view" } else { "table" };

    // `write!` into a String cannot fail.
    let _ = writeln!(out, "{}", HEADER);
    let _ = writeln!(out, "//! Typed descriptors for the `{}.{}` {}.", doc_safe(schema), doc_safe(table), kind);
    let _ = writeln!(out);
    let _ = writeln!(out, "use sqlcraft::typed::{{Table, TypedColumn}};");
    let _ = writeln!(out);

    let _ = writeln!(out, "/// The `{}` {}.", doc_safe(table), kind);
    let _ = writeln!(out, "#[derive(Debug, Clone, Copy, PartialEq, Eq)]");
    let _ = writeln!(out, "pub struct {};", artifact.struct_name);
    let _ = writeln!(out);
    let _ = writeln!(out, "impl Table for {} {{", artifact.struct_name);
    let _ = writeln!(out, "    const SCHEMA: Option<&'static str> = Some({:?});", schema);
    let _ = writeln!(out, "    const NAME: &'static str = {:?};", table);
    let names: Vec<String> = artifact.columns.iter().map(|c| format!("{:?}", c.name)).collect();
    let _ = writeln!(out, "    const COLUMNS: &'static [&'static str] = &[{}];", names.join(", "));
    let _ = writeln!(out, "}}");

    for column in &artifact.columns {
        let _ = writeln!(out);
        let _ = writeln!(out, "/// {}", column_doc(column));
        let _ = writeln!(out, "pub fn {}() -> TypedColumn<{}> {{", column.ident, column.rust_type.rust_path());
        let _ = writeln!(out, "    TypedColumn::new({:?}, {:?})", table, column.name);
        let _ = writeln!(out, "}}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "/// One row of `{}`.", doc_safe(table));
    let _ = writeln!(out, "#[derive(Debug, Clone, PartialEq)]");
    let _ = writeln!(out, "pub struct {}Row {{", artifact.struct_name);
    for column in &artifact.columns {
        let ty = column.rust_type.rust_path();
        if column.nullable {
            let _ = writeln!(out, "    pub {}: Option<{}>,", column.ident, ty);
        } else {
            let _ = writeln!(out, "    pub {}: {},", column.ident, ty);
        }
    }
    let _ = writeln!(out, "}}");
    out
}

/// `mod.rs` listing every table module.
pub fn render_mod(schema: &str, artifacts: &[GeneratedArtifact]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", HEADER);
    let _ = writeln!(out, "//! Typed descriptors for schema `{}`.", doc_safe(schema));
    let _ = writeln!(out);
    for artifact in artifacts {
        let _ = writeln!(out, "pub mod {};", artifact.module_name);
    }
    out
}
