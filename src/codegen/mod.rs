//! Schema-driven code generation.
//!
//! Turns a [`Schema`] snapshot into one Rust module per table, each exposing a
//! [`Table`](crate::typed::Table) struct, typed column constructors and a row
//! model. Generation is a pure function of the snapshot and the dialect, so
//! running it twice on the same schema produces byte-identical files.
//!
//! ```
//! use sqlcraft::codegen::generate_artifacts;
//! use sqlcraft::dialect::POSTGRES;
//! use sqlcraft::schema::{Schema, TableDef};
//!
//! let mut schema = Schema::new("public");
//! schema.add_table(TableDef::new("userAccounts").pk("id", "int4").column("createdAt", "timestamptz"));
//!
//! let artifacts = generate_artifacts(&schema, &POSTGRES).unwrap();
//! assert_eq!(artifacts[0].module_name, "user_accounts");
//! assert_eq!(artifacts[0].struct_name, "UserAccounts");
//! assert!(artifacts[0].source.contains("pub fn created_at()"));
//! ```

pub mod naming;
pub mod template;
pub mod writer;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::dialect::{Dialect, POSTGRES, RustType, SqlType};
use crate::error::{SqlError, SqlResult};
use crate::introspect::load_schema;
use crate::schema::{ColumnDef, Schema, TableDef, TableKind};
use crate::session::{ConnectionConfig, Session};

pub use naming::{pascal_case, snake_case};
pub use writer::write_tree;

/// One column as it appears in generated code.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedColumn {
    /// Name in the database.
    pub name: String,
    /// Rust function and field name.
    pub ident: String,
    /// Raw database type text.
    pub data_type: String,
    pub rust_type: RustType,
    pub nullable: bool,
    pub primary_key: bool,
}

/// Generated module for one table or view.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedArtifact {
    pub table: String,
    pub is_view: bool,
    pub module_name: String,
    pub struct_name: String,
    pub columns: Vec<GeneratedColumn>,
    /// Rendered Rust source of the module.
    pub source: String,
}

fn map_column_type(dialect: &dyn Dialect, table: &str, column: &ColumnDef) -> RustType {
    match SqlType::parse(&column.data_type) {
        Ok(ty) => {
            let mapped = dialect.map_type(&ty);
            if mapped == RustType::Untyped {
                warn!(table, column = %column.name, data_type = %column.data_type, "no Rust mapping, column is Untyped");
            }
            mapped
        }
        Err(e) => {
            warn!(table, column = %column.name, error = %e, "unparseable column type, using Untyped");
            RustType::Untyped
        }
    }
}

fn build_artifact(
    schema: &str,
    table: &TableDef,
    module_name: &str,
    dialect: &dyn Dialect,
) -> SqlResult<GeneratedArtifact> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut columns = Vec::with_capacity(table.columns.len());

    for column in &table.columns {
        let ident = snake_case(&table.name, &column.name)?;
        if let Some(first) = seen.insert(ident.clone(), &column.name) {
            return Err(SqlError::NameCollision {
                table: table.name.clone(),
                identifier: ident,
                first: first.to_string(),
                second: column.name.clone(),
            });
        }
        let rust_type = map_column_type(dialect, &table.name, column);
        columns.push(GeneratedColumn {
            name: column.name.clone(),
            ident,
            data_type: column.data_type.clone(),
            rust_type,
            nullable: column.nullable,
            primary_key: column.primary_key,
        });
    }

    let mut artifact = GeneratedArtifact {
        table: table.name.clone(),
        is_view: table.kind == TableKind::View,
        module_name: module_name.to_string(),
        struct_name: pascal_case(module_name),
        columns,
        source: String::new(),
    };
    artifact.source = template::render_table(schema, &artifact);
    Ok(artifact)
}

/// Generate one artifact per table, sorted by table name.
///
/// Fails on the first identifier collision, whether between two tables or
/// between two columns of one table.
pub fn generate_artifacts(schema: &Schema, dialect: &dyn Dialect) -> SqlResult<Vec<GeneratedArtifact>> {
    let mut tables: Vec<&TableDef> = schema.tables.iter().collect();
    tables.sort_by(|a, b| a.name.cmp(&b.name));

    let mut modules: HashMap<String, &str> = HashMap::new();
    let mut planned = Vec::with_capacity(tables.len());
    for table in tables {
        let module = snake_case(&schema.name, &table.name)?;
        if let Some(first) = modules.insert(module.clone(), &table.name) {
            return Err(SqlError::NameCollision {
                table: schema.name.clone(),
                identifier: module,
                first: first.to_string(),
                second: table.name.clone(),
            });
        }
        planned.push((table, module));
    }

    planned
        .par_iter()
        .map(|(table, module)| build_artifact(&schema.name, table, module, dialect))
        .collect()
}

/// Generate and write `schema` to `dest`.
pub fn write_schema(dest: &Path, schema: &Schema, dialect: &dyn Dialect) -> SqlResult<Vec<GeneratedArtifact>> {
    let artifacts = generate_artifacts(schema, dialect)?;
    write_tree(dest, &schema.name, &artifacts)?;
    info!(
        path = %dest.display(),
        schema = %schema.name,
        dialect = dialect.name(),
        tables = artifacts.len(),
        "generated code written"
    );
    Ok(artifacts)
}

/// Output directory for one database schema: `dest_dir/dbname/schema`.
pub fn output_dir(dest_dir: &Path, dbname: &str, schema: &str) -> PathBuf {
    dest_dir.join(dbname).join(schema)
}

/// Introspect a live PostgreSQL schema and write its generated code.
///
/// Returns the directory written. The session is closed before any files are
/// touched; a failure to close is logged, not returned.
pub async fn generate(dest_dir: &Path, config: &ConnectionConfig) -> SqlResult<PathBuf> {
    let dbname = config
        .dbname()
        .ok_or_else(|| SqlError::Config("dbname is required to place generated code".to_string()))?
        .to_string();
    let schema_name = config.schema_name().to_string();

    let mut session = Session::open(config).await?;
    let loaded = load_schema(&mut session, &schema_name).await;
    if let Err(e) = session.close().await {
        warn!(error = %e, "failed to close session");
    }
    let schema = loaded?;

    let dest = output_dir(dest_dir, &dbname, &schema_name);
    write_schema(&dest, &schema, &POSTGRES)?;
    Ok(dest)
}

/// Same as [`generate`], reading the schema from a JSON snapshot.
pub fn generate_from_snapshot(
    dest_dir: &Path,
    snapshot: &Path,
    dbname: &str,
    dialect: &dyn Dialect,
) -> SqlResult<PathBuf> {
    let schema = Schema::from_file(snapshot)?;
    let dest = output_dir(dest_dir, dbname, &schema.name);
    write_schema(&dest, &schema, dialect)?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::MYSQL;
    use pretty_assertions::assert_eq;

    fn schema() -> Schema {
        let mut schema = Schema::new("public");
        schema.add_table(
            TableDef::new("orders")
                .pk("id", "int8")
                .required("userId", "uuid")
                .column("total", "numeric(10,2)")
                .column("tags", "_text"),
        );
        schema.add_table(
            TableDef::new("Users")
                .pk("id", "uuid")
                .required("email", "varchar(255)")
                .column("mood", "mood_enum"),
        );
        schema.add_table(TableDef::view("active_users").column("id", "uuid"));
        schema
    }

    #[test]
    fn test_tables_sorted_by_name() {
        let artifacts = generate_artifacts(&schema(), &POSTGRES).unwrap();
        let names: Vec<&str> = artifacts.iter().map(|a| a.table.as_str()).collect();
        assert_eq!(names, vec!["Users", "active_users", "orders"]);
        assert!(artifacts[1].is_view);
    }

    #[test]
    fn test_deterministic_output() {
        let first = generate_artifacts(&schema(), &POSTGRES).unwrap();
        let mut shuffled = schema();
        shuffled.tables.reverse();
        let second = generate_artifacts(&shuffled, &POSTGRES).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_columns_keep_ordinal_order_and_types() {
        let artifacts = generate_artifacts(&schema(), &POSTGRES).unwrap();
        let orders = &artifacts[2];
        let idents: Vec<&str> = orders.columns.iter().map(|c| c.ident.as_str()).collect();
        assert_eq!(idents, vec!["id", "user_id", "total", "tags"]);
        assert_eq!(orders.columns[1].rust_type, RustType::Uuid);
        assert_eq!(orders.columns[3].rust_type, RustType::String.nested(1));
        assert!(orders.source.contains("pub fn user_id() -> TypedColumn<uuid::Uuid>"));
    }

    #[test]
    fn test_unknown_type_is_untyped() {
        let artifacts = generate_artifacts(&schema(), &POSTGRES).unwrap();
        let mood = &artifacts[0].columns[2];
        assert_eq!(mood.rust_type, RustType::Untyped);
        assert!(artifacts[0].source.contains("pub mood: Option<sqlcraft::typed::Untyped>,"));
    }

    #[test]
    fn test_unparseable_type_is_untyped() {
        let mut schema = Schema::new("public");
        schema.add_table(TableDef::new("t").required("c", "USER-DEFINED"));
        let artifacts = generate_artifacts(&schema, &POSTGRES).unwrap();
        assert_eq!(artifacts[0].columns[0].rust_type, RustType::Untyped);
    }

    #[test]
    fn test_column_collision() {
        let mut schema = Schema::new("public");
        schema.add_table(TableDef::new("users").required("userId", "int4").required("user_id", "int4"));
        match generate_artifacts(&schema, &POSTGRES) {
            Err(SqlError::NameCollision { table, identifier, first, second }) => {
                assert_eq!(table, "users");
                assert_eq!(identifier, "user_id");
                assert_eq!(first, "userId");
                assert_eq!(second, "user_id");
            }
            other => panic!("expected a collision, got {:?}", other),
        }
    }

    #[test]
    fn test_table_collision() {
        let mut schema = Schema::new("public");
        schema.add_table(TableDef::new("order_items"));
        schema.add_table(TableDef::new("OrderItems"));
        assert!(matches!(
            generate_artifacts(&schema, &POSTGRES),
            Err(SqlError::NameCollision { identifier, .. }) if identifier == "order_items"
        ));
    }

    #[test]
    fn test_invalid_identifier() {
        let mut schema = Schema::new("public");
        schema.add_table(TableDef::new("t").required("$$", "int4"));
        assert!(matches!(
            generate_artifacts(&schema, &POSTGRES),
            Err(SqlError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_dialect_changes_types_only() {
        let mut schema = Schema::new("shop");
        schema.add_table(TableDef::new("items").required("qty", "int unsigned"));
        let pg = generate_artifacts(&schema, &POSTGRES).unwrap();
        let my = generate_artifacts(&schema, &MYSQL).unwrap();
        assert_eq!(pg[0].columns[0].rust_type, RustType::I32);
        assert_eq!(my[0].columns[0].rust_type, RustType::U32);
        assert_eq!(pg[0].module_name, my[0].module_name);
    }

    #[test]
    fn test_generate_from_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let snapshot = tmp.path().join("schema.json");
        schema().save(&snapshot).unwrap();

        let dest = generate_from_snapshot(&tmp.path().join("gen"), &snapshot, "shop", &POSTGRES).unwrap();
        assert_eq!(dest, tmp.path().join("gen").join("shop").join("public"));
        for file in ["mod.rs", "users.rs", "orders.rs", "active_users.rs"] {
            assert!(dest.join(file).exists(), "{} missing", file);
        }
    }
}
