//! PostgreSQL schema introspection.
//!
//! Metadata queries are built with the crate's own statement builders and
//! read `information_schema`, casting every domain-typed column to `text`
//! or `integer` so rows decode into plain Rust types.

use std::collections::{BTreeMap, HashMap};

use sqlx::Row;
use sqlx::postgres::PgRow;
use tracing::{debug, info, warn};

use crate::ast::col;
use crate::dialect::POSTGRES;
use crate::error::{SqlError, SqlResult};
use crate::schema::{ColumnDef, Schema, TableDef, TableKind};
use crate::serializer::Query;
use crate::session::Session;
use crate::statement::{SelectStatement, Statement, select, table};

pub(crate) fn tables_query(schema: &str) -> SqlResult<Query> {
    select([
        col("table_name").cast("text").alias("table_name"),
        col("table_type").cast("text").alias("table_type"),
    ])
    .from(table("information_schema.tables"))
    .filter(col("table_schema").eq(schema))
    .order_by(col("table_name"))
    .build(&POSTGRES)
}

pub(crate) fn columns_query(schema: &str) -> SqlResult<Query> {
    select([
        col("table_name").cast("text").alias("table_name"),
        col("column_name").cast("text").alias("column_name"),
        col("udt_name").cast("text").alias("udt_name"),
        col("is_nullable").cast("text").alias("is_nullable"),
        col("ordinal_position").cast("integer").alias("ordinal_position"),
    ])
    .from(table("information_schema.columns"))
    .filter(col("table_schema").eq(schema))
    .order_by(col("table_name"))
    .order_by(col("ordinal_position"))
    .build(&POSTGRES)
}

pub(crate) fn constraints_query(schema: &str) -> SqlResult<Query> {
    let source = table("information_schema.table_constraints").alias("tc").inner_join(
        table("information_schema.key_column_usage").alias("kcu"),
        col("tc.constraint_name")
            .eq(col("kcu.constraint_name"))
            .and(col("tc.table_schema").eq(col("kcu.table_schema"))),
    );
    constraint_select()
        .from(source)
        .filter(col("tc.table_schema").eq(schema))
        .filter(col("tc.constraint_type").in_list(["PRIMARY KEY", "UNIQUE"]))
        .build(&POSTGRES)
}

fn constraint_select() -> SelectStatement {
    select([
        col("tc.table_name").cast("text").alias("table_name"),
        col("kcu.column_name").cast("text").alias("column_name"),
        col("tc.constraint_name").cast("text").alias("constraint_name"),
        col("tc.constraint_type").cast("text").alias("constraint_type"),
    ])
}

fn text(row: &PgRow, schema: &str, table: Option<&str>, column: &str) -> SqlResult<String> {
    row.try_get::<String, _>(column)
        .map_err(|e| SqlError::MetadataRetrieval {
            schema: schema.to_string(),
            table: table.map(str::to_string),
            message: format!("reading {}: {}", column, e),
        })
}

async fn fetch(session: &mut Session, schema: &str, query: Query, what: &str) -> SqlResult<Vec<PgRow>> {
    let rows = session
        .fetch_all(&query)
        .await
        .map_err(|e| SqlError::metadata(schema, format!("querying {}: {}", what, e)))?;
    debug!(schema, what, rows = rows.len(), "metadata fetched");
    Ok(rows)
}

/// Load tables, views and columns of `schema`, sorted by table name.
pub async fn load_schema(session: &mut Session, schema: &str) -> SqlResult<Schema> {
    info!(schema, "introspecting schema");

    let mut tables: BTreeMap<String, TableDef> = BTreeMap::new();
    for row in fetch(session, schema, tables_query(schema)?, "tables").await? {
        let name = text(&row, schema, None, "table_name")?;
        let kind = text(&row, schema, Some(&name), "table_type")?;
        let def = match kind.as_str() {
            "VIEW" => TableDef::view(&name),
            _ => TableDef::new(&name),
        };
        tables.insert(name, def);
    }

    for row in fetch(session, schema, columns_query(schema)?, "columns").await? {
        let table_name = text(&row, schema, None, "table_name")?;
        let column = ColumnDef::new(
            &text(&row, schema, Some(&table_name), "column_name")?,
            &text(&row, schema, Some(&table_name), "udt_name")?,
        )
        .nullable(text(&row, schema, Some(&table_name), "is_nullable")? == "YES");
        tables
            .entry(table_name.clone())
            .or_insert_with(|| TableDef::new(&table_name))
            .add_column(column);
    }

    let rows = fetch(session, schema, constraints_query(schema)?, "constraints").await?;
    apply_constraints(&mut tables, schema, &rows)?;

    if tables.is_empty() {
        warn!(schema, "schema has no tables");
    }
    let views = tables.values().filter(|t| t.kind == TableKind::View).count();
    info!(schema, tables = tables.len() - views, views, "schema loaded");

    Ok(Schema {
        name: schema.to_string(),
        tables: tables.into_values().collect(),
    })
}

fn apply_constraints(
    tables: &mut BTreeMap<String, TableDef>,
    schema: &str,
    rows: &[PgRow],
) -> SqlResult<()> {
    // (table, column, constraint, type)
    let mut entries = Vec::with_capacity(rows.len());
    let mut widths: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let table = text(row, schema, None, "table_name")?;
        let column = text(row, schema, Some(&table), "column_name")?;
        let constraint = text(row, schema, Some(&table), "constraint_name")?;
        let kind = text(row, schema, Some(&table), "constraint_type")?;
        *widths.entry(constraint.clone()).or_default() += 1;
        entries.push((table, column, constraint, kind));
    }

    for (table, column, constraint, kind) in entries {
        let Some(def) = tables.get_mut(&table) else {
            continue;
        };
        let Some(col) = def.columns.iter_mut().find(|c| c.name == column) else {
            continue;
        };
        // composite keys make no single column unique
        let single = widths.get(&constraint).copied() == Some(1);
        match kind.as_str() {
            "PRIMARY KEY" => {
                col.primary_key = true;
                col.unique |= single;
            }
            "UNIQUE" => col.unique |= single,
            _ => {}
        }
    }
    Ok(())
}
