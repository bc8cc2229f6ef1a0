use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

use sqlcraft::codegen::{generate_artifacts, generate_from_snapshot, write_schema};
use sqlcraft::dialect::{MYSQL, POSTGRES};
use sqlcraft::error::SqlError;
use sqlcraft::schema::{Schema, TableDef};
use sqlcraft::session::ConnectionConfig;

fn dvds() -> Schema {
    let mut schema = Schema::new("dvds");
    schema.add_table(
        TableDef::new("film")
            .pk("film_id", "int4")
            .required("title", "varchar")
            .column("release_year", "int4")
            .column("rental_rate", "numeric(4,2)")
            .column("special_features", "_text")
            .column("fulltext", "tsvector"),
    );
    schema.add_table(
        TableDef::new("actor")
            .pk("actor_id", "int4")
            .required("firstName", "varchar(45)")
            .required("lastUpdate", "timestamp"),
    );
    schema
}

fn read_tree(dir: &Path) -> Vec<(String, String)> {
    let mut files: Vec<(String, String)> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let path = entry.unwrap().path();
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            (name, fs::read_to_string(&path).unwrap())
        })
        .collect();
    files.sort();
    files
}

#[test]
fn test_regeneration_is_byte_identical() {
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("dvds");

    write_schema(&dest, &dvds(), &POSTGRES).unwrap();
    let first = read_tree(&dest);
    write_schema(&dest, &dvds(), &POSTGRES).unwrap();
    let second = read_tree(&dest);

    assert_eq!(first, second);
    let names: Vec<&str> = first.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["actor.rs", "film.rs", "mod.rs"]);
}

#[test]
fn test_generated_film_module() {
    let artifacts = generate_artifacts(&dvds(), &POSTGRES).unwrap();
    let film = &artifacts[1].source;

    assert!(film.contains("pub struct Film;"));
    assert!(film.contains("const SCHEMA: Option<&'static str> = Some(\"dvds\");"));
    assert!(film.contains("pub fn film_id() -> TypedColumn<i32> {"));
    assert!(film.contains("pub fn rental_rate() -> TypedColumn<f64> {"));
    assert!(film.contains("pub fn special_features() -> TypedColumn<Vec<String>> {"));
    assert!(film.contains("pub fn fulltext() -> TypedColumn<sqlcraft::typed::Untyped> {"));
    assert!(film.contains("    pub title: String,\n"));
    assert!(film.contains("    pub release_year: Option<i32>,\n"));
}

#[test]
fn test_camel_case_columns() {
    let artifacts = generate_artifacts(&dvds(), &MYSQL).unwrap();
    let actor = &artifacts[0];
    let idents: Vec<&str> = actor.columns.iter().map(|c| c.ident.as_str()).collect();
    assert_eq!(idents, vec!["actor_id", "first_name", "last_update"]);
    assert!(actor.source.contains("TypedColumn::new(\"actor\", \"firstName\")"));
}

#[test]
fn test_collision_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("out");
    let mut schema = dvds();
    schema.add_table(TableDef::new("clash").required("a-b", "int4").required("a_b", "int4"));

    let err = write_schema(&dest, &schema, &POSTGRES).unwrap_err();
    assert!(matches!(err, SqlError::NameCollision { ref table, .. } if table == "clash"));
    assert!(!dest.exists());
}

#[test]
fn test_snapshot_layout() {
    let tmp = tempfile::tempdir().unwrap();
    let snapshot = tmp.path().join("dvds.json");
    dvds().save(&snapshot).unwrap();

    let dest = generate_from_snapshot(tmp.path(), &snapshot, "jetdb", &POSTGRES).unwrap();
    assert_eq!(dest, tmp.path().join("jetdb").join("dvds"));
    let module = fs::read_to_string(dest.join("mod.rs")).unwrap();
    assert!(module.contains("pub mod actor;\npub mod film;\n"));
}

#[test]
fn test_connection_description() {
    let config = ConnectionConfig {
        host: Some("localhost".into()),
        port: Some(5432),
        user: Some("jet".into()),
        password: Some("it's".into()),
        dbname: Some("jetdb".into()),
        sslmode: Some("disable".into()),
        ..Default::default()
    };
    assert_eq!(
        config.connection_description(),
        r"host='localhost' port=5432 user='jet' password='it\'s' dbname='jetdb' sslmode='disable'"
    );
    assert_eq!(
        config.redacted_description(),
        "host='localhost' port=5432 user='jet' password='***' dbname='jetdb' sslmode='disable'"
    );
}
