//! Atomic replacement of a generated source tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::GeneratedArtifact;
use super::template;
use crate::error::SqlResult;

/// Sibling path of `dest` named `.{name}.{tag}-{pid}`.
fn sibling(dest: &Path, tag: &str) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "generated".to_string());
    let file = format!(".{}.{}-{}", name, tag, std::process::id());
    match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(file),
        _ => PathBuf::from(file),
    }
}

fn discard(dir: &Path) {
    if let Err(e) = fs::remove_dir_all(dir) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %dir.display(), error = %e, "failed to remove directory");
        }
    }
}

fn fill(staging: &Path, schema: &str, artifacts: &[GeneratedArtifact]) -> io::Result<()> {
    fs::create_dir(staging)?;
    for artifact in artifacts {
        let path = staging.join(format!("{}.rs", artifact.module_name));
        fs::write(&path, &artifact.source)?;
    }
    fs::write(staging.join("mod.rs"), template::render_mod(schema, artifacts))?;
    Ok(())
}

/// Write `mod.rs` plus one file per artifact to `dest`, replacing whatever
/// was there.
///
/// Files are written to a staging directory next to `dest` first. If any
/// step fails the staging directory is removed and an existing `dest` is left
/// untouched.
pub fn write_tree(dest: &Path, schema: &str, artifacts: &[GeneratedArtifact]) -> SqlResult<()> {
    let staging = sibling(dest, "staging");
    if let Some(parent) = staging.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    discard(&staging);

    if let Err(e) = fill(&staging, schema, artifacts) {
        discard(&staging);
        return Err(e.into());
    }
    debug!(staging = %staging.display(), files = artifacts.len() + 1, "staged generated files");

    if !dest.exists() {
        if let Err(e) = fs::rename(&staging, dest) {
            discard(&staging);
            return Err(e.into());
        }
        return Ok(());
    }

    let backup = sibling(dest, "backup");
    discard(&backup);
    if let Err(e) = fs::rename(dest, &backup) {
        discard(&staging);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&staging, dest) {
        if let Err(restore) = fs::rename(&backup, dest) {
            warn!(backup = %backup.display(), error = %restore, "failed to restore previous tree");
        }
        discard(&staging);
        return Err(e.into());
    }
    discard(&backup);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::RustType;
    use crate::codegen::GeneratedColumn;

    fn artifact(module: &str) -> GeneratedArtifact {
        GeneratedArtifact {
            table: module.to_string(),
            is_view: false,
            module_name: module.to_string(),
            struct_name: "Thing".to_string(),
            columns: vec![GeneratedColumn {
                name: "id".to_string(),
                ident: "id".to_string(),
                data_type: "int8".to_string(),
                rust_type: RustType::I64,
                nullable: false,
                primary_key: true,
            }],
            source: format!("// {}\n", module),
        }
    }

    fn leftovers(parent: &Path) -> Vec<String> {
        fs::read_dir(parent)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with('.'))
            .collect()
    }

    #[test]
    fn test_write_fresh_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("db").join("public");
        write_tree(&dest, "public", &[artifact("users"), artifact("orders")]).unwrap();

        assert_eq!(fs::read_to_string(dest.join("users.rs")).unwrap(), "// users\n");
        let module = fs::read_to_string(dest.join("mod.rs")).unwrap();
        assert!(module.contains("pub mod users;\npub mod orders;\n"));
        assert!(leftovers(&tmp.path().join("db")).is_empty());
    }

    #[test]
    fn test_rewrite_drops_stale_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("public");
        write_tree(&dest, "public", &[artifact("old_table")]).unwrap();
        write_tree(&dest, "public", &[artifact("users")]).unwrap();

        assert!(!dest.join("old_table.rs").exists());
        assert!(dest.join("users.rs").exists());
        assert!(leftovers(tmp.path()).is_empty());
    }

    #[test]
    fn test_failed_write_keeps_existing_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("public");
        write_tree(&dest, "public", &[artifact("users")]).unwrap();

        // a module path with a missing parent directory cannot be written
        let result = write_tree(&dest, "public", &[artifact("missing/dir")]);
        assert!(result.is_err());
        assert!(dest.join("users.rs").exists());
        assert!(leftovers(tmp.path()).is_empty());
    }
}
