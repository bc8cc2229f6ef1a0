//! `sqlcraft.toml` configuration.
//!
//! ```toml
//! [connection]
//! host = "localhost"
//! port = 5432
//! user = "app"
//! dbname = "shop"
//! schema = "public"
//!
//! [output]
//! path = "src/db"
//! dialect = "postgres"
//! ```
//!
//! The file is looked up in the working directory first, then in the user
//! config directory (`~/.config/sqlcraft/config.toml` on Linux). Command-line
//! flags override whatever the file sets.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::dialect::{self, Dialect, POSTGRES};
use crate::error::{SqlError, SqlResult};
use crate::session::ConnectionConfig;

/// Config file name looked up in the working directory.
pub const CONFIG_FILE: &str = "sqlcraft.toml";

/// Output directory used when neither the file nor the CLI sets one.
pub const DEFAULT_OUTPUT: &str = "gen";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory; files land in `path/dbname/schema`.
    pub path: Option<PathBuf>,
    /// Dialect used for type mapping (`postgres`, `mysql`, `sqlite`).
    pub dialect: Option<String>,
}

fn pick<T>(over: Option<T>, base: Option<T>) -> Option<T> {
    over.or(base)
}

impl Config {
    pub fn from_toml(content: &str) -> SqlResult<Self> {
        toml::from_str(content).map_err(|e| SqlError::Config(format!("invalid config: {}", e)))
    }

    pub fn load(path: &Path) -> SqlResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SqlError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// First existing config file: `./sqlcraft.toml`, then the user config dir.
    pub fn default_path() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("sqlcraft").join("config.toml"))
            .filter(|path| path.is_file())
    }

    /// Load `explicit` if given, otherwise the first file [`default_path`]
    /// finds, otherwise an empty config.
    ///
    /// [`default_path`]: Config::default_path
    pub fn discover(explicit: Option<&Path>) -> SqlResult<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path(),
        };
        match path {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Overlay connection fields set on the command line.
    pub fn with_connection(mut self, overrides: ConnectionConfig) -> Self {
        let base = std::mem::take(&mut self.connection);
        self.connection = ConnectionConfig {
            host: pick(overrides.host, base.host),
            port: pick(overrides.port, base.port),
            user: pick(overrides.user, base.user),
            password: pick(overrides.password, base.password),
            dbname: pick(overrides.dbname, base.dbname),
            sslmode: pick(overrides.sslmode, base.sslmode),
            params: pick(overrides.params, base.params),
            schema: pick(overrides.schema, base.schema),
        };
        self
    }

    pub fn with_output(mut self, path: Option<PathBuf>, dialect: Option<String>) -> Self {
        self.output.path = pick(path, self.output.path.take());
        self.output.dialect = pick(dialect, self.output.dialect.take());
        self
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }

    /// Configured dialect, PostgreSQL when unset.
    pub fn dialect(&self) -> SqlResult<&'static dyn Dialect> {
        match self.output.dialect.as_deref() {
            None => Ok(&POSTGRES),
            Some(name) => dialect::by_name(name)
                .ok_or_else(|| SqlError::Config(format!("unknown dialect '{}'", name))),
        }
    }
}
