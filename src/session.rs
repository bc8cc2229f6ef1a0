//! Database sessions.
//!
//! A [`ConnectionConfig`] only carries the fields the caller actually set.
//! Everything left unset falls through to the `PG*` environment variables,
//! the same way libpq treats a conninfo string that omits a keyword.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{take_till1, take_while1},
    character::complete::{anychar, char, multispace0, multispace1, none_of},
    combinator::{all_consuming, map},
    multi::{many0, separated_list0},
    sequence::{delimited, preceded, separated_pair},
};
use serde::{Deserialize, Serialize};
use sqlx::Connection;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgConnection, PgRow, PgSslMode};
use tracing::{debug, info, warn};

use crate::ast::Value;
use crate::error::{SqlError, SqlResult};
use crate::serializer::Query;

/// Schema introspected when none is configured.
pub const DEFAULT_SCHEMA: &str = "public";

/// Connection fields. `None` and empty strings both mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub dbname: Option<String>,
    pub sslmode: Option<String>,
    /// Extra `key=value` parameters, appended verbatim to the description.
    pub params: Option<String>,
    /// Schema to introspect; defaults to `public`.
    pub schema: Option<String>,
}

fn set(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Escape a value for a single-quoted conninfo clause.
///
/// Backslashes are doubled first, then each quote gets a backslash, which is
/// how libpq reads a quoted conninfo value back.
pub fn escape_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

impl ConnectionConfig {
    pub fn schema_name(&self) -> &str {
        set(&self.schema).unwrap_or(DEFAULT_SCHEMA)
    }

    pub fn dbname(&self) -> Option<&str> {
        set(&self.dbname)
    }

    /// Space-joined `key='value'` clauses for every set field, then the raw
    /// params string.
    pub fn connection_description(&self) -> String {
        self.describe(false)
    }

    /// Same as [`connection_description`](Self::connection_description) with
    /// the password masked.
    pub fn redacted_description(&self) -> String {
        self.describe(true)
    }

    fn describe(&self, redact: bool) -> String {
        let mut parts = Vec::new();
        if let Some(host) = set(&self.host) {
            parts.push(format!("host='{}'", escape_value(host)));
        }
        if let Some(port) = self.port.filter(|p| *p != 0) {
            parts.push(format!("port={}", port));
        }
        if let Some(user) = set(&self.user) {
            parts.push(format!("user='{}'", escape_value(user)));
        }
        if let Some(password) = set(&self.password) {
            if redact {
                parts.push("password='***'".to_string());
            } else {
                parts.push(format!("password='{}'", escape_value(password)));
            }
        }
        if let Some(dbname) = set(&self.dbname) {
            parts.push(format!("dbname='{}'", escape_value(dbname)));
        }
        if let Some(sslmode) = set(&self.sslmode) {
            parts.push(format!("sslmode='{}'", escape_value(sslmode)));
        }
        if let Some(params) = self.params.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            parts.push(params.to_string());
        }
        parts.join(" ")
    }

    /// Driver options built from the set fields only.
    pub fn connect_options(&self) -> SqlResult<PgConnectOptions> {
        let mut options = PgConnectOptions::new();
        if let Some(host) = set(&self.host) {
            options = options.host(host);
        }
        if let Some(port) = self.port.filter(|p| *p != 0) {
            options = options.port(port);
        }
        if let Some(user) = set(&self.user) {
            options = options.username(user);
        }
        if let Some(password) = set(&self.password) {
            options = options.password(password);
        }
        if let Some(dbname) = set(&self.dbname) {
            options = options.database(dbname);
        }
        if let Some(sslmode) = set(&self.sslmode) {
            let mode: PgSslMode = sslmode
                .parse()
                .map_err(|e| SqlError::Config(format!("invalid sslmode '{}': {}", sslmode, e)))?;
            options = options.ssl_mode(mode);
        }
        if let Some(raw) = set(&self.params) {
            for (key, value) in parse_params(raw)? {
                options = match key.as_str() {
                    "application_name" => options.application_name(&value),
                    "sslrootcert" => options.ssl_root_cert(value.as_str()),
                    "sslcert" => options.ssl_client_cert(value.as_str()),
                    "sslkey" => options.ssl_client_key(value.as_str()),
                    "search_path" => options.options([("search_path", value.as_str())]),
                    _ => {
                        warn!(parameter = %key, "ignoring unsupported connection parameter");
                        options
                    }
                };
            }
        }
        Ok(options)
    }
}

fn param_key(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn quoted_value(input: &str) -> IResult<&str, String> {
    map(
        delimited(
            char('\''),
            many0(alt((preceded(char('\\'), anychar), none_of("\\'")))),
            char('\''),
        ),
        |chars| chars.into_iter().collect(),
    )(input)
}

fn bare_value(input: &str) -> IResult<&str, String> {
    map(take_till1(|c: char| c.is_whitespace()), str::to_string)(input)
}

fn param_pair(input: &str) -> IResult<&str, (&str, String)> {
    separated_pair(
        param_key,
        delimited(multispace0, char('='), multispace0),
        alt((quoted_value, bare_value)),
    )(input)
}

/// Parse a libpq style `key=value key='quoted value'` list.
pub fn parse_params(raw: &str) -> SqlResult<Vec<(String, String)>> {
    let (_, pairs) = all_consuming(delimited(
        multispace0,
        separated_list0(multispace1, param_pair),
        multispace0,
    ))(raw)
    .map_err(|e| SqlError::Config(format!("invalid connection params '{}': {}", raw, e)))?;
    Ok(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

type PgQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, PgArguments>;

fn bind_value<'q>(query: PgQuery<'q>, value: &Value) -> PgQuery<'q> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Int(n) => query.bind(*n),
        Value::Float(n) => query.bind(*n),
        Value::Text(s) => query.bind(s.clone()),
        Value::Bytes(bytes) => query.bind(bytes.clone()),
        Value::Uuid(u) => query.bind(*u),
        Value::Date(d) => query.bind(*d),
        Value::Time(t) => query.bind(*t),
        Value::Timestamp(ts) => query.bind(*ts),
        Value::TimestampTz(ts) => query.bind(*ts),
        Value::Json(json) => query.bind(json.clone()),
    }
}

/// An open, verified PostgreSQL connection.
///
/// [`close`](Session::close) consumes the session, so it can only be
/// released once.
pub struct Session {
    conn: PgConnection,
    description: String,
}

impl Session {
    /// Connect and ping. A failed ping closes the connection before returning.
    pub async fn open(config: &ConnectionConfig) -> SqlResult<Self> {
        let description = config.redacted_description();
        let options = config.connect_options()?;
        debug!(%description, "opening session");

        let mut conn = PgConnection::connect_with(&options)
            .await
            .map_err(|e| SqlError::Connection {
                description: description.clone(),
                message: e.to_string(),
            })?;

        if let Err(e) = conn.ping().await {
            if let Err(close_err) = conn.close().await {
                warn!(error = %close_err, "failed to close connection after ping failure");
            }
            return Err(SqlError::Connection {
                description,
                message: format!("ping failed: {}", e),
            });
        }

        info!(%description, "session open");
        Ok(Self { conn, description })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Run a built query and return every row.
    pub async fn fetch_all(&mut self, query: &Query) -> SqlResult<Vec<PgRow>> {
        debug!(sql = %query.sql, params = query.params.len(), "fetch_all");
        let mut prepared = sqlx::query(&query.sql);
        for value in &query.params {
            prepared = bind_value(prepared, value);
        }
        Ok(prepared.fetch_all(&mut self.conn).await?)
    }

    pub async fn close(self) -> SqlResult<()> {
        debug!(description = %self.description, "closing session");
        self.conn.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> ConnectionConfig {
        ConnectionConfig {
            host: Some("localhost".into()),
            port: Some(5432),
            user: Some("jet".into()),
            password: Some("secret".into()),
            dbname: Some("dvds".into()),
            sslmode: Some("disable".into()),
            params: Some("application_name=gen".into()),
            schema: Some("dvds".into()),
        }
    }

    #[test]
    fn test_full_description() {
        assert_eq!(
            config().connection_description(),
            "host='localhost' port=5432 user='jet' password='secret' dbname='dvds' \
             sslmode='disable' application_name=gen"
        );
    }

    #[test]
    fn test_only_set_fields_are_described() {
        let config = ConnectionConfig {
            host: Some("db.internal".into()),
            user: Some("reader".into()),
            password: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            config.connection_description(),
            "host='db.internal' user='reader'"
        );
    }

    #[test]
    fn test_params_only() {
        let config = ConnectionConfig {
            params: Some("connect_timeout=5".into()),
            ..Default::default()
        };
        assert_eq!(config.connection_description(), "connect_timeout=5");
        assert_eq!(ConnectionConfig::default().connection_description(), "");
    }

    #[test]
    fn test_escape_backslash_before_quote() {
        assert_eq!(escape_value(r"a\b"), r"a\\b");
        assert_eq!(escape_value("o'neil"), r"o\'neil");
        assert_eq!(escape_value(r"x\'y"), r"x\\\'y");

        let config = ConnectionConfig {
            password: Some(r"p\'w".into()),
            ..Default::default()
        };
        assert_eq!(config.connection_description(), r"password='p\\\'w'");
    }

    #[test]
    fn test_escaped_values_parse_back() {
        for value in ["o'neil", r"a\b", r"x\'y", r"\'", "''", "plain"] {
            let clause = format!("password='{}'", escape_value(value));
            let pairs = parse_params(&clause).unwrap();
            assert_eq!(pairs, vec![("password".to_string(), value.to_string())]);
        }
    }

    #[test]
    fn test_redacted_description() {
        let redacted = config().redacted_description();
        assert!(redacted.contains("password='***'"));
        assert!(!redacted.contains("secret"));
    }

    #[test]
    fn test_schema_default() {
        assert_eq!(ConnectionConfig::default().schema_name(), "public");
        assert_eq!(config().schema_name(), "dvds");
    }

    #[test]
    fn test_parse_params() {
        let pairs = parse_params(r"application_name='my app' sslrootcert=/etc/ca.pem x='it\'s'").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("application_name".to_string(), "my app".to_string()),
                ("sslrootcert".to_string(), "/etc/ca.pem".to_string()),
                ("x".to_string(), "it's".to_string()),
            ]
        );
        assert!(parse_params("=oops").is_err());
        assert!(parse_params("  ").unwrap().is_empty());
    }

    #[test]
    fn test_connect_options_rejects_bad_sslmode() {
        let config = ConnectionConfig {
            sslmode: Some("sometimes".into()),
            ..Default::default()
        };
        assert!(matches!(config.connect_options(), Err(SqlError::Config(_))));
    }
}
