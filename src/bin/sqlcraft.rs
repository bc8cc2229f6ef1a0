//! sqlcraft: generate typed SQL descriptors from a database schema.
//!
//! # Usage
//!
//! ```bash
//! # Introspect a live database into gen/<dbname>/<schema>
//! sqlcraft generate --host localhost --user app --dbname shop --schema public --path gen
//!
//! # Save a schema snapshot, then generate from it offline
//! sqlcraft snapshot --dbname shop --out shop.json
//! sqlcraft generate --snapshot shop.json --dbname shop --dialect postgres
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use sqlcraft::codegen;
use sqlcraft::config::Config;
use sqlcraft::introspect::load_schema;
use sqlcraft::session::{ConnectionConfig, Session};

#[derive(Parser)]
#[command(name = "sqlcraft")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Type-safe SQL descriptors from your database schema", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqlcraft generate --dbname shop --path src/db
    sqlcraft snapshot --dbname shop --out shop.json
    sqlcraft generate --snapshot shop.json --dbname shop")]
struct Cli {
    /// Config file (default: ./sqlcraft.toml, then the user config dir)
    #[arg(short, long, global = true, env = "SQLCRAFT_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate typed table and column descriptors
    Generate {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Output root; files land in <path>/<dbname>/<schema>
        #[arg(long, env = "SQLCRAFT_PATH")]
        path: Option<PathBuf>,

        /// Dialect used for type mapping (postgres, mysql, sqlite)
        #[arg(short, long, env = "SQLCRAFT_DIALECT")]
        dialect: Option<String>,

        /// Read the schema from a JSON snapshot instead of a database
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Introspect a schema and save it as a JSON snapshot
    Snapshot {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Snapshot file to write
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[derive(Args)]
struct ConnectionArgs {
    #[arg(long, env = "SQLCRAFT_HOST")]
    host: Option<String>,
    #[arg(long, env = "SQLCRAFT_PORT")]
    port: Option<u16>,
    #[arg(long, env = "SQLCRAFT_USER")]
    user: Option<String>,
    #[arg(long, env = "SQLCRAFT_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[arg(long, env = "SQLCRAFT_DBNAME")]
    dbname: Option<String>,
    #[arg(long, env = "SQLCRAFT_SSLMODE")]
    sslmode: Option<String>,
    /// Extra key=value connection parameters
    #[arg(long, env = "SQLCRAFT_PARAMS")]
    params: Option<String>,
    /// Schema to introspect (default: public)
    #[arg(long, env = "SQLCRAFT_SCHEMA")]
    schema: Option<String>,
}

impl From<ConnectionArgs> for ConnectionConfig {
    fn from(args: ConnectionArgs) -> Self {
        ConnectionConfig {
            host: args.host,
            port: args.port,
            user: args.user,
            password: args.password,
            dbname: args.dbname,
            sslmode: args.sslmode,
            params: args.params,
            schema: args.schema,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "sqlcraft=debug" } else { "sqlcraft=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::discover(cli.config.as_deref())?;
    match cli.command {
        Commands::Generate {
            connection,
            path,
            dialect,
            snapshot,
        } => {
            let config = config.with_connection(connection.into()).with_output(path, dialect);
            match snapshot {
                Some(file) => generate_offline(&config, &file),
                None => generate_live(&config).await,
            }
        }
        Commands::Snapshot { connection, out } => {
            let config = config.with_connection(connection.into());
            save_snapshot(&config.connection, &out).await
        }
    }
}

async fn generate_live(config: &Config) -> Result<()> {
    let connection = &config.connection;
    if config.dialect()?.name() != "postgres" {
        anyhow::bail!("live introspection only supports postgres; use --snapshot for other dialects");
    }
    println!(
        "{} {}",
        "Connecting:".dimmed(),
        connection.redacted_description().cyan()
    );
    let dest = codegen::generate(&config.output_path(), connection)
        .await
        .context("generation failed")?;
    print_done(&dest);
    Ok(())
}

fn generate_offline(config: &Config, snapshot: &Path) -> Result<()> {
    let dbname = config
        .connection
        .dbname()
        .context("--dbname is required to place generated code")?;
    println!("{} {}", "Snapshot:".dimmed(), snapshot.display().to_string().cyan());
    let dest = codegen::generate_from_snapshot(&config.output_path(), snapshot, dbname, config.dialect()?)
        .context("generation failed")?;
    print_done(&dest);
    Ok(())
}

async fn save_snapshot(connection: &ConnectionConfig, out: &Path) -> Result<()> {
    let schema_name = connection.schema_name();
    let mut session = Session::open(connection).await?;
    let loaded = load_schema(&mut session, schema_name).await;
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "failed to close session");
    }
    let schema = loaded?;
    schema.save(out)?;
    println!(
        "{} {} ({} tables) -> {}",
        "✓".green(),
        schema.name.bold(),
        schema.tables.len(),
        out.display()
    );
    Ok(())
}

fn print_done(dest: &Path) {
    println!("{} {}", "✓ Generated".green().bold(), dest.display());
}
