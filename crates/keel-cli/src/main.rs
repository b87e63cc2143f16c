//! keel CLI
//!
//! Compiles table blueprints to dialect-specific DDL and runs statements
//! against a configured database.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use keel_client::{ClientConfig, Database, Value};
use keel_schema::{Blueprint, Dialect, SchemaCompiler};

/// Multi-dialect schema compiler and query runner.
#[derive(Parser)]
#[command(name = "keel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database URL; overrides the configuration file's connection.
    #[arg(short, long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the statements a blueprint compiles to.
    Sql {
        /// Target dialect (sqlite, mysql, postgres). Defaults to the
        /// configured database's dialect.
        #[arg(long)]
        dialect: Option<Dialect>,

        /// Blueprint JSON file.
        blueprint: PathBuf,
    },

    /// Compile a blueprint and run it against the database.
    Apply {
        /// Blueprint JSON file.
        blueprint: PathBuf,

        /// Show SQL without executing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Check whether a table exists.
    TableExists {
        /// Table name.
        table: String,
    },

    /// Run one statement and print the rows as JSON.
    Query {
        /// SQL text with positional placeholders.
        sql: String,

        /// Parameters; numbers, `true`/`false` and `null` are typed, the
        /// rest bind as text.
        params: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.database_url.as_deref())?;

    // Setup logging
    let log_level = if cli.verbose || config.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Sql { dialect, blueprint } => {
            let dialect = match dialect {
                Some(dialect) => dialect,
                None => config
                    .connection
                    .as_ref()
                    .context("--dialect is required without a configured database")?
                    .dialect()?,
            };
            let blueprint = read_blueprint(&blueprint)?;
            for statement in SchemaCompiler::new(dialect).compile(&blueprint)? {
                println!("{statement};");
            }
        }

        Commands::Apply { blueprint, dry_run } => {
            let blueprint = read_blueprint(&blueprint)?;

            if dry_run {
                let dialect = config
                    .connection
                    .as_ref()
                    .context("no database configured; pass --database-url or --config")?
                    .dialect()?;
                info!("Dry run mode - SQL will be printed but not executed.");
                for statement in SchemaCompiler::new(dialect).compile(&blueprint)? {
                    println!("{statement};");
                }
                return Ok(());
            }

            let db = connect(config).await?;
            let statements = db.run_blueprint(&blueprint).await?;
            info!(
                "Applied {} statement(s) to table '{}'.",
                statements.len(),
                blueprint.table()
            );
            db.close().await?;
        }

        Commands::TableExists { table } => {
            let db = connect(config).await?;
            let exists = db.table_exists(&table).await?;
            println!("{exists}");
            db.close().await?;
        }

        Commands::Query { sql, params } => {
            let db = connect(config).await?;
            let params: Vec<Value> = params.iter().map(|p| Value::parse_literal(p)).collect();
            let output = db.execute(&sql, &params).await?;
            if output.columns.is_empty() {
                info!("{} row(s) affected.", output.rows_affected);
            } else {
                println!("{}", serde_json::to_string_pretty(&output.to_json())?);
            }
            db.close().await?;
        }
    }

    Ok(())
}

/// Reads the configuration file, if any, then applies the URL override.
fn load_config(path: Option<&Path>, database_url: Option<&str>) -> anyhow::Result<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => ClientConfig::default(),
    };
    Ok(match database_url {
        Some(url) => config.with_url(url),
        None => config,
    })
}

fn read_blueprint(path: &Path) -> anyhow::Result<Blueprint> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read blueprint {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid blueprint JSON in {}", path.display()))
}

async fn connect(config: ClientConfig) -> anyhow::Result<Database> {
    Database::init(config)
        .await?
        .context("no database configured; pass --database-url or --config")
}
