mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::info;

use picnest_db::erd::{ErdFormat, render_erd};
use picnest_db::migrations;
use picnest_db::{Database, Schema};

#[derive(Parser)]
#[command(name = "picnest")]
#[command(about = "Developer tooling for the picnest social-graph store")]
struct Cli {
    /// Database file (overrides PICNEST_DB_PATH)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    Migrate,

    /// Render an entity-relationship diagram of the schema
    Erd {
        /// Output format: mermaid or dot
        #[arg(short, long, default_value = "mermaid")]
        format: ErdFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete stories whose expiry has passed
    PurgeStories {
        /// Reference time (RFC 3339); defaults to now
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },

    /// Print the row count of every table
    Counts {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "picnest_cli=info,picnest_db=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let schema = Arc::new(Schema::social());

    match cli.command {
        Commands::Erd { format, output } => {
            let diagram = render_erd(&schema, format);
            match output {
                Some(path) => {
                    std::fs::write(&path, diagram)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!("Diagram written to {}", path.display());
                }
                None => print!("{}", diagram),
            }
        }
        Commands::Migrate => {
            let db = open(cli.database, schema)?;
            let version = db.with_conn(migrations::current_version)?;
            println!("schema version {}", version);
        }
        Commands::PurgeStories { now } => {
            let db = open(cli.database, schema)?;
            let now = now.unwrap_or_else(Utc::now);
            let purged = db.purge_expired(now)?;
            println!("purged {} expired stories", purged);
        }
        Commands::Counts { json } => {
            let db = open(cli.database, schema)?;
            let counts = db.table_counts()?;
            if json {
                let map: serde_json::Map<String, serde_json::Value> = counts
                    .into_iter()
                    .map(|(table, n)| (table.to_string(), n.into()))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&map)?);
            } else {
                for (table, n) in counts {
                    println!("{:<12} {}", table, n);
                }
            }
        }
    }

    Ok(())
}

fn open(path: Option<PathBuf>, schema: Arc<Schema>) -> anyhow::Result<Database> {
    let config = config::store_config(path)?;
    let db = Database::open(&config, schema)
        .with_context(|| format!("opening {}", config.path.display()))?;
    Ok(db)
}
