//! schemasync CLI
//!
//! Console front end for the reconciliation engine: lists tables and
//! columns, creates tables, and reconciles a live table against a
//! desired schema described in a JSON file.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use schemasync::prelude::*;

/// Reconcile live PostgreSQL table schemas against desired
/// descriptions.
#[derive(Parser)]
#[command(name = "schemasync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL. Overrides the config file when set.
    #[arg(short, long, env = "DATABASE_URL")]
    database: Option<String>,

    /// JSON config file with host/port/dbname/user/password.
    #[arg(short, long, default_value = "db_config.json")]
    config: PathBuf,

    /// Answer yes to every confirmation prompt.
    #[arg(short, long)]
    yes: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List public-schema tables.
    Tables,

    /// Show the columns of a table.
    Columns {
        /// Table name.
        table: String,
    },

    /// Create a table from a schema file.
    Create {
        /// Path to the desired-schema JSON file.
        schema: PathBuf,
    },

    /// Reconcile a live table against a schema file.
    Reconcile {
        /// Path to the desired-schema JSON file.
        schema: PathBuf,
    },

    /// Drop a table.
    DropTable {
        /// Table name.
        name: String,
    },

    /// Drop a single column.
    DropColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },
}

/// Desired schema as written in a JSON file.
#[derive(Debug, Deserialize)]
struct SchemaFile {
    name: String,
    fields: Vec<FieldSpec>,
}

#[derive(Debug, Deserialize)]
struct FieldSpec {
    name: String,
    #[serde(rename = "type")]
    column_type: String,
    #[serde(default)]
    primary: bool,
    #[serde(default = "default_nullable")]
    nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl SchemaFile {
    fn load(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Builds the engine schema through the sanitizing constructors.
    fn into_schema(self) -> Result<TableSchema> {
        let mut schema = TableSchema::new(self.name)?;
        for spec in self.fields {
            let mut field = TableField::new(&spec.name, ColumnType::from_native(&spec.column_type));
            if spec.primary {
                field = field.primary_key();
            } else if !spec.nullable {
                field = field.not_null();
            }
            schema = schema.field(field);
        }
        Ok(schema)
    }
}

/// Stdin-backed decision handler.
struct ConsolePrompt {
    assume_yes: bool,
}

impl DecisionHandler for ConsolePrompt {
    fn confirm(&self, title: &str, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{title}: {message} [y/N] ");
        std::io::stdout().flush().ok();

        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }

    fn notify_info(&self, message: &str) {
        println!("{message}");
    }

    fn notify_error(&self, message: &str) {
        eprintln!("error: {message}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let url = match cli.database {
        Some(url) => url,
        None => DatabaseConfig::load(&cli.config)?.url(),
    };

    let session = PgSession::connect(&url).await?;
    let manager = SchemaManager::new(
        session,
        PostgresDialect::new(),
        ConsolePrompt {
            assume_yes: cli.yes,
        },
    );

    match cli.command {
        Commands::Tables => {
            let tables = manager.list_tables().await?;
            if tables.is_empty() {
                println!("No tables in the public schema.");
            } else {
                for table in tables {
                    println!("{table}");
                }
            }
        }

        Commands::Columns { table } => {
            let columns = manager.get_columns(&table).await?;
            if columns.is_empty() {
                println!("Table '{table}' has no columns (or does not exist).");
            } else {
                println!("{:<32} {:<24} {:<9} {}", "column", "type", "nullable", "primary");
                println!("{:-<72}", "");
                for column in columns {
                    println!(
                        "{:<32} {:<24} {:<9} {}",
                        column.name,
                        column.column_type.to_native(),
                        if column.is_nullable { "yes" } else { "no" },
                        if column.is_primary { "yes" } else { "" },
                    );
                }
            }
        }

        Commands::Create { schema } => {
            let desired = SchemaFile::load(&schema)?.into_schema()?;
            info!(table = %desired.name, "Creating table");
            manager.create(&desired).await?;
        }

        Commands::Reconcile { schema } => {
            let desired = SchemaFile::load(&schema)?.into_schema()?;
            match manager.reconcile(&desired).await? {
                ReconcileOutcome::Applied { operations } => {
                    info!(operations, "Reconciliation finished");
                }
                ReconcileOutcome::Cancelled => {
                    info!("Reconciliation cancelled");
                }
            }
        }

        Commands::DropTable { name } => {
            manager.delete_table(&name).await?;
        }

        Commands::DropColumn { table, column } => {
            manager.delete_column(&table, &column).await?;
        }
    }

    Ok(())
}
