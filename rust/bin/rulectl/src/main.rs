//! `rulectl`: inspect and edit a policy rule database by hand.
//!
//! Usage:
//!   rulectl --db policy.sqlite list
//!   rulectl filter '{"p": ["", "like:data-%"]}'
//!   rulectl remove-filtered p 1 data1

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use policy::{AdapterConfig, SqlAdapter};
use tracing::debug;

/// Policy rule database tool.
#[derive(Parser, Debug)]
#[command(name = "rulectl", about = "Manage stored access-control policy rules")]
struct Cli {
    /// SQLite database file.
    #[arg(long = "db", global = true, default_value = "policy.sqlite")]
    db: PathBuf,

    /// Table holding the rules.
    #[arg(long = "table", global = true, default_value = policy::config::DEFAULT_TABLE)]
    table: String,

    /// Do not create the table when it is missing.
    #[arg(long = "no-create-table", global = true)]
    no_create_table: bool,

    /// Output format: lines or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "lines")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every stored rule.
    List,

    /// Print the rules selected by a JSON filter, e.g. '{"p": ["", "data1"]}'.
    Filter {
        /// Filter object: policy type to positional tokens.
        filter: String,
    },

    /// Store one rule.
    Add {
        /// Policy type (p, g, g2, ...).
        ptype: String,
        /// Rule values, v0 first.
        values: Vec<String>,
    },

    /// Delete rules whose leading values match.
    Remove {
        ptype: String,
        values: Vec<String>,
    },

    /// Delete rules whose values starting at FIELD_INDEX match.
    #[command(name = "remove-filtered")]
    RemoveFiltered {
        ptype: String,
        field_index: usize,
        values: Vec<String>,
    },

    /// Replace all stored rules with the policy lines of a file.
    Import {
        /// File of `ptype, v0, v1, ...` lines; `#` starts a comment.
        file: PathBuf,
    },

    /// Drop the rule table.
    Drop {
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = AdapterConfig {
        table_name: cli.table.clone(),
        create_table: !cli.no_create_table,
    };
    debug!("Opening {} with {:?}", cli.db.display(), config);

    let sql: Arc<dyn rulestore_sql::SQLStore> = Arc::new(
        rulestore_sql::SqliteStore::open(&cli.db)
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );
    let adapter = SqlAdapter::new(sql, config)?;
    let json = commands::is_json(&cli.output)?;

    match cli.command {
        Commands::List => commands::list(&adapter, json),
        Commands::Filter { filter } => commands::filter(&adapter, &filter, json),
        Commands::Add { ptype, values } => commands::add(&adapter, &ptype, &values),
        Commands::Remove { ptype, values } => commands::remove(&adapter, &ptype, &values),
        Commands::RemoveFiltered {
            ptype,
            field_index,
            values,
        } => commands::remove_filtered(&adapter, &ptype, field_index, &values),
        Commands::Import { file } => commands::import(&adapter, &file),
        Commands::Drop { yes } => commands::drop_table(&adapter, yes),
    }
}
