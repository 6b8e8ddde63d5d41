//! data-grid CLI entry point.
//!
//! Exercises the resolver and catalog from a kernel-adjacent shell: resolve
//! the current session, bind a table to its database, or inspect the
//! catalog entries of an origin. Output is JSON on stdout.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use grid_protocol::{DataGridWidget, WidgetMessage};

use data_grid::bind::bind;
use data_grid::catalog::Catalog;
use data_grid::resolver::{resolve, ResolverConfig};

#[derive(Parser, Debug)]
#[command(name = "data-grid")]
#[command(about = "Bind notebook sessions to browser-local pivot-grid databases")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Jupyter runtime directory (default: the platform runtime dir)
    #[arg(long, global = true)]
    runtime_dir: Option<PathBuf>,

    /// Notebook server pid (default: this process's parent)
    #[arg(long, global = true)]
    parent_pid: Option<u32>,

    /// Chrome profile databases directory
    #[arg(long, global = true)]
    catalog_root: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve the running server, origin, and session for this process
    Resolve,

    /// Bind a table to a session-backed database and print the open message
    Bind {
        /// Table to pivot
        #[arg(long)]
        table: String,

        /// Database name (skips session resolution when given)
        #[arg(long)]
        db: Option<String>,

        /// Source query forwarded to the view
        #[arg(long)]
        source: Option<String>,
    },

    /// List the catalog entries registered under an origin
    Databases {
        /// Origin key, e.g. http_localhost_8888_
        #[arg(long)]
        origin: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    let catalog = Catalog::new(
        cli.catalog_root
            .clone()
            .unwrap_or_else(Catalog::default_root),
    );

    match &cli.command {
        Commands::Resolve => {
            let resolved = resolve(&resolver_config(&cli)?).await?;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
        Commands::Bind { table, db, source } => {
            let widget = match db {
                Some(db) => DataGridWidget::new(table, db),
                None => bind(table, &resolver_config(&cli)?, &catalog).await?,
            };
            let widget = match source {
                Some(source) => widget.with_source(source),
                None => widget,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&WidgetMessage::open(widget))?
            );
        }
        Commands::Databases { origin } => {
            let entries = catalog.databases(origin)?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }

    Ok(())
}

fn resolver_config(cli: &Cli) -> anyhow::Result<ResolverConfig> {
    let mut config = match cli.parent_pid {
        Some(pid) => ResolverConfig::new(pid),
        None => ResolverConfig::from_env()?,
    };
    if let Some(dir) = &cli.runtime_dir {
        config.runtime_dir = dir.clone();
    }
    Ok(config)
}
