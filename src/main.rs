//! # sqlclean CLI
//!
//! ```bash
//! sqlclean [--config FILE] [-v...] <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sqlclean index <REPO>` | Index a repository and print statistics |
//! | `sqlclean search <QUERY> --repo <REPO>` | Retrieve context for a query |
//! | `sqlclean strategies` | Describe the retrieval modes |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sqlclean::config::{load_config, validate, Config};
use sqlclean::logging::init_logging;
use sqlclean::search::{print_strategies, run_index, run_search, OutputFormat};
use sqlclean::strategy::RetrievalMode;

/// Retrieve repository context for SQL cleanup and optimization.
#[derive(Parser)]
#[command(
    name = "sqlclean",
    about = "Repository-context retrieval for SQL cleanup and optimization",
    version
)]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a repository and print what was found.
    Index {
        /// Repository root to scan.
        repo: PathBuf,
    },

    /// Index a repository and retrieve the fragments most relevant to a query.
    Search {
        /// Query text, usually the SQL to optimize.
        query: String,

        /// Repository root to scan.
        #[arg(long)]
        repo: PathBuf,

        /// Retrieval mode: simple or hybrid. Overrides the config.
        #[arg(long)]
        mode: Option<RetrievalMode>,

        /// Number of fragments to return. Overrides the config.
        #[arg(long)]
        top_k: Option<usize>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Describe the available retrieval modes.
    Strategies,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let config = Config::default();
            validate(&config)?;
            config
        }
    };
    init_logging(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Index { repo } => run_index(&config, &repo).await?,
        Commands::Search {
            query,
            repo,
            mode,
            top_k,
            format,
        } => run_search(&config, &repo, &query, mode, top_k, format).await?,
        Commands::Strategies => print_strategies(),
    }

    Ok(())
}
