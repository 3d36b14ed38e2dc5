//! Arcane Duel - development tools.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use duel_core::catalog::ToolCatalog;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "duel-tools")]
#[command(about = "Development tools for Arcane Duel")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a catalog file, or every .ron file in a directory
    Validate {
        /// Catalog file or data directory
        #[arg(default_value = "crates/duel_core/data")]
        path: PathBuf,
    },

    /// List the tools in a catalog
    List {
        /// Catalog file, defaults to the standard catalog
        path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating catalogs in: {}", path.display());
            match duel_tools::validate::validate_path(&path) {
                Ok(reports) => {
                    let tools: usize = reports.iter().map(|r| r.tool_count).sum();
                    println!("OK: {} file(s), {tools} tool(s)", reports.len());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::List { path } => {
            let catalog = match &path {
                Some(path) => ToolCatalog::load(path),
                None => ToolCatalog::standard(),
            };
            match catalog {
                Ok(catalog) => {
                    println!("{}", duel_tools::list::format_listing(&catalog));
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    tracing::error!("Failed to load catalog: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
