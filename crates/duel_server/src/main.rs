//! Arcane Duel - interactive terminal session.
//!
//! Type a tool name (any alias, any casing) and press enter. The bot answers
//! through the same match host. Session commands: `tools`, `status`,
//! `reset`, `quit`.
//!
//! ```bash
//! cargo run -p duel_server --bin duel -- --mode real-time --dodging
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use duel_core::catalog::ToolCatalog;
use duel_core::combatant::Side;
use duel_core::config::TimingMode;
use duel_server::render::{describe_action, describe_catalog, describe_outcome, describe_state};
use duel_server::{spawn_match, HostError, MatchEvent, MatchHandle, ServerConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    TurnBased,
    RealTime,
}

#[derive(Parser)]
#[command(name = "duel")]
#[command(about = "Duel the bot by typing tool names")]
#[command(version)]
struct Cli {
    /// Host config file (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tool catalog file (RON), overrides the config
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Timing mode, overrides the config
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Enable dodge tools
    #[arg(long)]
    dodging: bool,

    /// Bot seed, overrides the config
    #[arg(long)]
    seed: Option<u64>,
}

fn load_config(cli: &Cli) -> Result<ServerConfig, HostError> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(catalog) = &cli.catalog {
        config.catalog_path = Some(catalog.clone());
    }
    match cli.mode {
        Some(Mode::TurnBased) => config.engine.mode = TimingMode::TurnBased,
        Some(Mode::RealTime) => config.engine.mode = TimingMode::RealTime,
        None => {}
    }
    if cli.dodging {
        config.engine.dodging_enabled = true;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    Ok(config)
}

/// Print the bot's actions and the end of the match as they happen.
async fn print_events(mut events: broadcast::Receiver<MatchEvent>) {
    loop {
        match events.recv().await {
            Ok(MatchEvent::Action { record }) if record.actor == Side::Bot => {
                println!("{}", describe_action(&record));
            }
            Ok(MatchEvent::Stalled { side }) => {
                println!("== {side} has nothing usable == (type `reset` to play again)");
            }
            Ok(MatchEvent::GameOver { outcome }) => {
                println!("== {} == (type `reset` to play again)", describe_outcome(outcome));
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Event printer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn session(handle: &MatchHandle, catalog: &ToolCatalog) -> Result<(), HostError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", describe_state(&handle.snapshot().await?));
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => continue,
            "quit" | "exit" => break,
            "tools" => println!("{}", describe_catalog(catalog)),
            "status" => println!("{}", describe_state(&handle.snapshot().await?)),
            "reset" => println!("{}", describe_state(&handle.reset().await?)),
            _ => match handle.use_tool(input).await? {
                Ok(record) => println!("{}", describe_action(&record)),
                Err(reason) => println!("! {reason}"),
            },
        }
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), HostError> {
    let config = load_config(&cli)?;
    let catalog = config.catalog()?;
    println!("{}\n", describe_catalog(&catalog));

    let (handle, worker) = spawn_match(&config, Arc::clone(&catalog));
    let printer = tokio::spawn(print_events(handle.subscribe()));

    let outcome = session(&handle, &catalog).await;

    handle.shutdown().await?;
    worker.await.map_err(HostError::WorkerJoin)?;
    printer.abort();
    outcome
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    tracing::info!("Starting Arcane Duel session");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Session failed: {e}");
            ExitCode::FAILURE
        }
    }
}
