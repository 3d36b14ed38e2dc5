//! Headless duel runner.
//!
//! Runs matches without a terminal UI, controlled via JSON on stdin/stdout,
//! or plays batches of bot-vs-bot matches for balance numbers.
//!
//! # Usage
//!
//! ```bash
//! # Protocol mode - read commands from stdin
//! cargo run -p duel_headless
//!
//! # Protocol mode with a real-time match
//! cargo run -p duel_headless -- run --mode real-time --dodging
//!
//! # Batch balance run
//! cargo run -p duel_headless -- batch --count 1000 --output results/
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): debug information
//!
//! See the protocol module for the command/response format.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use duel_core::config::TimingMode;
use duel_headless::{
    load_catalog, run_batch, BatchConfig, BatchResults, HeadlessConfig, HeadlessRunner,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    TurnBased,
    RealTime,
}

impl From<Mode> for TimingMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::TurnBased => Self::TurnBased,
            Mode::RealTime => Self::RealTime,
        }
    }
}

#[derive(Parser)]
#[command(name = "duel_headless")]
#[command(about = "Headless duel runner for scripted play and balance testing")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Tool catalog file (RON), defaults to the standard catalog
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one match over the JSON protocol
    Run {
        /// Runner config file (RON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Timing mode, overrides the config
        #[arg(short, long, value_enum)]
        mode: Option<Mode>,

        /// Enable dodge tools
        #[arg(long)]
        dodging: bool,

        /// Bot seed, overrides the config
        #[arg(long)]
        seed: Option<u64>,

        /// Output state after every action
        #[arg(long)]
        auto_state: bool,
    },

    /// Run a batch of bot-vs-bot matches
    Batch {
        /// Batch config file (RON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of matches, overrides the config
        #[arg(short = 'n', long)]
        count: Option<u32>,

        /// Timing mode, overrides the config
        #[arg(short, long, value_enum)]
        mode: Option<Mode>,

        /// Enable dodge tools
        #[arg(long)]
        dodging: bool,

        /// First seed, overrides the config
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads (0 = auto)
        #[arg(short, long)]
        parallel: Option<u32>,

        /// Directory to write batch.json into
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn cmd_run(
    catalog: Option<PathBuf>,
    config: Option<PathBuf>,
    mode: Option<Mode>,
    dodging: bool,
    seed: Option<u64>,
    auto_state: bool,
) -> duel_headless::Result<()> {
    let mut config = match config {
        Some(path) => HeadlessConfig::load(path)?,
        None => HeadlessConfig::default(),
    };
    if let Some(mode) = mode {
        config.engine.mode = mode.into();
    }
    if dodging {
        config.engine.dodging_enabled = true;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }
    config.auto_state |= auto_state;

    let catalog = load_catalog(catalog.as_deref())?;
    tracing::info!(tools = catalog.len(), "Starting protocol session");

    let mut runner = HeadlessRunner::new(config, catalog);
    runner.run(io::stdin().lock(), io::stdout().lock())
}

fn cmd_batch(
    catalog: Option<PathBuf>,
    config: Option<PathBuf>,
    count: Option<u32>,
    mode: Option<Mode>,
    dodging: bool,
    seed: Option<u64>,
    parallel: Option<u32>,
    output: Option<PathBuf>,
) -> duel_headless::Result<()> {
    let mut config = match config {
        Some(path) => BatchConfig::load(path)?,
        None => BatchConfig::default(),
    };
    if let Some(count) = count {
        config.match_count = count;
    }
    if let Some(mode) = mode {
        config.engine.mode = mode.into();
    }
    if dodging {
        config.engine.dodging_enabled = true;
    }
    if let Some(seed) = seed {
        config.seed_start = seed;
    }
    if let Some(parallel) = parallel {
        config.parallel = parallel;
    }

    let catalog = load_catalog(catalog.as_deref())?;
    let results = run_batch(config, &catalog);

    if let Some(dir) = output {
        let path = BatchResults::default_path(&dir);
        results.save(&path)?;
        tracing::info!(path = %path.display(), "Saved batch results");
    }

    println!("{}", serde_json::to_string_pretty(&results.summary)?);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout is reserved for the protocol
    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();

    let outcome = match cli.command {
        Some(Commands::Run {
            config,
            mode,
            dodging,
            seed,
            auto_state,
        }) => cmd_run(cli.catalog, config, mode, dodging, seed, auto_state),
        Some(Commands::Batch {
            config,
            count,
            mode,
            dodging,
            seed,
            parallel,
            output,
        }) => cmd_batch(
            cli.catalog,
            config,
            count,
            mode,
            dodging,
            seed,
            parallel,
            output,
        ),
        None => cmd_run(cli.catalog, None, None, false, None, false),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
