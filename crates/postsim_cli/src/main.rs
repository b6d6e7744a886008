//! Postsim CLI - Posterior-Predictive Simulation from the Command Line
//!
//! Runs the pooled draw engine against the reference demand/supply model.
//!
//! # Commands
//!
//! - `postsim simulate --posterior <json> --data <csv>` - Posterior-predictive simulation
//! - `postsim irfs --posterior <json> --shock demand` - Impulse responses per draw
//! - `postsim check --posterior <json>` - Validate a posterior and print its summaries
//!
//! # Configuration
//!
//! Settings are read from an optional TOML file, then `POSTSIM_*` environment
//! variables, then command-line flags, each overriding the previous source.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod input;
mod output;

pub use error::{CliError, Result};

use config::{build_config, CliArgs};

/// Posterior-predictive simulation CLI
#[derive(Parser)]
#[command(name = "postsim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Number of posterior draws
    #[arg(short = 'n', long, global = true)]
    draws: Option<usize>,

    /// Worker threads (default: all cores)
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    /// Draws submitted per chunk
    #[arg(long, global = true)]
    chunk_size: Option<usize>,

    /// Seed of draw 0; draw i uses seed + i
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Failure policy (fail-fast, best-effort)
    #[arg(long, global = true)]
    policy: Option<String>,

    /// Soft per-draw timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate the observed data forward under posterior draws
    Simulate {
        /// Posterior file (JSON)
        #[arg(short, long)]
        posterior: String,

        /// Observed data (CSV with one column per observable)
        #[arg(short, long)]
        data: String,

        /// Innovation mask (CSV, empty cells keep the filtered residual)
        #[arg(short, long)]
        mask: Option<String>,

        /// Output file (JSON, default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Impulse responses under posterior draws
    Irfs {
        /// Posterior file (JSON)
        #[arg(short, long)]
        posterior: String,

        /// Shock as name[:size[:period]]; repeat to apply shocks jointly
        #[arg(short, long = "shock", required = true)]
        shocks: Vec<String>,

        /// Variables to report (default: all)
        #[arg(long = "select")]
        select: Vec<String>,

        /// Impulse horizon in periods
        #[arg(long)]
        horizon: Option<usize>,

        /// Output file (JSON, default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Validate a posterior file and print its mean and median
    Check {
        /// Posterior file (JSON)
        #[arg(short, long)]
        posterior: String,
    },
}

impl Cli {
    fn config_args(&self) -> CliArgs {
        let horizon = match &self.command {
            Commands::Irfs { horizon, .. } => *horizon,
            _ => None,
        };
        CliArgs {
            config_file: self.config.clone(),
            log_level: self.log_level.clone(),
            n_draws: self.draws,
            workers: self.workers,
            chunk_size: self.chunk_size,
            seed: self.seed,
            failure_policy: self.policy.clone(),
            task_timeout_secs: self.timeout_secs,
            horizon,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli.config_args()).context("failed to load configuration")?;

    // Initialise tracing; RUST_LOG takes precedence over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter_str()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    info!("Postsim v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Simulate {
            posterior,
            data,
            mask,
            output,
        } => commands::simulate::run(
            &posterior,
            &data,
            mask.as_deref(),
            output.as_deref(),
            &config,
        )
        .context("simulate failed"),
        Commands::Irfs {
            posterior,
            shocks,
            select,
            output,
            ..
        } => commands::irfs::run(&posterior, &shocks, &select, output.as_deref(), &config)
            .context("irfs failed"),
        Commands::Check { posterior } => {
            commands::check::run(&posterior).context("check failed")
        }
    }
}
