//! Inspect governor decisions from the command line.
//!
//! # Examples
//!
//! ```sh
//! # Tier, degradation and compliance for a usage ratio
//! ctxgov classify 0.62
//!
//! # Chunk a batch of estimated operations for a code-generation session
//! ctxgov plan --profile code-generation --capacity 100000 --usage 20000 12000 9000 30000
//!
//! # Replay cumulative totals through one session
//! ctxgov simulate --capacity 100000 20000 40000 60000 80000
//!
//! # Print the configuration schema
//! ctxgov schema
//! ```
//!
//! Set `RUST_LOG=debug` for per-report logging.

use clap::{Parser, Subcommand};
use ctx_governor::config::GovernorConfig;
use ctx_governor::context::PressureClassifier;
use ctx_governor::governor::{LoggingHandler, MemorySink, Session};
use ctx_governor::{GovernorError, Profile};
use serde::Serialize;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Inspect context-pressure governor decisions.
#[derive(Parser)]
#[command(name = "ctxgov")]
struct Cli {
    /// JSON configuration file (defaults apply to omitted keys)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a usage ratio
    Classify {
        /// Usage as a fraction of capacity (may exceed 1.0)
        ratio: f64,
    },
    /// Plan an ordered batch of estimated operations
    Plan {
        /// Task profile (code-generation, code-review, data-analysis, documentation, conversation)
        #[arg(long)]
        profile: String,
        /// Session capacity in units
        #[arg(long)]
        capacity: u64,
        /// Units already consumed
        #[arg(long, default_value_t = 0)]
        usage: u64,
        /// Estimated units per operation, in execution order
        operations: Vec<u64>,
    },
    /// Replay absolute cumulative totals through one session
    Simulate {
        /// Session capacity in units
        #[arg(long)]
        capacity: u64,
        /// Task profile
        #[arg(long, default_value = "conversation")]
        profile: String,
        /// Acknowledge each emitted checkpoint immediately
        #[arg(long)]
        auto_ack: bool,
        /// Cumulative totals, in report order
        totals: Vec<u64>,
    },
    /// Print the configuration JSON Schema
    Schema,
}

#[derive(Serialize)]
struct Classification {
    ratio: f64,
    tier: ctx_governor::context::PressureTier,
    degradation: f64,
    compliant: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), GovernorError> {
    let config = match &cli.config {
        Some(path) => GovernorConfig::load(path)?,
        None => GovernorConfig::default(),
    };
    let config = Arc::new(config);

    match cli.command {
        Command::Classify { ratio } => {
            let classifier = PressureClassifier::from_config(&config);
            print_json(&Classification {
                ratio,
                tier: classifier.classify(ratio),
                degradation: classifier.degradation_score(ratio),
                compliant: classifier.compliant(ratio),
            })
        }
        Command::Plan {
            profile,
            capacity,
            usage,
            operations,
        } => {
            let profile: Profile = profile.parse()?;
            let mut session = Session::new("cli", capacity, profile, config)?;
            if usage > 0 {
                session.report(usage)?;
            }
            print_json(&session.plan(&operations))
        }
        Command::Simulate {
            capacity,
            profile,
            auto_ack,
            totals,
        } => {
            let profile: Profile = profile.parse()?;
            let mut session = Session::new("sim", capacity, profile, config)?
                .with_sink(Arc::new(MemorySink::new()))
                .with_event_handler(Arc::new(LoggingHandler));
            for total in totals {
                let status = session.report(total)?;
                print_json(&status)?;
                if auto_ack && status.checkpoint_pending {
                    session.acknowledge(status.epoch)?;
                }
            }
            Ok(())
        }
        Command::Schema => print_json(&GovernorConfig::json_schema()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), GovernorError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
