//! Pick an option from a JSON catalog file.
//!
//! ```text
//! decide --catalog options.json --hours 0 --minutes 30 --tag indoor --seed 7
//! ```
//!
//! The catalog file holds the same rows the browser keeps before sign-in:
//! `[{"text": "Reading", "weight": 2, "duration": 30, "tags": ["indoor"]}]`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{fmt, EnvFilter};

use make_a_decision::{
    DecisionConfig, DecisionService, Identity, LocalOption, RandomSource, SelectionOutcome,
    SelectionRequest,
};

#[derive(Parser)]
#[command(name = "decide", version, about = "Weighted random pick from a catalog of options")]
struct Args {
    /// JSON file with an array of options.
    #[arg(long)]
    catalog: PathBuf,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Hours available.
    #[arg(long, default_value_t = 0)]
    hours: i64,

    /// Minutes available, added to `--hours`.
    #[arg(long, default_value_t = 0)]
    minutes: i64,

    /// Only consider options with this tag (repeatable; any tag matches).
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Seed for a reproducible pick.
    #[arg(long)]
    seed: Option<u64>,

    /// Wait the configured pick delay before printing.
    #[arg(long)]
    pace: bool,

    /// Print the outcome as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DecisionConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DecisionConfig::default(),
    };

    let raw = std::fs::read_to_string(&args.catalog)
        .with_context(|| format!("reading catalog {}", args.catalog.display()))?;
    let rows: Vec<LocalOption> =
        serde_json::from_str(&raw).context("catalog must be a JSON array of options")?;

    let service = DecisionService::in_memory(config)?;
    let user = service.accounts().register("local@localhost.invalid", "")?;
    let me = Identity::User(user.id);

    let report = service.catalog().sync_local_options(&me, rows)?;
    tracing::info!(loaded = report.synced, skipped = report.skipped, "catalog loaded");

    let request = SelectionRequest::builder()
        .time_budget(args.hours, args.minutes)
        .tags(&args.tags)
        .build();

    let mut rng: Box<dyn RandomSource> = match args.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::rng()),
    };
    let outcome = service.pick(&me, &request, Utc::now(), rng.as_mut())?;

    if args.pace {
        std::thread::sleep(service.config().pick_delay());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.summary());
    }

    if matches!(outcome, SelectionOutcome::Picked { .. }) {
        Ok(())
    } else {
        std::process::exit(2);
    }
}
