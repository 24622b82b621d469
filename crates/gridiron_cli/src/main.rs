//! Headless match driver CLI (spec §6). Thin over `gridiron_core::driver` —
//! all match logic lives in the library; this binary only parses flags and
//! prints the final summary, mirroring the teacher's `cache_builder` split
//! between a library crate and a clap-derive binary.

use anyhow::Result;
use clap::Parser;
use gridiron_core::coach::{Coach, RandomCoach};
use gridiron_core::driver::{run_matches, MatchConfig};

#[derive(Parser)]
#[command(name = "gridiron-sim")]
#[command(about = "Run headless Blood Bowl-style matches between Coach implementations", long_about = None)]
struct Cli {
    /// AI driving the home team. Only "random" is built in; anything else
    /// falls back to it with a warning, since the learned-weights policy
    /// named in `weights` is an external collaborator this crate doesn't own.
    #[arg(long, default_value = "random")]
    home_ai: String,

    /// AI driving the away team.
    #[arg(long, default_value = "random")]
    away_ai: String,

    /// Number of independent matches to simulate.
    #[arg(long, default_value_t = 1)]
    matches: u32,

    /// Path to a learned-weights file for the AI. Accepted for CLI-surface
    /// parity with the spec; `RandomCoach` does not read it.
    #[arg(long)]
    weights: Option<String>,

    /// Epsilon-greedy bias toward ending a turn early, in [0, 1].
    #[arg(long, default_value_t = 0.05)]
    epsilon: f64,

    /// Tracing filter, e.g. "info" or "gridiron_core=debug".
    #[arg(long, default_value = "info")]
    log: String,

    /// Home team's race label.
    #[arg(long, default_value = "humans")]
    home_race: String,

    /// Away team's race label.
    #[arg(long, default_value = "orcs")]
    away_race: String,

    /// Base team value, reserved for roster generation tiers. Accepted for
    /// CLI-surface parity; the in-crate roster builder is TV-agnostic.
    #[arg(long, default_value_t = 1_000_000)]
    tv: u32,

    /// Base RNG seed; match `i` uses `seed + i`.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&cli.log))
        .init();

    if cli.home_ai != "random" {
        tracing::warn!(ai = %cli.home_ai, "unknown home-ai, falling back to random");
    }
    if cli.away_ai != "random" {
        tracing::warn!(ai = %cli.away_ai, "unknown away-ai, falling back to random");
    }
    if cli.weights.is_some() {
        tracing::info!("weights flag accepted but RandomCoach does not consume it");
    }

    let epsilon = cli.epsilon;
    let home_seed = cli.seed;
    let away_seed = cli.seed.wrapping_add(1);

    let home_factory = move || -> Box<dyn Coach> { Box::new(RandomCoach::new(home_seed, epsilon)) };
    let away_factory = move || -> Box<dyn Coach> { Box::new(RandomCoach::new(away_seed, epsilon)) };

    let config = MatchConfig { seed: cli.seed, home_race: cli.home_race, away_race: cli.away_race };
    let summary = run_matches(home_factory, away_factory, config, cli.matches);

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
