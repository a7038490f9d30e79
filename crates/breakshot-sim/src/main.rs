mod scenario;

use std::path::PathBuf;
use std::process::ExitCode;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use breakshot_core::{Ball, BallId, PhysicsConfig};
use breakshot_engine::{EngineError, Simulation};

use scenario::{Scenario, ScenarioError};

const DEFAULT_MAX_TICKS: u64 = 5000;

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error("simulation failed: {0}")]
    Engine(#[from] EngineError),
    #[error("failed to encode summary: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    ticks: Option<u64>,
    scenario: Option<PathBuf>,
    seed: Option<u64>,
}

impl Args {
    /// Parse `--key=value` flags. Unknown or malformed flags are ignored with
    /// a warning.
    fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut parsed = Self::default();
        for arg in args {
            if let Some(v) = arg.strip_prefix("--ticks=") {
                parsed.ticks = v.parse().ok();
            } else if let Some(v) = arg.strip_prefix("--scenario=") {
                parsed.scenario = Some(PathBuf::from(v));
            } else if let Some(v) = arg.strip_prefix("--seed=") {
                parsed.seed = v.parse().ok();
            } else {
                tracing::warn!(arg = %arg, "Ignoring unrecognised argument");
            }
        }
        parsed
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    table: String,
    seed: u64,
    ticks: usize,
    events: usize,
    settled: bool,
    pocketed: Vec<BallId>,
    balls: Vec<Ball>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse(std::env::args().skip(1));
    match run(&args) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        },
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            ExitCode::FAILURE
        },
    }
}

fn run(args: &Args) -> Result<String, RunError> {
    let config = PhysicsConfig::load();
    let scenario = match &args.scenario {
        Some(path) => Scenario::from_file(path)?,
        None => Scenario::default(),
    };
    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    let (table, balls, shot) = scenario.resolve(&config, &mut rng);

    tracing::info!(
        table = %table.name,
        balls = balls.len(),
        seed,
        "Starting simulation"
    );
    let mut sim = Simulation::new(table, balls, config)?;
    sim.strike(shot.ball, shot.angle, shot.power)?;

    let reports = sim.run_until_settled(args.ticks.unwrap_or(DEFAULT_MAX_TICKS))?;
    let summary = Summary {
        table: sim.table().name.clone(),
        seed,
        ticks: reports.len(),
        events: reports.iter().map(|r| r.events_resolved).sum(),
        settled: sim.is_settled(),
        pocketed: reports.iter().flat_map(|r| r.pocketed.iter().copied()).collect(),
        balls: sim.balls().to_vec(),
    };
    tracing::info!(
        ticks = summary.ticks,
        events = summary.events,
        settled = summary.settled,
        "Simulation finished"
    );
    Ok(serde_json::to_string_pretty(&summary)?)
}
