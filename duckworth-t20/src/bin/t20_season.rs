use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use duckworth::file::write_json;
use duckworth_t20::cancel::CancellationToken;
use duckworth_t20::config::Config;
use duckworth_t20::data::League;
use duckworth_t20::engine::Engine;
use duckworth_t20::model::LogisticModel;
use duckworth_t20::print;
use duckworth_t20::season::SeasonRequest;
use duckworth_t20::store::{SnapshotTeamFeatureStore, Sources};

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// league data (teams, players, venues, fixtures, results)
    #[clap(short = 'l', long, default_value = "data/league.json")]
    league: PathBuf,

    /// trained model artifact
    #[clap(short = 'm', long, default_value = "data/model.json")]
    model: PathBuf,

    /// team feature snapshot (CSV)
    #[clap(short = 'f', long)]
    features: Option<PathBuf>,

    /// engine configuration (JSON)
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// number of seasons to simulate
    #[clap(short = 'n', long)]
    simulations: Option<usize>,

    /// master seed
    #[clap(short = 's', long)]
    seed: Option<u64>,

    /// size of the worker pool
    #[clap(short = 'w', long)]
    workers: Option<usize>,

    /// print the forecast as JSON
    #[clap(long)]
    json: bool,

    /// also write the forecast as JSON to this file
    #[clap(short = 'o', long)]
    output: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.simulations == Some(0) {
            bail!("at least one simulation is required");
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let mut config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {path:?}"))?,
        None => Config::default(),
    };
    if let Some(workers) = args.workers {
        config.workers = Some(workers);
    }
    let num_simulations = args.simulations.unwrap_or(config.num_simulations);

    let league = League::load(&args.league).with_context(|| format!("loading {:?}", args.league))?;
    let model = LogisticModel::load(&args.model).with_context(|| format!("loading {:?}", args.model))?;
    let snapshot = match &args.features {
        Some(path) => Some(SnapshotTeamFeatureStore::open(path).with_context(|| format!("loading {path:?}"))?),
        None => None,
    };
    let mut sources = Sources::from_league(&league);
    if let Some(snapshot) = &snapshot {
        sources = sources.with_team_features(snapshot);
    }

    let engine = Engine::builder(config, sources).with_model(&model).build()?;
    let request = SeasonRequest {
        fixtures: league.fixtures().to_vec(),
        num_simulations,
        seed: args.seed,
        ..SeasonRequest::default()
    };
    info!(
        "simulating {} fixtures × {num_simulations} seasons",
        request.fixtures.len()
    );
    let forecast = engine.simulate_season(&request, &CancellationToken::default())?;
    if let Some(path) = &args.output {
        write_json(path, &forecast).with_context(|| format!("writing {path:?}"))?;
        info!("forecast written to {path:?}");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
        return Ok(());
    }
    info!(
        "predicted standings:\n{}",
        Console::default().render(&print::tabulate_standings(&forecast))
    );
    info!(
        "awards:\n{}",
        Console::default().render(&print::tabulate_awards(&forecast.awards))
    );
    match &forecast.champion {
        Some(champion) => info!(
            "projected champion: {} ({:.1}%)",
            champion.team_name, champion.probability
        ),
        None => info!("no projected champion"),
    }
    Ok(())
}
