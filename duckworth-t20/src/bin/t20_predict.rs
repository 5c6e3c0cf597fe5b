use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use duckworth::random::{entropy_seed, seeded};
use duckworth_t20::config::Config;
use duckworth_t20::data::League;
use duckworth_t20::domain::{PlayerId, TeamId, VenueId};
use duckworth_t20::engine::{Engine, MatchRequest};
use duckworth_t20::model::LogisticModel;
use duckworth_t20::print;
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

    /// home team ID
    #[clap(long)]
    home: u32,

    /// away team ID
    #[clap(long)]
    away: u32,

    /// venue ID
    #[clap(long)]
    venue: u32,

    /// home XI in batting order, as comma-separated player IDs
    #[clap(long, value_delimiter = ',')]
    home_xi: Vec<u32>,

    /// away XI in batting order, as comma-separated player IDs
    #[clap(long, value_delimiter = ',')]
    away_xi: Vec<u32>,

    /// first-innings average to assume in place of the venue's
    #[clap(long)]
    venue_avg: Option<f64>,

    /// seed for the sampled scorecard
    #[clap(short = 's', long)]
    seed: Option<u64>,

    /// print the prediction as JSON
    #[clap(long)]
    json: bool,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.home == self.away {
            bail!("home and away teams must differ");
        }
        if let Some(venue_avg) = self.venue_avg {
            if !venue_avg.is_finite() || venue_avg <= 0. {
                bail!("venue average must be a positive number");
            }
        }
        Ok(())
    }
}

fn lineup(ids: &[u32]) -> Option<Vec<PlayerId>> {
    if ids.is_empty() {
        None
    } else {
        Some(ids.iter().copied().map(PlayerId).collect())
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

    let config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {path:?}"))?,
        None => Config::default(),
    };
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
    debug!(
        "model:\n{}",
        Console::default().render(&model.predictor().tabulate())
    );
    let engine = Engine::builder(config, sources)
        .with_model(&model)
        .build()?;

    let request = MatchRequest::new(TeamId(args.home), TeamId(args.away), VenueId(args.venue))
        .with_lineups(lineup(&args.home_xi), lineup(&args.away_xi))
        .with_venue_avg_override(args.venue_avg);
    let seed = args.seed.unwrap_or_else(entropy_seed);
    debug!("seed: {seed}");
    let prediction = engine.predict_match(&request, &mut seeded(seed))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
        return Ok(());
    }
    info!(
        "{} v {} at {}:\n{}",
        prediction.home_team_name,
        prediction.away_team_name,
        prediction.venue_name,
        Console::default().render(&print::tabulate_prediction(&prediction))
    );
    for (team_name, xi) in [
        (&prediction.home_team_name, &prediction.home_xi),
        (&prediction.away_team_name, &prediction.away_xi),
    ] {
        info!("{team_name} XI:\n{}", Console::default().render(&print::tabulate_xi(xi)));
    }
    for factor in &prediction.top_factors {
        info!("factor {}: {:.3}", factor.feature, factor.importance);
    }
    info!("{}", prediction.summary);
    if let Some(motm) = &prediction.man_of_the_match {
        info!("man of the match: {}", motm.name);
    }
    Ok(())
}
