//! Monte Carlo simulation of a season: every fixture sampled in order, then the league table and
//! the playoff, repeated many times across a worker pool.
//!
//! All lookups are resolved up front into a [`SeasonTables`], which the workers then share
//! read-only. Each simulation draws from its own stream, derived from the master seed and the
//! simulation's index, so results do not depend on how the simulations are split among workers.

use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroUsize;
use std::ops::Range;

use rayon::prelude::*;
use tinyrand::Rand;
use tracing::{debug, info};

use duckworth::hash_lookup::HashLookup;
use duckworth::random::{gaussian, seeded, sub_seed};
use duckworth::timed::Timed;

use crate::cancel::CancellationToken;
use crate::domain::{
    Fixture, MatchOutcome, PitchType, PlayerId, Projection, Role, Side, TeamId, TossRecord,
};
use crate::error::{ConfigError, SimulationError};
use crate::features::FeatureVectorBuilder;
use crate::lineup::XI;
use crate::model::WinProbabilityModel;
use crate::playoffs::{resolve_playoffs, PlayoffBracket, QUALIFIERS};
use crate::projection::resolve_projection;
use crate::sampler::{MatchContext, MatchOutcomeSampler, SideContext};
use crate::standings::{StandingsCalculator, StandingsRow};
use crate::store::{lookup_team_row, Sources};

pub mod accumulator;

pub use accumulator::SimulationAccumulator;

/// Stream reserved for the pre-pass, clear of any simulation index.
const PREPASS_STREAM: u64 = u64::MAX;

#[derive(Debug, Clone, Default)]
pub struct SeasonRequest {
    pub fixtures: Vec<Fixture>,
    pub num_simulations: usize,
    /// Starting XIs to use in place of the first eleven of a team's squad.
    pub custom_xis: BTreeMap<TeamId, Vec<PlayerId>>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEntry {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    pub team_id: TeamId,
    pub projection: Projection,
}

#[derive(Debug, Clone)]
struct FixtureEntry {
    home: usize,
    away: usize,
    features: FeatureVectorBuilder,
    venue_avg: f64,
    pitch_type: PitchType,
    toss_record: Option<TossRecord>,
}

/// Everything a season run reads, resolved once.
#[derive(Debug, Clone)]
pub struct SeasonTables {
    team_ids: HashLookup<TeamId>,
    team_avg_runs: Vec<f64>,
    lineups: Vec<Vec<usize>>,
    players: Vec<PlayerEntry>,
    fixtures: Vec<FixtureEntry>,
}
impl SeasonTables {
    /// Resolves the teams, lineups, player projections, venues and head-to-head records needed to
    /// simulate `fixtures`. Teams are every team in the roster together with any team named in a
    /// fixture, in ascending id order. Missing data degrades to cold-start defaults.
    pub fn resolve(
        sources: &Sources,
        competition: &str,
        default_venue_avg: f64,
        fixtures: &[Fixture],
        custom_xis: &BTreeMap<TeamId, Vec<PlayerId>>,
        rand: &mut impl Rand,
    ) -> Self {
        let mut ids = sources
            .roster
            .teams()
            .into_iter()
            .map(|team| team.id)
            .collect::<BTreeSet<_>>();
        for fixture in fixtures {
            ids.insert(fixture.home_team_id);
            ids.insert(fixture.away_team_id);
        }
        let team_ids = ids.into_iter().collect::<Vec<_>>();

        let mut player_ids = HashLookup::<PlayerId>::with_capacity(team_ids.len() * XI);
        let mut players = vec![];
        let mut team_rows = Vec::with_capacity(team_ids.len());
        let mut lineup_overrides = Vec::with_capacity(team_ids.len());
        let mut lineups = Vec::with_capacity(team_ids.len());
        let mut cold_starts = 0;
        for &team_id in &team_ids {
            let team = sources.roster.team(team_id);
            let row = team.and_then(|team| lookup_team_row(sources.team_features, competition, team));
            if row.is_none() {
                cold_starts += 1;
                debug!("no feature row for team {team_id}");
            }
            team_rows.push(row);

            let custom_xi = custom_xis.get(&team_id);
            let selected = match custom_xi {
                Some(xi) => xi.as_slice(),
                None => team.map(|team| team.squad.as_slice()).unwrap_or_default(),
            };
            let mut lineup = Vec::with_capacity(XI);
            for &player_id in selected {
                if lineup.len() == XI {
                    break;
                }
                let Some(player) = sources.roster.player(player_id) else {
                    debug!("ignoring unknown player {player_id} in the XI of {team_id}");
                    continue;
                };
                let index = player_ids.index_or_push(player_id);
                if index == players.len() {
                    players.push(PlayerEntry {
                        id: player_id,
                        name: player.name.clone(),
                        role: player.role,
                        team_id,
                        projection: resolve_projection(sources.projections, player, rand),
                    });
                }
                lineup.push(index);
            }
            lineup_overrides.push(custom_xi.map(|_| lineup.len()));
            lineups.push(lineup);
        }

        let team_ids = team_ids.into_iter().collect::<HashLookup<_>>();
        let fixtures = fixtures
            .iter()
            .map(|fixture| {
                let home = team_ids.index_of(&fixture.home_team_id).unwrap_or_default();
                let away = team_ids.index_of(&fixture.away_team_id).unwrap_or_default();
                let venue = sources.venues.lookup(fixture.venue_id);
                if venue.is_none() {
                    debug!("no stats for venue {} of {}", fixture.venue_id, fixture.match_id);
                }
                let venue_avg = venue
                    .map(|venue| venue.avg_first_innings_score)
                    .filter(|&avg| avg.is_finite() && avg > 0.)
                    .unwrap_or(default_venue_avg);
                let features = FeatureVectorBuilder::default()
                    .with_home(team_rows[home].as_ref())
                    .with_away(team_rows[away].as_ref())
                    .with_venue_avg_score(venue_avg)
                    .with_head_to_head(
                        sources
                            .head_to_head
                            .record(fixture.home_team_id, fixture.away_team_id),
                    )
                    .with_lineup_overrides(lineup_overrides[home], lineup_overrides[away]);
                FixtureEntry {
                    home,
                    away,
                    features,
                    venue_avg,
                    pitch_type: venue.map(|venue| venue.pitch_type).unwrap_or_default(),
                    toss_record: venue.and_then(|venue| venue.toss_record),
                }
            })
            .collect::<Vec<_>>();

        debug!(
            "resolved {} teams ({cold_starts} cold), {} players, {} fixtures",
            team_ids.len(),
            players.len(),
            fixtures.len()
        );
        Self {
            team_avg_runs: team_rows
                .iter()
                .map(|row| row.as_ref().map_or(0., |row| row.avg_runs_for))
                .collect(),
            team_ids,
            lineups,
            players,
            fixtures,
        }
    }

    pub fn team_ids(&self) -> &[TeamId] {
        self.team_ids.items()
    }

    /// Every player named in a lineup, indexed as in the accumulator's per-player samples.
    pub fn players(&self) -> &[PlayerEntry] {
        &self.players
    }

    pub fn num_fixtures(&self) -> usize {
        self.fixtures.len()
    }
}

/// The complete result of one simulated season.
#[derive(Debug, Clone)]
pub struct SimulatedSeason {
    pub outcomes: Vec<MatchOutcome>,
    /// Ranked rows, each with the team's index in [`SeasonTables::team_ids`].
    pub standings: Vec<(usize, StandingsRow)>,
    pub bracket: PlayoffBracket,
    /// Season totals, indexed as [`SeasonTables::players`].
    pub player_runs: Vec<f64>,
    pub player_wickets: Vec<f64>,
}
impl SimulatedSeason {
    pub fn champion_index(&self, tables: &SeasonTables) -> Option<usize> {
        self.bracket
            .champion
            .and_then(|champion| tables.team_ids.index_of(&champion))
    }
}

pub struct SeasonSimulator<'a> {
    model: &'a dyn WinProbabilityModel,
    sampler: MatchOutcomeSampler,
    workers: usize,
}
impl<'a> SeasonSimulator<'a> {
    pub fn new(model: &'a dyn WinProbabilityModel) -> Self {
        Self {
            model,
            sampler: MatchOutcomeSampler::default(),
            workers: default_workers(),
        }
    }

    pub fn with_sampler(mut self, sampler: MatchOutcomeSampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Runs `num_simulations` seasons, splitting them into contiguous ranges, one per worker.
    pub fn run(
        &self,
        tables: &SeasonTables,
        num_simulations: usize,
        seed: u64,
        cancel: &CancellationToken,
    ) -> Result<SimulationAccumulator, SimulationError> {
        if num_simulations == 0 {
            return Err(ConfigError::NoSimulations.into());
        }
        let workers = self.workers.min(num_simulations);
        let chunk = num_simulations.div_ceil(workers);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
        info!(
            "simulating {num_simulations} seasons of {} fixtures on {workers} workers",
            tables.num_fixtures()
        );
        let timed = Timed::result(|| {
            let partials = pool.install(|| {
                (0..workers)
                    .into_par_iter()
                    .map(|worker| {
                        let start = (worker * chunk).min(num_simulations);
                        let end = (start + chunk).min(num_simulations);
                        self.run_range(tables, start..end, seed, cancel)
                    })
                    .collect::<Result<Vec<_>, _>>()
            })?;
            let mut merged =
                SimulationAccumulator::new(tables.team_ids().len(), tables.players().len());
            for partial in partials {
                merged.merge(partial);
            }
            Ok::<_, SimulationError>(merged)
        })?;
        info!(
            "simulated {num_simulations} seasons in {:.3}s ({:.0} seasons/s)",
            timed.elapsed.as_secs_f64(),
            timed.rate(num_simulations)
        );
        Ok(timed.value)
    }

    fn run_range(
        &self,
        tables: &SeasonTables,
        range: Range<usize>,
        seed: u64,
        cancel: &CancellationToken,
    ) -> Result<SimulationAccumulator, SimulationError> {
        let mut accumulator =
            SimulationAccumulator::new(tables.team_ids().len(), tables.players().len());
        for sim_index in range {
            if cancel.is_cancelled() {
                return Err(SimulationError::Cancelled);
            }
            let season = self.simulate_one(tables, sim_index, seed);
            accumulator.record(&season, season.champion_index(tables));
        }
        Ok(accumulator)
    }

    /// Plays out one season from the stream of simulation `sim_index`.
    pub fn simulate_one(&self, tables: &SeasonTables, sim_index: usize, seed: u64) -> SimulatedSeason {
        let mut rand = seeded(sub_seed(seed, sim_index as u64));
        let num_players = tables.players.len();
        let mut player_runs = vec![0.; num_players];
        let mut player_wickets = vec![0.; num_players];
        let mut standings = StandingsCalculator::new(tables.team_ids().len());
        let mut outcomes = Vec::with_capacity(tables.fixtures.len());
        let (mut home_lineup, mut away_lineup) = (Vec::with_capacity(XI), Vec::with_capacity(XI));

        for fixture in &tables.fixtures {
            let prediction = self.model.predict(&fixture.features.build());
            for (team, lineup) in [(fixture.home, &mut home_lineup), (fixture.away, &mut away_lineup)] {
                lineup.clear();
                for &player in &tables.lineups[team] {
                    let projection = &tables.players[player].projection;
                    let (runs, wickets) = sample_performance(projection, &mut rand);
                    player_runs[player] += runs;
                    player_wickets[player] += wickets;
                    lineup.push(runs);
                }
            }
            let context = MatchContext {
                home: SideContext {
                    team_id: tables.team_ids()[fixture.home],
                    avg_runs_for: tables.team_avg_runs[fixture.home],
                    lineup: Some(&home_lineup),
                },
                away: SideContext {
                    team_id: tables.team_ids()[fixture.away],
                    avg_runs_for: tables.team_avg_runs[fixture.away],
                    lineup: Some(&away_lineup),
                },
                venue_avg: fixture.venue_avg,
                pitch_type: fixture.pitch_type,
                toss_record: fixture.toss_record,
            };
            let outcome = self
                .sampler
                .sample(&context, prediction.home_win_probability, &mut rand);
            let winner = match outcome.winner {
                Side::Home => fixture.home,
                Side::Away => fixture.away,
            };
            standings.record(fixture.home, fixture.away, winner);
            outcomes.push(outcome);
        }

        debug_assert_eq!(outcomes.len(), standings.total_wins() as usize);
        let standings = standings.ranked(tables.team_ids());
        let seeds = standings
            .iter()
            .take(QUALIFIERS)
            .map(|(_, row)| row.team_id)
            .collect::<Vec<_>>();
        let bracket = resolve_playoffs(&seeds, &mut rand);
        SimulatedSeason {
            outcomes,
            standings,
            bracket,
            player_runs,
            player_wickets,
        }
    }
}

/// One match's runs and wickets for a player, scattered about their projection.
fn sample_performance(projection: &Projection, rand: &mut impl Rand) -> (f64, f64) {
    let runs_mean = projection.predicted_runs.max(0.);
    let wickets_mean = projection.predicted_wickets.max(0.);
    let runs = gaussian(rand, runs_mean, runs_mean * 0.3).max(0.);
    let wickets = gaussian(rand, wickets_mean, f64::max(0.5, wickets_mean * 0.4)).max(0.);
    (runs, wickets)
}

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Resolves the tables for `request` from the pre-pass stream of `seed`.
pub fn resolve_tables(
    sources: &Sources,
    competition: &str,
    default_venue_avg: f64,
    request: &SeasonRequest,
    seed: u64,
) -> SeasonTables {
    let mut rand = seeded(sub_seed(seed, PREPASS_STREAM));
    SeasonTables::resolve(
        sources,
        competition,
        default_venue_avg,
        &request.fixtures,
        &request.custom_xis,
        &mut rand,
    )
}

#[cfg(test)]
mod tests;
