//! The entry point: single-match predictions and season forecasts over a configured model and
//! set of data sources.

use serde::Serialize;
use tinyrand::Rand;
use tracing::{debug, info};

use duckworth::random::entropy_seed;

use crate::aggregate::{ResultAggregator, SeasonForecast};
use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::domain::{MatchOutcome, PlayerId, Team, TeamId, VenueId};
use crate::error::{ConfigError, PredictError, SimulationError};
use crate::features::FeatureVectorBuilder;
use crate::lineup::{man_of_the_match, select_balanced_xi, sort_batting_order, Selection, XI};
use crate::model::{validate_schema, TopFactor, WinProbabilityModel};
use crate::projection::resolve_projection;
use crate::sampler::{MatchContext, MatchOutcomeSampler, SideContext};
use crate::season::{resolve_tables, SeasonRequest, SeasonSimulator};
use crate::store::{lookup_team_row, Sources};

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRequest {
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub venue_id: VenueId,
    /// Starting XIs in batting order. A balanced XI is picked from the squad where absent.
    pub home_lineup: Option<Vec<PlayerId>>,
    pub away_lineup: Option<Vec<PlayerId>>,
    pub venue_avg_override: Option<f64>,
}
impl MatchRequest {
    pub fn new(home_team_id: TeamId, away_team_id: TeamId, venue_id: VenueId) -> Self {
        Self {
            home_team_id,
            away_team_id,
            venue_id,
            home_lineup: None,
            away_lineup: None,
            venue_avg_override: None,
        }
    }

    pub fn with_lineups(mut self, home: Option<Vec<PlayerId>>, away: Option<Vec<PlayerId>>) -> Self {
        self.home_lineup = home;
        self.away_lineup = away;
        self
    }

    pub fn with_venue_avg_override(mut self, venue_avg: Option<f64>) -> Self {
        self.venue_avg_override = venue_avg;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchPrediction {
    pub home_team_name: String,
    pub away_team_name: String,
    pub venue_name: String,
    pub home_win_probability: f64,
    pub away_win_probability: f64,
    pub confidence: f64,
    pub top_factors: Vec<TopFactor>,
    pub outcome: MatchOutcome,
    pub summary: String,
    pub home_xi: Vec<Selection>,
    pub away_xi: Vec<Selection>,
    pub man_of_the_match: Option<Selection>,
}

pub struct Engine<'a> {
    config: Config,
    model: &'a dyn WinProbabilityModel,
    sources: Sources<'a>,
    sampler: MatchOutcomeSampler,
}
impl<'a> Engine<'a> {
    pub fn builder(config: Config, sources: Sources<'a>) -> EngineBuilder<'a> {
        EngineBuilder {
            config,
            sources,
            model: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn predict_match(
        &self,
        request: &MatchRequest,
        rand: &mut impl Rand,
    ) -> Result<MatchPrediction, PredictError> {
        if request.home_team_id == request.away_team_id {
            return Err(PredictError::SameTeam(request.home_team_id));
        }
        let roster = self.sources.roster;
        let home = roster
            .team(request.home_team_id)
            .ok_or(PredictError::UnknownTeam(request.home_team_id))?;
        let away = roster
            .team(request.away_team_id)
            .ok_or(PredictError::UnknownTeam(request.away_team_id))?;
        let venue = self
            .sources
            .venues
            .lookup(request.venue_id)
            .ok_or(PredictError::UnknownVenue(request.venue_id))?;

        let competition = &self.config.competition;
        let home_row = lookup_team_row(self.sources.team_features, competition, home);
        let away_row = lookup_team_row(self.sources.team_features, competition, away);
        let venue_avg = [request.venue_avg_override, Some(venue.avg_first_innings_score)]
            .into_iter()
            .flatten()
            .find(|&avg| avg.is_finite() && avg > 0.)
            .unwrap_or(self.config.default_venue_avg);

        let home_xi = self.starting_xi(home, request.home_lineup.as_deref(), rand);
        let away_xi = self.starting_xi(away, request.away_lineup.as_deref(), rand);
        let features = FeatureVectorBuilder::default()
            .with_home(home_row.as_ref())
            .with_away(away_row.as_ref())
            .with_venue_avg_score(venue_avg)
            .with_head_to_head(self.sources.head_to_head.record(home.id, away.id))
            .with_lineup_overrides(
                request.home_lineup.as_ref().map(|_| home_xi.len()),
                request.away_lineup.as_ref().map(|_| away_xi.len()),
            )
            .build();
        let prediction = self.model.predict(&features);
        debug!(
            "{} v {}: home win probability {:.3}",
            home.name, away.name, prediction.home_win_probability
        );

        let home_runs = predicted_runs(&home_xi);
        let away_runs = predicted_runs(&away_xi);
        let context = MatchContext {
            home: SideContext {
                team_id: home.id,
                avg_runs_for: home_row.map_or(0., |row| row.avg_runs_for),
                lineup: Some(&home_runs),
            },
            away: SideContext {
                team_id: away.id,
                avg_runs_for: away_row.map_or(0., |row| row.avg_runs_for),
                lineup: Some(&away_runs),
            },
            venue_avg,
            pitch_type: venue.pitch_type,
            toss_record: venue.toss_record,
        };
        let outcome = self
            .sampler
            .sample(&context, prediction.home_win_probability, rand);
        let winner_name = if outcome.winner_team_id == home.id {
            &home.name
        } else {
            &away.name
        };
        let summary = outcome.describe(winner_name);
        let man_of_the_match = man_of_the_match(home_xi.iter().chain(&away_xi)).cloned();

        Ok(MatchPrediction {
            home_team_name: home.name.clone(),
            away_team_name: away.name.clone(),
            venue_name: venue.name.clone(),
            home_win_probability: prediction.home_win_probability,
            away_win_probability: prediction.away_win_probability,
            confidence: prediction.confidence,
            top_factors: prediction.top_factors,
            outcome,
            summary,
            home_xi,
            away_xi,
            man_of_the_match,
        })
    }

    /// The first eleven known players of the given lineup, put into batting order; otherwise a
    /// balanced XI from the squad.
    fn starting_xi(&self, team: &Team, lineup: Option<&[PlayerId]>, rand: &mut impl Rand) -> Vec<Selection> {
        let roster = self.sources.roster;
        let limit = if lineup.is_some() { XI } else { usize::MAX };
        let mut selections = lineup
            .unwrap_or(team.squad.as_slice())
            .iter()
            .filter_map(|&player_id| roster.player(player_id))
            .take(limit)
            .map(|player| {
                let projection = resolve_projection(self.sources.projections, player, rand);
                Selection::new(player, projection)
            })
            .collect::<Vec<_>>();
        match lineup {
            Some(_) => {
                sort_batting_order(&mut selections);
                selections
            }
            None => select_balanced_xi(&selections),
        }
    }

    pub fn simulate_season(
        &self,
        request: &SeasonRequest,
        cancel: &CancellationToken,
    ) -> Result<SeasonForecast, SimulationError> {
        if request.num_simulations == 0 {
            return Err(ConfigError::NoSimulations.into());
        }
        if request.fixtures.is_empty() {
            info!("no fixtures to simulate");
            return Ok(SeasonForecast {
                num_simulations: request.num_simulations,
                ..SeasonForecast::default()
            });
        }
        let seed = request
            .seed
            .or(self.config.seed)
            .unwrap_or_else(entropy_seed);
        info!("simulating season with seed {seed}");
        let tables = resolve_tables(
            &self.sources,
            &self.config.competition,
            self.config.default_venue_avg,
            request,
            seed,
        );
        let accumulator = SeasonSimulator::new(self.model)
            .with_sampler(self.sampler.clone())
            .with_workers(self.config.workers())
            .run(&tables, request.num_simulations, seed, cancel)?;
        let forecast = ResultAggregator::new(tables.team_ids(), tables.players(), self.sources.roster)
            .aggregate(&accumulator);
        Ok(forecast)
    }
}

fn predicted_runs(xi: &[Selection]) -> Vec<f64> {
    xi.iter().map(|player| player.predicted_runs).collect()
}

/// Checked construction of an [`Engine`].
pub struct EngineBuilder<'a> {
    config: Config,
    sources: Sources<'a>,
    model: Option<&'a dyn WinProbabilityModel>,
}
impl<'a> EngineBuilder<'a> {
    pub fn with_model(mut self, model: &'a dyn WinProbabilityModel) -> Self {
        self.model = Some(model);
        self
    }

    pub fn build(self) -> Result<Engine<'a>, ConfigError> {
        self.config.validate()?;
        let model = self.model.ok_or(ConfigError::MissingModel)?;
        validate_schema(model)?;
        let sampler = MatchOutcomeSampler::default().with_default_venue_avg(self.config.default_venue_avg);
        Ok(Engine {
            config: self.config,
            model,
            sources: self.sources,
            sampler,
        })
    }
}

#[cfg(test)]
mod tests;
