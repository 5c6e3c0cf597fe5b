//! Reduction of many simulated seasons into a forecast: per-team probabilities and percentile
//! bands, and the season awards.

use std::collections::BTreeMap;

use serde::Serialize;

use duckworth::stats::SliceExt;

use crate::domain::{PlayerId, Role, TeamId};
use crate::lineup::XI;
use crate::season::{PlayerEntry, SimulationAccumulator};
use crate::store::Roster;

/// Runs-equivalent of one wicket when ranking all-round contributions.
pub const WICKET_VALUE: f64 = 20.;
const UPSET_PLACES: f64 = 2.;
const POINTS_BAND: [f64; 3] = [10., 50., 90.];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamForecast {
    pub team_id: TeamId,
    pub team_name: String,
    pub mean_position: f64,
    pub position_std_dev: f64,
    pub mean_points: f64,
    pub points_p10: f64,
    pub points_p50: f64,
    pub points_p90: f64,
    pub mean_wins: f64,
    pub playoff_probability: f64,
    pub finals_probability: f64,
    pub championship_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapAward {
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_id: TeamId,
    pub team_name: String,
    /// Mean season total.
    pub average: f64,
    /// Least and greatest season totals across simulations.
    pub range: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerPerformance {
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_id: TeamId,
    pub team_name: String,
    pub role: Role,
    pub avg_runs: f64,
    pub avg_wickets: f64,
    /// `avg_runs + 20 × avg_wickets`.
    pub composite: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Upset {
    pub team_id: TeamId,
    pub team_name: String,
    /// Rank in the ordering by mean position.
    pub expected_position: usize,
    pub actual_position: f64,
    pub improvement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChampionPick {
    pub team_id: TeamId,
    pub team_name: String,
    pub probability: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AwardSummary {
    pub orange_cap: Option<CapAward>,
    pub purple_cap: Option<CapAward>,
    pub mvp: Option<PlayerPerformance>,
    pub team_of_tournament: Vec<PlayerPerformance>,
    pub upset_tracker: Vec<Upset>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeasonForecast {
    pub predicted_standings: Vec<TeamForecast>,
    pub playoff_probabilities: BTreeMap<TeamId, f64>,
    pub championship_probabilities: BTreeMap<TeamId, f64>,
    pub champion: Option<ChampionPick>,
    #[serde(flatten)]
    pub awards: AwardSummary,
    pub num_simulations: usize,
}

pub struct ResultAggregator<'a> {
    team_ids: &'a [TeamId],
    players: &'a [PlayerEntry],
    roster: &'a dyn Roster,
}
impl<'a> ResultAggregator<'a> {
    /// `team_ids` and `players` index the accumulator's per-team and per-player tallies.
    pub fn new(team_ids: &'a [TeamId], players: &'a [PlayerEntry], roster: &'a dyn Roster) -> Self {
        Self {
            team_ids,
            players,
            roster,
        }
    }

    pub fn aggregate(&self, accumulator: &SimulationAccumulator) -> SeasonForecast {
        assert_eq!(self.team_ids.len(), accumulator.num_teams(), "team count mismatch");
        assert_eq!(self.players.len(), accumulator.num_players(), "player count mismatch");
        let simulations = accumulator.simulations;
        let percent = |count: u32| {
            if simulations == 0 {
                0.
            } else {
                count as f64 / simulations as f64 * 100.
            }
        };

        let mut predicted_standings = self
            .team_ids
            .iter()
            .enumerate()
            .map(|(team, &team_id)| {
                let positions = &accumulator.positions[team];
                let points = &accumulator.points[team];
                let [points_p10, points_p50, points_p90] = points.percentiles(POINTS_BAND);
                TeamForecast {
                    team_id,
                    team_name: self.team_name(team_id),
                    mean_position: positions.mean(),
                    position_std_dev: positions.std_dev(),
                    mean_points: points.mean(),
                    points_p10,
                    points_p50,
                    points_p90,
                    mean_wins: accumulator.wins[team].mean(),
                    playoff_probability: percent(accumulator.playoffs[team]),
                    finals_probability: percent(accumulator.finals[team]),
                    championship_probability: percent(accumulator.championships[team]),
                }
            })
            .collect::<Vec<_>>();
        let upset_tracker = self.upsets(&predicted_standings);
        predicted_standings.sort_by(|a, b| b.mean_points.total_cmp(&a.mean_points));

        let playoff_probabilities = self
            .team_ids
            .iter()
            .zip(&accumulator.playoffs)
            .map(|(&team_id, &count)| (team_id, percent(count)))
            .collect();
        let championship_probabilities = self
            .team_ids
            .iter()
            .zip(&accumulator.championships)
            .map(|(&team_id, &count)| (team_id, percent(count)))
            .collect();

        let champion = first_max_by(&accumulator.championships, |&count| count as f64)
            .filter(|&team| accumulator.championships[team] > 0)
            .map(|team| {
                let team_id = self.team_ids[team];
                ChampionPick {
                    team_id,
                    team_name: self.team_name(team_id),
                    probability: percent(accumulator.championships[team]),
                }
            });

        let performances = self.performances(accumulator);
        let awards = AwardSummary {
            orange_cap: self.cap(&accumulator.player_runs),
            purple_cap: self.cap(&accumulator.player_wickets),
            mvp: first_max_by(&performances, |performance| performance.composite)
                .map(|index| performances[index].clone()),
            team_of_tournament: team_of_tournament(&performances),
            upset_tracker,
        };

        SeasonForecast {
            predicted_standings,
            playoff_probabilities,
            championship_probabilities,
            champion,
            awards,
            num_simulations: simulations,
        }
    }

    fn team_name(&self, team_id: TeamId) -> String {
        self.roster
            .team(team_id)
            .map(|team| team.name.clone())
            .unwrap_or_else(|| team_id.to_string())
    }

    fn cap(&self, samples: &[Vec<f64>]) -> Option<CapAward> {
        let best = first_max_by(samples, |samples| samples.mean())?;
        let player = &self.players[best];
        let samples = &samples[best];
        Some(CapAward {
            player_id: player.id,
            player_name: player.name.clone(),
            team_id: player.team_id,
            team_name: self.team_name(player.team_id),
            average: samples.mean(),
            range: [samples.min_value(), samples.max_value()],
        })
    }

    fn performances(&self, accumulator: &SimulationAccumulator) -> Vec<PlayerPerformance> {
        self.players
            .iter()
            .enumerate()
            .map(|(index, player)| {
                let avg_runs = accumulator.player_runs[index].mean();
                let avg_wickets = accumulator.player_wickets[index].mean();
                PlayerPerformance {
                    player_id: player.id,
                    player_name: player.name.clone(),
                    team_id: player.team_id,
                    team_name: self.team_name(player.team_id),
                    role: player.role,
                    avg_runs,
                    avg_wickets,
                    composite: avg_runs + WICKET_VALUE * avg_wickets,
                }
            })
            .collect()
    }

    /// Teams whose mean finishing position is at least two places better than their rank in the
    /// ordering by mean position.
    fn upsets(&self, standings: &[TeamForecast]) -> Vec<Upset> {
        let mut by_position = standings.iter().collect::<Vec<_>>();
        by_position.sort_by(|a, b| a.mean_position.total_cmp(&b.mean_position));
        by_position
            .into_iter()
            .enumerate()
            .filter_map(|(rank, forecast)| {
                let expected_position = rank + 1;
                let improvement = expected_position as f64 - forecast.mean_position;
                (improvement >= UPSET_PLACES).then(|| Upset {
                    team_id: forecast.team_id,
                    team_name: forecast.team_name.clone(),
                    expected_position,
                    actual_position: forecast.mean_position,
                    improvement,
                })
            })
            .collect()
    }
}

/// Index of the greatest `key`, the first such on ties; `None` if `items` is empty.
fn first_max_by<T>(items: &[T], key: impl Fn(&T) -> f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, item) in items.iter().enumerate() {
        let value = key(item);
        if best.map_or(true, |(_, best)| value > best) {
            best = Some((index, value));
        }
    }
    best.map(|(index, _)| index)
}

/// Best XI of the season: the top keeper, four batsmen, two all-rounders and four bowlers by
/// composite, topped up from the rest, ordered by composite.
pub fn team_of_tournament(performances: &[PlayerPerformance]) -> Vec<PlayerPerformance> {
    let mut ranked = (0..performances.len()).collect::<Vec<_>>();
    ranked.sort_by(|&a, &b| {
        performances[b]
            .composite
            .total_cmp(&performances[a].composite)
    });

    let mut chosen = vec![false; performances.len()];
    let mut picks = Vec::with_capacity(XI);
    for (role, quota) in [
        (Role::WicketKeeper, 1),
        (Role::Batsman, 4),
        (Role::AllRounder, 2),
        (Role::Bowler, 4),
    ] {
        for &index in ranked
            .iter()
            .filter(|&&index| performances[index].role == role)
            .take(quota)
        {
            chosen[index] = true;
            picks.push(index);
        }
    }
    for &index in &ranked {
        if picks.len() >= XI {
            break;
        }
        if !chosen[index] {
            chosen[index] = true;
            picks.push(index);
        }
    }

    picks.sort_by(|&a, &b| {
        performances[b]
            .composite
            .total_cmp(&performances[a].composite)
    });
    picks
        .into_iter()
        .map(|index| performances[index].clone())
        .collect()
}
