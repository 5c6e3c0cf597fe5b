//! Sampling of a complete match result (toss, innings totals, wickets, winner and margin) from a
//! home-win probability and what is known about the two sides and the venue.

use tinyrand::Rand;

use duckworth::random::{bernoulli, gaussian, uniform_inclusive, weighted};

use crate::domain::{
    MatchOutcome, PitchType, ResultType, Side, TeamId, TossRecord, MAX_WICKETS,
};

pub const DEFAULT_VENUE_AVG: f64 = 160.;

/// Minimum venue toss history before it is trusted over the pitch heuristic.
const MIN_TOSS_SAMPLE: u32 = 5;
const TOP_ORDER: usize = 6;
const LOWER_ORDER_WEIGHT: f64 = 0.35;

const LINEUP_SCORE_BAND: (f64, f64) = (130., 230.);
const COLD_SCORE_BAND: (f64, f64) = (125., 215.);
const COLD_SCORE_SD: f64 = 7.;
const COLD_WICKETS: ([u8; 5], [f64; 5]) = ([10, 9, 8, 7, 6], [0.1, 0.15, 0.2, 0.25, 0.3]);

const DEFENDED_FLOOR: u32 = 100;
const LOSING_WICKETS: ([u8; 4], [f64; 4]) = ([10, 9, 8, 7], [0.1, 0.2, 0.25, 0.2]);
const CHASING_WICKETS: ([u8; 5], [f64; 5]) = ([3, 4, 5, 6, 7], [0.15, 0.25, 0.3, 0.2, 0.1]);

/// What the sampler needs to know about one side.
#[derive(Debug, Clone, Copy, Default)]
pub struct SideContext<'a> {
    pub team_id: TeamId,
    /// Season average first-innings total; non-positive if unknown.
    pub avg_runs_for: f64,
    /// Predicted runs of the starting XI, in batting order.
    pub lineup: Option<&'a [f64]>,
}

#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub home: SideContext<'a>,
    pub away: SideContext<'a>,
    /// Venue average first-innings total; non-positive if unknown.
    pub venue_avg: f64,
    pub pitch_type: PitchType,
    pub toss_record: Option<TossRecord>,
}

#[derive(Debug, Clone)]
pub struct MatchOutcomeSampler {
    default_venue_avg: f64,
}
impl Default for MatchOutcomeSampler {
    fn default() -> Self {
        Self {
            default_venue_avg: DEFAULT_VENUE_AVG,
        }
    }
}
impl MatchOutcomeSampler {
    pub fn with_default_venue_avg(mut self, default_venue_avg: f64) -> Self {
        self.default_venue_avg = default_venue_avg;
        self
    }

    pub fn sample(
        &self,
        context: &MatchContext,
        home_win_probability: f64,
        rand: &mut impl Rand,
    ) -> MatchOutcome {
        let toss_winner = if bernoulli(rand, 0.5) {
            Side::Home
        } else {
            Side::Away
        };
        let bat_first = if bernoulli(rand, bat_first_probability(context)) {
            toss_winner
        } else {
            toss_winner.opposite()
        };

        let venue_avg = positive_or(context.venue_avg, self.default_venue_avg);
        let (home_score, home_wickets) = sample_innings(&context.home, venue_avg, rand);
        let (away_score, away_wickets) = sample_innings(&context.away, venue_avg, rand);
        let ((first_score, first_wickets), (mut second_score, mut second_wickets)) = match bat_first {
            Side::Home => ((home_score, home_wickets), (away_score, away_wickets)),
            Side::Away => ((away_score, away_wickets), (home_score, home_wickets)),
        };

        let home_wins = bernoulli(rand, home_win_probability);
        let degenerate = home_win_probability <= 0. || home_win_probability >= 1.;
        let first_team_wins = if second_wickets >= MAX_WICKETS && !degenerate {
            true
        } else {
            (bat_first == Side::Home) == home_wins
        };

        let target = first_score + 1;
        let (result_type, margin) = if first_team_wins {
            if second_score >= first_score {
                let shortfall = uniform_inclusive(rand, 1, 50);
                second_score = first_score.saturating_sub(shortfall).max(DEFENDED_FLOOR);
                if second_score >= first_score {
                    second_score = first_score.saturating_sub(1);
                }
            }
            second_wickets = weighted(rand, &LOSING_WICKETS.0, &LOSING_WICKETS.1);
            (ResultType::Runs, first_score - second_score)
        } else {
            second_score = target + uniform_inclusive(rand, 1, 6);
            second_wickets = weighted(rand, &CHASING_WICKETS.0, &CHASING_WICKETS.1);
            (ResultType::Wickets, u32::from(MAX_WICKETS - second_wickets))
        };

        let winner = if first_team_wins {
            bat_first
        } else {
            bat_first.opposite()
        };
        let ((home_score, home_wickets), (away_score, away_wickets)) = match bat_first {
            Side::Home => ((first_score, first_wickets), (second_score, second_wickets)),
            Side::Away => ((second_score, second_wickets), (first_score, first_wickets)),
        };
        let winner_team_id = match winner {
            Side::Home => context.home.team_id,
            Side::Away => context.away.team_id,
        };
        MatchOutcome {
            home_team_id: context.home.team_id,
            away_team_id: context.away.team_id,
            toss_winner,
            bat_first,
            home_score,
            home_wickets,
            away_score,
            away_wickets,
            first_innings_score: first_score,
            first_innings_wickets: first_wickets,
            second_innings_score: second_score,
            second_innings_wickets: second_wickets,
            winner,
            winner_team_id,
            result_type,
            margin,
        }
    }
}

/// Probability that the toss winner elects to bat.
fn bat_first_probability(context: &MatchContext) -> f64 {
    match context.toss_record {
        Some(record) if record.sample_size() >= MIN_TOSS_SAMPLE => {
            let (bat, chase) = (record.bat_first_win_rate(), record.chase_win_rate());
            if bat > chase {
                1.
            } else if chase > bat {
                0.
            } else {
                0.6
            }
        }
        _ => match context.pitch_type {
            PitchType::BattingFriendly => 0.65,
            PitchType::BowlingFriendly => 0.55,
            PitchType::Neutral => 0.6,
        },
    }
}

fn positive_or(value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0. {
        value
    } else {
        default
    }
}

/// Expected XI total: the top order in full plus a discounted contribution from the tail.
pub fn expected_lineup_runs(lineup: &[f64]) -> f64 {
    lineup
        .iter()
        .enumerate()
        .map(|(position, &runs)| {
            let runs = if runs.is_finite() { runs.max(0.) } else { 0. };
            if position < TOP_ORDER {
                runs
            } else {
                runs * LOWER_ORDER_WEIGHT
            }
        })
        .sum()
}

fn sample_innings(side: &SideContext, venue_avg: f64, rand: &mut impl Rand) -> (u32, u8) {
    let team_avg = positive_or(side.avg_runs_for, venue_avg);
    match side.lineup {
        Some(lineup) if !lineup.is_empty() => {
            let blended =
                0.55 * expected_lineup_runs(lineup) + 0.30 * venue_avg + 0.15 * team_avg;
            let noisy = blended + gaussian(rand, 0., f64::max(5., blended * 0.05));
            let runs = clamp_score(noisy, LINEUP_SCORE_BAND);
            (runs, sample_wickets(runs, rand))
        }
        _ => {
            let blended = 0.6 * venue_avg + 0.4 * team_avg;
            let runs = clamp_score(blended + gaussian(rand, 0., COLD_SCORE_SD), COLD_SCORE_BAND);
            (runs, weighted(rand, &COLD_WICKETS.0, &COLD_WICKETS.1))
        }
    }
}

fn clamp_score(score: f64, (min, max): (f64, f64)) -> u32 {
    if score.is_finite() {
        score.clamp(min, max) as u32
    } else {
        min as u32
    }
}

/// Wickets lost in an innings of `runs`: big totals come from aggressive batting and tend to cost
/// more wickets, while low totals spread wider.
pub fn sample_wickets(runs: u32, rand: &mut impl Rand) -> u8 {
    if runs > 180 {
        weighted(rand, &[10, 9, 8, 7], &[0.3, 0.25, 0.25, 0.2])
    } else if runs > 150 {
        weighted(rand, &[10, 9, 8, 7, 6], &[0.15, 0.2, 0.25, 0.25, 0.15])
    } else {
        weighted(
            rand,
            &[10, 9, 8, 7, 6, 5, 4],
            &[0.05, 0.1, 0.15, 0.2, 0.25, 0.15, 0.1],
        )
    }
}
