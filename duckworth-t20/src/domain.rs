use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumIter};

use crate::error::InvalidOutcome;

pub const MAX_WICKETS: u8 = 10;

macro_rules! id_type {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

id_type!(TeamId, "T");
id_type!(PlayerId, "P");
id_type!(VenueId, "V");
id_type!(MatchId, "M");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}
impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// Season aggregates of one team, as published in the feature snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamFeatureRow {
    pub win_pct: f64,
    pub run_rate: f64,
    pub net_run_rate: f64,
    pub avg_runs_for: f64,
    pub avg_runs_against: f64,
    pub matches_played: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "snake_case")]
pub enum PitchType {
    BattingFriendly,
    BowlingFriendly,
    #[default]
    Neutral,
}

impl From<&str> for PitchType {
    fn from(description: &str) -> Self {
        let description = description.to_lowercase();
        if ["flat", "hard", "batting"]
            .iter()
            .any(|keyword| description.contains(keyword))
        {
            PitchType::BattingFriendly
        } else if ["green", "moist", "bowling", "seam", "turn"]
            .iter()
            .any(|keyword| description.contains(keyword))
        {
            PitchType::BowlingFriendly
        } else {
            PitchType::Neutral
        }
    }
}

impl From<String> for PitchType {
    fn from(description: String) -> Self {
        Self::from(description.as_str())
    }
}

/// Historical toss-decision outcomes at a venue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TossRecord {
    pub bat_first_wins: u32,
    pub bat_first_total: u32,
    pub chase_wins: u32,
    pub chase_total: u32,
}
impl TossRecord {
    pub fn sample_size(&self) -> u32 {
        self.bat_first_total + self.chase_total
    }

    pub fn bat_first_win_rate(&self) -> f64 {
        rate(self.bat_first_wins, self.bat_first_total)
    }

    pub fn chase_win_rate(&self) -> f64 {
        rate(self.chase_wins, self.chase_total)
    }
}

fn rate(wins: u32, total: u32) -> f64 {
    if total == 0 {
        0.5
    } else {
        wins as f64 / total as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueStats {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avg_first_innings_score: f64,
    #[serde(default)]
    pub pitch_type: PitchType,
    #[serde(default)]
    pub toss_record: Option<TossRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub match_id: MatchId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub venue_id: VenueId,
}

/// Prior meetings between a home and an away team, from the home team's perspective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub total_matches: u32,
    pub home_wins: u32,
    pub away_wins: u32,
}
impl HeadToHead {
    /// The home side's win share, or an even 0.5 when the teams have never met.
    pub fn home_win_pct(&self) -> f64 {
        rate(self.home_wins, self.total_matches)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, StrumDisplay, EnumIter,
)]
#[serde(from = "String", rename_all = "snake_case")]
pub enum Role {
    Batsman,
    WicketKeeper,
    AllRounder,
    Bowler,
    #[default]
    Unspecified,
}

impl From<&str> for Role {
    fn from(role: &str) -> Self {
        let normalised = role
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalised.as_str() {
            "batsman" | "batter" | "bat" | "openingbatter" | "toporderbatter" => Role::Batsman,
            "wicketkeeper" | "wk" | "keeper" | "wicketkeeperbatter" | "wicketkeeperbatsman" => {
                Role::WicketKeeper
            }
            "allrounder" | "ar" | "battingallrounder" | "bowlingallrounder" => Role::AllRounder,
            "bowler" | "fastbowler" | "pacebowler" | "seamer" | "spinner" | "legspinner"
            | "offspinner" | "spinbowler" => Role::Bowler,
            _ => Role::Unspecified,
        }
    }
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        Self::from(role.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareerStats {
    pub matches_played: u32,
    pub runs_scored: u32,
    pub wickets_taken: u32,
    pub batting_average: f64,
    pub strike_rate: f64,
    pub bowling_average: f64,
    pub economy_rate: f64,
}
impl CareerStats {
    pub fn runs_per_match(&self) -> f64 {
        self.runs_scored as f64 / self.matches_played.max(1) as f64
    }

    pub fn wickets_per_match(&self) -> f64 {
        self.wickets_taken as f64 / self.matches_played.max(1) as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub career: Option<CareerStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub squad: Vec<PlayerId>,
}

/// Predicted per-match output of a player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub predicted_runs: f64,
    pub predicted_wickets: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResultType {
    Runs,
    Wickets,
}

/// A complete, internally consistent result of one simulated match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub toss_winner: Side,
    pub bat_first: Side,
    pub home_score: u32,
    pub home_wickets: u8,
    pub away_score: u32,
    pub away_wickets: u8,
    pub first_innings_score: u32,
    pub first_innings_wickets: u8,
    pub second_innings_score: u32,
    pub second_innings_wickets: u8,
    pub winner: Side,
    pub winner_team_id: TeamId,
    pub result_type: ResultType,
    pub margin: u32,
}
impl MatchOutcome {
    pub fn target(&self) -> u32 {
        self.first_innings_score + 1
    }

    pub fn team_id(&self, side: Side) -> TeamId {
        match side {
            Side::Home => self.home_team_id,
            Side::Away => self.away_team_id,
        }
    }

    pub fn loser_team_id(&self) -> TeamId {
        self.team_id(self.winner.opposite())
    }

    pub fn validate(&self) -> Result<(), InvalidOutcome> {
        if self.winner_team_id != self.team_id(self.winner) {
            return Err(InvalidOutcome::WinnerMismatch {
                winner: self.winner,
                winner_team_id: self.winner_team_id,
            });
        }
        let (first, second) = match self.bat_first {
            Side::Home => (
                (self.home_score, self.home_wickets),
                (self.away_score, self.away_wickets),
            ),
            Side::Away => (
                (self.away_score, self.away_wickets),
                (self.home_score, self.home_wickets),
            ),
        };
        if first != (self.first_innings_score, self.first_innings_wickets)
            || second != (self.second_innings_score, self.second_innings_wickets)
        {
            return Err(InvalidOutcome::InningsMismatch);
        }
        for wickets in [self.first_innings_wickets, self.second_innings_wickets] {
            if wickets > MAX_WICKETS {
                return Err(InvalidOutcome::TooManyWickets(wickets));
            }
        }

        let defended = self.winner == self.bat_first;
        let (expected_type, expected_margin) = if defended {
            if self.second_innings_score >= self.first_innings_score {
                return Err(InvalidOutcome::FailedDefence {
                    first: self.first_innings_score,
                    second: self.second_innings_score,
                });
            }
            (
                ResultType::Runs,
                self.first_innings_score - self.second_innings_score,
            )
        } else {
            if self.second_innings_wickets >= MAX_WICKETS {
                return Err(InvalidOutcome::AllOutChaseWin);
            }
            if self.second_innings_score < self.target() {
                return Err(InvalidOutcome::ShortChase {
                    target: self.target(),
                    score: self.second_innings_score,
                });
            }
            (
                ResultType::Wickets,
                u32::from(MAX_WICKETS - self.second_innings_wickets),
            )
        };
        if self.result_type != expected_type {
            return Err(InvalidOutcome::ResultTypeMismatch {
                expected: expected_type,
                actual: self.result_type,
            });
        }
        if self.margin != expected_margin || self.margin == 0 {
            return Err(InvalidOutcome::MarginMismatch {
                expected: expected_margin,
                actual: self.margin,
            });
        }
        Ok(())
    }

    /// A scorecard-style summary of the result, e.g. "Paarl Royals won by 12 runs".
    pub fn describe(&self, winner_name: &str) -> String {
        let unit = match (self.result_type, self.margin) {
            (ResultType::Runs, 1) => "run",
            (ResultType::Runs, _) => "runs",
            (ResultType::Wickets, 1) => "wicket",
            (ResultType::Wickets, _) => "wickets",
        };
        format!("{winner_name} won by {} {unit}", self.margin)
    }
}

#[cfg(test)]
mod tests;
