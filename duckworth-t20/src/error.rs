use std::io;

use thiserror::Error;

use crate::domain::{MatchId, PlayerId, ResultType, Side, TeamId, VenueId};
use crate::features::Feature;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no win probability model configured")]
    MissingModel,

    #[error("model feature schema is empty")]
    EmptySchema,

    #[error("unknown feature '{0}' in model schema")]
    UnknownFeature(String),

    #[error("duplicate feature '{0}' in model schema")]
    DuplicateFeature(Feature),

    #[error("{features} features in model schema but {values} {kind}")]
    MisalignedModel {
        features: usize,
        values: usize,
        kind: &'static str,
    },

    #[error("number of simulations must be positive")]
    NoSimulations,

    #[error("{0}")]
    Invalid(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("simulation cancelled")]
    Cancelled,

    #[error("cannot build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("unknown team {0}")]
    UnknownTeam(TeamId),

    #[error("unknown venue {0}")]
    UnknownVenue(VenueId),

    #[error("team {0} cannot play itself")]
    SameTeam(TeamId),
}

#[derive(Debug, Error)]
#[error("projection unavailable for player {player_id}: {reason}")]
pub struct ProjectionError {
    pub player_id: PlayerId,
    pub reason: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidOutcome {
    #[error("winner {winner} does not correspond to team {winner_team_id}")]
    WinnerMismatch {
        winner: Side,
        winner_team_id: TeamId,
    },

    #[error("innings scores do not correspond to the side batting first")]
    InningsMismatch,

    #[error("{0} wickets exceeds an innings")]
    TooManyWickets(u8),

    #[error("side batting first won with {first} but was chased down by {second}")]
    FailedDefence { first: u32, second: u32 },

    #[error("side batting second was all out yet won")]
    AllOutChaseWin,

    #[error("chase of {target} won with only {score}")]
    ShortChase { target: u32, score: u32 },

    #[error("expected a result by {expected}, got {actual}")]
    ResultTypeMismatch {
        expected: ResultType,
        actual: ResultType,
    },

    #[error("expected a margin of {expected}, got {actual}")]
    MarginMismatch { expected: u32, actual: u32 },
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid model: {0}")]
    Model(#[from] ConfigError),

    #[error("duplicate team {0}")]
    DuplicateTeam(TeamId),

    #[error("duplicate player {0}")]
    DuplicatePlayer(PlayerId),

    #[error("duplicate venue {0}")]
    DuplicateVenue(VenueId),

    #[error("team {team_id} lists unknown player {player_id}")]
    UnknownSquadPlayer { team_id: TeamId, player_id: PlayerId },

    #[error("fixture {match_id} references unknown team {team_id}")]
    UnknownFixtureTeam { match_id: MatchId, team_id: TeamId },

    #[error("fixture {match_id} references unknown venue {venue_id}")]
    UnknownFixtureVenue { match_id: MatchId, venue_id: VenueId },

    #[error("missing column '{0}'")]
    MissingColumn(&'static str),
}
