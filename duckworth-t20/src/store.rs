//! Read-only lookups the engine consumes. Everything here is resolved once, before simulation.

use std::io::BufRead;
use std::path::Path;

use rustc_hash::FxHashMap;
use tracing::debug;

use duckworth::csv::{CsvReader, Record};

use crate::data::League;
use crate::domain::{
    HeadToHead, Player, PlayerId, Projection, Team, TeamFeatureRow, TeamId, VenueId, VenueStats,
};
use crate::error::{DataError, ProjectionError};

pub trait TeamFeatureStore: Sync {
    fn lookup(&self, competition: &str, team_name: &str) -> Option<TeamFeatureRow>;
}

pub trait VenueStore: Sync {
    fn lookup(&self, venue_id: VenueId) -> Option<&VenueStats>;
}

pub trait PlayerProjectionProvider: Sync {
    fn predict(&self, player_id: PlayerId) -> Result<Option<Projection>, ProjectionError>;
}

pub trait HeadToHeadStore: Sync {
    /// Completed meetings between the two teams, seen from `home`'s perspective.
    fn record(&self, home: TeamId, away: TeamId) -> Option<HeadToHead>;
}

pub trait Roster: Sync {
    fn team(&self, team_id: TeamId) -> Option<&Team>;

    fn player(&self, player_id: PlayerId) -> Option<&Player>;

    /// All teams, in ascending id order.
    fn teams(&self) -> Vec<&Team>;
}

/// A feature store with no rows. Every team starts cold.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyTeamFeatureStore;
impl TeamFeatureStore for EmptyTeamFeatureStore {
    fn lookup(&self, _: &str, _: &str) -> Option<TeamFeatureRow> {
        None
    }
}

/// The full set of lookups behind a prediction or season run.
#[derive(Clone, Copy)]
pub struct Sources<'a> {
    pub roster: &'a dyn Roster,
    pub venues: &'a dyn VenueStore,
    pub team_features: &'a dyn TeamFeatureStore,
    pub head_to_head: &'a dyn HeadToHeadStore,
    pub projections: &'a dyn PlayerProjectionProvider,
}
impl<'a> Sources<'a> {
    /// Everything from `league`, with no team feature snapshot.
    pub fn from_league(league: &'a League) -> Self {
        Self {
            roster: league,
            venues: league,
            team_features: &EmptyTeamFeatureStore,
            head_to_head: league,
            projections: league,
        }
    }

    pub fn with_team_features(mut self, team_features: &'a dyn TeamFeatureStore) -> Self {
        self.team_features = team_features;
        self
    }

    pub fn with_projections(mut self, projections: &'a dyn PlayerProjectionProvider) -> Self {
        self.projections = projections;
        self
    }
}

/// Lower-case alphanumerics only, so that "Sunrisers Eastern Cape" and "sunrisers-eastern-cape"
/// resolve to the same key.
pub fn normalise_team_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Team aggregates keyed by (competition, normalised team name), loaded from a CSV snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotTeamFeatureStore {
    rows: FxHashMap<(String, String), TeamFeatureRow>,
}
impl SnapshotTeamFeatureStore {
    const DEFAULT_COMPETITION: &'static str = "sa20";

    pub fn open(path: impl AsRef<Path>) -> Result<Self, DataError> {
        Self::read(CsvReader::open(path)?)
    }

    pub fn read<R: BufRead>(reader: CsvReader<R>) -> Result<Self, DataError> {
        let reader = reader.with_header()?;
        if !reader.has_column("team_name") {
            return Err(DataError::MissingColumn("team_name"));
        }
        let mut rows = FxHashMap::default();
        for record in reader {
            let record = record?;
            let Some(team_name) = record.get("team_name") else {
                continue;
            };
            let competition = record
                .get("competition")
                .unwrap_or(Self::DEFAULT_COMPETITION)
                .to_string();
            rows.insert(
                (competition, normalise_team_name(team_name)),
                Self::parse_row(&record),
            );
        }
        debug!("loaded {} team feature rows", rows.len());
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn parse_row(record: &Record) -> TeamFeatureRow {
        let matches_played = record.get_f64(&["matches_played"]).unwrap_or_default();
        let avg_runs_for = record.get_f64(&["avg_runs_for"]).unwrap_or_else(|| {
            match record.get_f64(&["total_runs"]) {
                Some(total_runs) if matches_played > 0. => total_runs / matches_played,
                _ => 0.,
            }
        });
        TeamFeatureRow {
            win_pct: record
                .get_f64(&["win_pct", "win_percentage"])
                .unwrap_or_default(),
            run_rate: record.get_f64(&["run_rate"]).unwrap_or_default(),
            net_run_rate: record
                .get_f64(&["net_run_rate", "net_rr"])
                .unwrap_or_default(),
            avg_runs_for,
            avg_runs_against: record.get_f64(&["avg_runs_against"]).unwrap_or_default(),
            matches_played,
        }
    }
}

impl TeamFeatureStore for SnapshotTeamFeatureStore {
    fn lookup(&self, competition: &str, team_name: &str) -> Option<TeamFeatureRow> {
        self.rows
            .get(&(competition.to_string(), normalise_team_name(team_name)))
            .copied()
    }
}

/// Resolves a team's feature row by its full name, then by its short name.
pub fn lookup_team_row(
    store: &dyn TeamFeatureStore,
    competition: &str,
    team: &Team,
) -> Option<TeamFeatureRow> {
    store.lookup(competition, &team.name).or_else(|| {
        team.short_name
            .as_deref()
            .and_then(|short_name| store.lookup(competition, short_name))
    })
}
