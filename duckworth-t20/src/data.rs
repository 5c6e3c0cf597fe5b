//! League data loaded from JSON: teams, squads, venues, fixtures, completed results and any
//! externally supplied player projections.

use std::collections::BTreeMap;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use duckworth::file::read_json;

use crate::domain::{
    Fixture, HeadToHead, MatchId, Player, PlayerId, Projection, Team, TeamId, VenueId, VenueStats,
};
use crate::error::{DataError, ProjectionError};
use crate::store::{HeadToHeadStore, PlayerProjectionProvider, Roster, VenueStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueRecord {
    pub id: VenueId,
    #[serde(flatten)]
    pub stats: VenueStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedMatch {
    #[serde(default)]
    pub match_id: Option<MatchId>,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    #[serde(default)]
    pub winner_team_id: Option<TeamId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRecord {
    pub player_id: PlayerId,
    #[serde(flatten)]
    pub projection: Projection,
}

/// The serialised form of a [`League`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueData {
    pub teams: Vec<Team>,
    pub venues: Vec<VenueRecord>,
    pub players: Vec<Player>,
    pub fixtures: Vec<Fixture>,
    pub results: Vec<CompletedMatch>,
    pub projections: Vec<ProjectionRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct League {
    teams: BTreeMap<TeamId, Team>,
    players: FxHashMap<PlayerId, Player>,
    venues: FxHashMap<VenueId, VenueStats>,
    fixtures: Vec<Fixture>,
    head_to_head: FxHashMap<(TeamId, TeamId), HeadToHead>,
    projections: FxHashMap<PlayerId, Projection>,
}
impl League {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let data: LeagueData = read_json(path)?;
        Self::try_from(data)
    }

    /// Parses a league from its JSON form.
    pub fn parse(json: &str) -> Result<Self, DataError> {
        let data: LeagueData = serde_json::from_str(json)?;
        Self::try_from(data)
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn venue_ids(&self) -> Vec<VenueId> {
        let mut ids = self.venues.keys().copied().collect::<Vec<_>>();
        ids.sort();
        ids
    }

    fn tally_head_to_head(results: &[CompletedMatch]) -> FxHashMap<(TeamId, TeamId), HeadToHead> {
        let mut tallies: FxHashMap<(TeamId, TeamId), HeadToHead> = FxHashMap::default();
        for result in results {
            let Some(winner) = result.winner_team_id else {
                continue;
            };
            let (a, b) = (result.home_team_id, result.away_team_id);
            for (home, away) in [(a, b), (b, a)] {
                let tally = tallies.entry((home, away)).or_default();
                tally.total_matches += 1;
                if winner == home {
                    tally.home_wins += 1;
                } else if winner == away {
                    tally.away_wins += 1;
                }
            }
        }
        tallies
    }
}

impl TryFrom<LeagueData> for League {
    type Error = DataError;

    fn try_from(data: LeagueData) -> Result<Self, Self::Error> {
        let mut players = FxHashMap::default();
        for player in data.players.iter().cloned() {
            if let Some(existing) = players.insert(player.id, player) {
                return Err(DataError::DuplicatePlayer(existing.id));
            }
        }

        let mut teams = BTreeMap::new();
        for mut team in data.teams {
            if team.squad.is_empty() {
                team.squad = data
                    .players
                    .iter()
                    .filter(|player| player.team_id == Some(team.id))
                    .map(|player| player.id)
                    .collect();
            }
            if let Some(&player_id) = team.squad.iter().find(|id| !players.contains_key(id)) {
                return Err(DataError::UnknownSquadPlayer {
                    team_id: team.id,
                    player_id,
                });
            }
            if let Some(existing) = teams.insert(team.id, team) {
                return Err(DataError::DuplicateTeam(existing.id));
            }
        }

        let mut venues = FxHashMap::default();
        for venue in data.venues {
            if venues.insert(venue.id, venue.stats).is_some() {
                return Err(DataError::DuplicateVenue(venue.id));
            }
        }

        for fixture in &data.fixtures {
            for team_id in [fixture.home_team_id, fixture.away_team_id] {
                if !teams.contains_key(&team_id) {
                    return Err(DataError::UnknownFixtureTeam {
                        match_id: fixture.match_id,
                        team_id,
                    });
                }
            }
            if !venues.contains_key(&fixture.venue_id) {
                return Err(DataError::UnknownFixtureVenue {
                    match_id: fixture.match_id,
                    venue_id: fixture.venue_id,
                });
            }
        }

        let head_to_head = Self::tally_head_to_head(&data.results);
        let projections = data
            .projections
            .into_iter()
            .map(|record| (record.player_id, record.projection))
            .collect::<FxHashMap<_, _>>();
        debug!(
            "loaded league: {} teams, {} players, {} venues, {} fixtures, {} projections",
            teams.len(),
            players.len(),
            venues.len(),
            data.fixtures.len(),
            projections.len()
        );
        Ok(Self {
            teams,
            players,
            venues,
            fixtures: data.fixtures,
            head_to_head,
            projections,
        })
    }
}

impl Roster for League {
    fn team(&self, team_id: TeamId) -> Option<&Team> {
        self.teams.get(&team_id)
    }

    fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.get(&player_id)
    }

    fn teams(&self) -> Vec<&Team> {
        self.teams.values().collect()
    }
}

impl VenueStore for League {
    fn lookup(&self, venue_id: VenueId) -> Option<&VenueStats> {
        self.venues.get(&venue_id)
    }
}

impl HeadToHeadStore for League {
    fn record(&self, home: TeamId, away: TeamId) -> Option<HeadToHead> {
        self.head_to_head.get(&(home, away)).copied()
    }
}

impl PlayerProjectionProvider for League {
    fn predict(&self, player_id: PlayerId) -> Result<Option<Projection>, ProjectionError> {
        Ok(self.projections.get(&player_id).copied())
    }
}
