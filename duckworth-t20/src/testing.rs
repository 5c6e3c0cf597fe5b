//! Synthetic leagues for tests.

use crate::data::{CompletedMatch, League, LeagueData, ProjectionRecord, VenueRecord};
use crate::domain::{
    CareerStats, Fixture, MatchId, PitchType, Player, PlayerId, Projection, Role, Team, TeamId,
    TossRecord, VenueId, VenueStats,
};

pub const SQUAD_SIZE: u32 = 13;

fn role_at(index: u32) -> Role {
    match index {
        0 => Role::WicketKeeper,
        1..=5 => Role::Batsman,
        6..=8 => Role::AllRounder,
        _ => Role::Bowler,
    }
}

pub fn player_id(team: u32, index: u32) -> PlayerId {
    PlayerId(team * 100 + index)
}

/// A league of `num_teams` teams of [`SQUAD_SIZE`] players each, two venues, a cyclic fixture
/// list in which every team plays twice (T1–T2, T2–T3, …, Tn–T1), a short head-to-head history
/// between T1 and T2, and explicit projections for T1's squad only.
pub fn league_data(num_teams: u32) -> LeagueData {
    let mut teams = vec![];
    let mut players = vec![];
    let mut projections = vec![];
    for team in 1..=num_teams {
        let mut squad = vec![];
        for index in 0..SQUAD_SIZE {
            let id = player_id(team, index);
            let role = role_at(index);
            let (runs, wickets) = match role {
                Role::WicketKeeper => (520, 0),
                Role::Batsman => (700 - index * 40, 0),
                Role::AllRounder => (380 - index * 10, 12 + index),
                _ => (60, 30 - index),
            };
            players.push(Player {
                id,
                name: format!("Player {team}-{index}"),
                team_id: Some(TeamId(team)),
                role,
                career: Some(CareerStats {
                    matches_played: 20,
                    runs_scored: runs,
                    wickets_taken: wickets,
                    batting_average: runs as f64 / 15.,
                    strike_rate: 120. + index as f64,
                    bowling_average: if wickets > 0 { 24. } else { 0. },
                    economy_rate: if wickets > 0 { 7.5 } else { 0. },
                }),
            });
            squad.push(id);
            if team == 1 {
                projections.push(ProjectionRecord {
                    player_id: id,
                    projection: Projection {
                        predicted_runs: runs as f64 / 20.,
                        predicted_wickets: wickets as f64 / 20.,
                    },
                });
            }
        }
        teams.push(Team {
            id: TeamId(team),
            name: format!("Team {team}"),
            short_name: Some(format!("T{team}")),
            squad,
        });
    }

    let venues = vec![
        VenueRecord {
            id: VenueId(1),
            stats: VenueStats {
                name: "Kingsmead".into(),
                avg_first_innings_score: 172.,
                pitch_type: PitchType::BattingFriendly,
                toss_record: Some(TossRecord {
                    bat_first_wins: 7,
                    bat_first_total: 10,
                    chase_wins: 1,
                    chase_total: 4,
                }),
            },
        },
        VenueRecord {
            id: VenueId(2),
            stats: VenueStats {
                name: "St George's Park".into(),
                avg_first_innings_score: 158.,
                pitch_type: PitchType::Neutral,
                toss_record: None,
            },
        },
    ];

    let fixtures = (1..=num_teams)
        .map(|team| Fixture {
            match_id: MatchId(team),
            home_team_id: TeamId(team),
            away_team_id: TeamId(team % num_teams + 1),
            venue_id: VenueId(team % 2 + 1),
        })
        .collect();

    let results = vec![
        CompletedMatch {
            match_id: None,
            home_team_id: TeamId(1),
            away_team_id: TeamId(2),
            winner_team_id: Some(TeamId(1)),
        },
        CompletedMatch {
            match_id: None,
            home_team_id: TeamId(2),
            away_team_id: TeamId(1),
            winner_team_id: Some(TeamId(1)),
        },
        CompletedMatch {
            match_id: None,
            home_team_id: TeamId(2),
            away_team_id: TeamId(1),
            winner_team_id: Some(TeamId(2)),
        },
        CompletedMatch {
            match_id: None,
            home_team_id: TeamId(1),
            away_team_id: TeamId(2),
            winner_team_id: None,
        },
    ];

    LeagueData {
        teams,
        venues,
        players,
        fixtures,
        results,
        projections,
    }
}

pub fn league(num_teams: u32) -> League {
    League::try_from(league_data(num_teams)).unwrap()
}
