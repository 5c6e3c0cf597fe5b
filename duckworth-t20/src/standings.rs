//! League table for one simulated season.

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::TeamId;

pub const POINTS_PER_WIN: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingsRow {
    pub team_id: TeamId,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub points: u32,
    pub win_rate: f64,
    /// 1-based.
    pub position: usize,
}
impl StandingsRow {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.wins + self.losses != self.played {
            anyhow::bail!("{}: wins and losses do not sum to matches played", self.team_id);
        }
        if self.points != self.wins * POINTS_PER_WIN {
            anyhow::bail!("{}: {} points from {} wins", self.team_id, self.points, self.wins);
        }
        if !(0. ..=1.).contains(&self.win_rate) {
            anyhow::bail!("{}: win rate {} out of range", self.team_id, self.win_rate);
        }
        if self.position == 0 {
            anyhow::bail!("{}: positions are 1-based", self.team_id);
        }
        Ok(())
    }
}

/// Tallies results by team index. Indices are the team's position in the slice of ids later
/// passed to [`StandingsCalculator::table`], which also fixes the order among fully tied teams.
#[derive(Debug, Clone)]
pub struct StandingsCalculator {
    played: Vec<u32>,
    wins: Vec<u32>,
}
impl StandingsCalculator {
    pub fn new(num_teams: usize) -> Self {
        Self {
            played: vec![0; num_teams],
            wins: vec![0; num_teams],
        }
    }

    pub fn record(&mut self, home: usize, away: usize, winner: usize) {
        debug_assert!(winner == home || winner == away);
        self.played[home] += 1;
        self.played[away] += 1;
        self.wins[winner] += 1;
    }

    pub fn total_wins(&self) -> u32 {
        self.wins.iter().sum()
    }

    /// Ranked table, together with the team index of each row.
    pub fn ranked(&self, team_ids: &[TeamId]) -> Vec<(usize, StandingsRow)> {
        assert_eq!(team_ids.len(), self.played.len(), "one id must be given for each team");
        let mut rows = team_ids
            .iter()
            .enumerate()
            .map(|(index, &team_id)| {
                let (played, wins) = (self.played[index], self.wins[index]);
                let win_rate = if played == 0 {
                    0.
                } else {
                    wins as f64 / played as f64
                };
                let row = StandingsRow {
                    team_id,
                    played,
                    wins,
                    losses: played - wins,
                    points: wins * POINTS_PER_WIN,
                    win_rate,
                    position: 0,
                };
                (index, row)
            })
            .collect::<Vec<_>>();
        rows.sort_by(|(_, a), (_, b)| match b.points.cmp(&a.points) {
            Ordering::Equal => b.win_rate.total_cmp(&a.win_rate),
            ordering => ordering,
        });
        for (position, (_, row)) in rows.iter_mut().enumerate() {
            row.position = position + 1;
        }
        rows
    }

    pub fn table(&self, team_ids: &[TeamId]) -> Vec<StandingsRow> {
        self.ranked(team_ids).into_iter().map(|(_, row)| row).collect()
    }
}
