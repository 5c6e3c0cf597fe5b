//! Starting-XI selection and batting order for a single-match prediction.

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::{CareerStats, Player, PlayerId, Projection, Role};

pub const XI: usize = 11;
const ALL_ROUNDERS: usize = 2;
const SPECIALIST_BATSMEN: usize = 5;

/// A squad member with their projection for the match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub player_id: PlayerId,
    pub name: String,
    pub role: Role,
    pub predicted_runs: f64,
    pub predicted_wickets: f64,
    #[serde(skip)]
    pub career: CareerStats,
}
impl Selection {
    pub fn new(player: &Player, projection: Projection) -> Self {
        Self {
            player_id: player.id,
            name: player.name.clone(),
            role: player.role,
            predicted_runs: projection.predicted_runs,
            predicted_wickets: projection.predicted_wickets,
            career: player.career.unwrap_or_default(),
        }
    }

    /// Composite match impact, with a wicket worth 20 runs.
    pub fn impact(&self) -> f64 {
        self.predicted_runs + 20. * self.predicted_wickets
    }

    fn keeper_score(&self) -> f64 {
        let c = &self.career;
        c.batting_average * 1.5
            + c.strike_rate * 0.01
            + self.predicted_runs * 0.8
            + c.matches_played as f64 * 0.1
    }

    fn all_rounder_score(&self) -> f64 {
        let c = &self.career;
        self.predicted_runs * 0.6
            + self.predicted_wickets * 20.
            + c.batting_average * 0.5
            + positive_or_zero(c.bowling_average) * -0.3
    }

    fn batsman_score(&self) -> f64 {
        let c = &self.career;
        c.batting_average * 1.2
            + c.strike_rate * 0.015
            + self.predicted_runs * 0.7
            + c.matches_played as f64 * 0.05
    }

    fn bowler_score(&self) -> f64 {
        let c = &self.career;
        let economy = if c.economy_rate > 0. {
            (10. - c.economy_rate) * 2.
        } else {
            0.
        };
        self.predicted_wickets * 25.
            + economy
            + positive_or_zero(c.bowling_average) * -0.5
            + c.matches_played as f64 * 0.1
    }

    fn general_score(&self) -> f64 {
        let c = &self.career;
        self.predicted_runs * 0.5
            + self.predicted_wickets * 15.
            + c.batting_average * 0.8
            + c.matches_played as f64 * 0.1
    }

    fn batting_order_score(&self) -> f64 {
        let c = &self.career;
        match self.role {
            Role::Batsman | Role::WicketKeeper => {
                c.batting_average * 1.8 + c.strike_rate * 0.025 + self.predicted_runs + 100.
            }
            Role::AllRounder => {
                c.batting_average + c.strike_rate * 0.015 + self.predicted_runs * 0.6 + 30.
            }
            Role::Bowler | Role::Unspecified => {
                c.batting_average * 0.5 + self.predicted_runs * 0.3
            }
        }
    }
}

fn positive_or_zero(value: f64) -> f64 {
    value.max(0.)
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Picks a balanced XI from `squad`: one keeper (the best batsman stands in if there is none), up
/// to two all-rounders, up to five batsmen, then bowlers, then the best of whoever is left. The
/// result is in batting order.
pub fn select_balanced_xi(squad: &[Selection]) -> Vec<Selection> {
    let mut chosen = vec![false; squad.len()];
    let mut order = Vec::with_capacity(XI);

    let by_role = |role: Role| -> Vec<usize> {
        (0..squad.len())
            .filter(|&index| squad[index].role == role)
            .collect()
    };
    let take = |mut candidates: Vec<usize>,
                    score: fn(&Selection) -> f64,
                    limit: usize,
                    chosen: &mut [bool],
                    order: &mut Vec<usize>| {
        candidates.retain(|&index| !chosen[index]);
        candidates.sort_by(|&a, &b| descending(score(&squad[a]), score(&squad[b])));
        for index in candidates.into_iter().take(limit) {
            chosen[index] = true;
            order.push(index);
        }
    };

    let keepers = by_role(Role::WicketKeeper);
    let keeper_pool = if keepers.is_empty() {
        by_role(Role::Batsman)
    } else {
        keepers
    };
    take(keeper_pool, Selection::keeper_score, 1, &mut chosen, &mut order);
    take(
        by_role(Role::AllRounder),
        Selection::all_rounder_score,
        ALL_ROUNDERS,
        &mut chosen,
        &mut order,
    );
    take(
        by_role(Role::Batsman),
        Selection::batsman_score,
        SPECIALIST_BATSMEN,
        &mut chosen,
        &mut order,
    );
    let remaining = XI.saturating_sub(order.len());
    take(
        by_role(Role::Bowler),
        Selection::bowler_score,
        remaining,
        &mut chosen,
        &mut order,
    );
    let remaining = XI.saturating_sub(order.len());
    take(
        (0..squad.len()).collect(),
        Selection::general_score,
        remaining,
        &mut chosen,
        &mut order,
    );

    let mut xi = order
        .into_iter()
        .map(|index| squad[index].clone())
        .collect::<Vec<_>>();
    sort_batting_order(&mut xi);
    xi.truncate(XI);
    xi
}

/// Top order first, then all-rounders, then bowlers; stable within equal scores.
pub fn sort_batting_order(xi: &mut [Selection]) {
    xi.sort_by(|a, b| descending(a.batting_order_score(), b.batting_order_score()));
}

/// The player with the greatest [`Selection::impact`]; the first such in `players` on ties.
pub fn man_of_the_match<'a>(players: impl IntoIterator<Item = &'a Selection>) -> Option<&'a Selection> {
    let mut best: Option<&Selection> = None;
    for player in players {
        if best.map_or(true, |best| player.impact() > best.impact()) {
            best = Some(player);
        }
    }
    best
}
