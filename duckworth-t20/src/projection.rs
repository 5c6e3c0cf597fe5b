//! Per-player projections, with a role-based heuristic for players the provider knows nothing about.

use tinyrand::Rand;
use tracing::debug;

use duckworth::random::gaussian;

use crate::domain::{Player, Projection, Role};
use crate::store::PlayerProjectionProvider;

const MIN_FALLBACK_RUNS: f64 = 6.;

/// Typical per-match (runs, wickets) for a player of the given role.
pub fn role_baseline(role: Role) -> (f64, f64) {
    match role {
        Role::Batsman => (32., 0.25),
        Role::WicketKeeper => (28., 0.2),
        Role::AllRounder => (24., 0.9),
        Role::Bowler => (16., 1.4),
        Role::Unspecified => (22., 0.6),
    }
}

/// A noisy projection from the role baseline, pulled toward the player's career averages where
/// those are known.
pub fn fallback_projection(player: &Player, rand: &mut impl Rand) -> Projection {
    let (mut base_runs, mut base_wickets) = role_baseline(player.role);
    if let Some(career) = &player.career {
        let avg_runs = career.runs_per_match();
        if avg_runs > 0. {
            base_runs = 0.55 * base_runs + 0.45 * avg_runs;
        }
        let avg_wickets = career.wickets_per_match();
        if avg_wickets > 0. {
            base_wickets = 0.5 * base_wickets + 0.5 * avg_wickets;
        }
    }
    let runs = gaussian(rand, base_runs, f64::max(4., base_runs * 0.25)).max(MIN_FALLBACK_RUNS);
    let wickets = gaussian(rand, base_wickets, f64::max(0.2, base_wickets * 0.3)).max(0.);
    Projection {
        predicted_runs: round_2dp(runs),
        predicted_wickets: round_2dp(wickets),
    }
}

/// The provider's projection for `player`; the heuristic if it has none; zeros if it failed.
pub fn resolve_projection(
    provider: &dyn PlayerProjectionProvider,
    player: &Player,
    rand: &mut impl Rand,
) -> Projection {
    match provider.predict(player.id) {
        Ok(Some(projection)) => projection,
        Ok(None) => fallback_projection(player, rand),
        Err(err) => {
            debug!("defaulting projection: {err}");
            Projection::default()
        }
    }
}

fn round_2dp(value: f64) -> f64 {
    (value * 100.).round() / 100.
}
