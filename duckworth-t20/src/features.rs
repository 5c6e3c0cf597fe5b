//! Construction of the model input vector for a single fixture.

use std::ops::Index;

use ordinalizer::Ordinal;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

use duckworth::linear::AsIndex;

use crate::domain::{HeadToHead, TeamFeatureRow};

/// Model inputs, in model input order. The snake_case names are those used by model artifacts.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Ordinal,
    EnumCount,
    EnumIter,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    TeamWinPct,
    OppWinPct,
    DeltaWinPct,
    TeamRunRate,
    OppRunRate,
    DeltaRunRate,
    TeamNetRunRate,
    OppNetRunRate,
    DeltaNetRunRate,
    TeamAvgRunsFor,
    OppAvgRunsFor,
    DeltaAvgRunsFor,
    TeamAvgRunsAgainst,
    OppAvgRunsAgainst,
    DeltaAvgRunsAgainst,
    TeamMatches,
    OppMatches,
    DeltaMatches,
    VenueAvgScore,
    HomeLineupOverride,
    AwayLineupOverride,
    #[strum(serialize = "h2h_total_matches")]
    #[serde(rename = "h2h_total_matches")]
    H2hTotalMatches,
    #[strum(serialize = "h2h_home_wins")]
    #[serde(rename = "h2h_home_wins")]
    H2hHomeWins,
    #[strum(serialize = "h2h_away_wins")]
    #[serde(rename = "h2h_away_wins")]
    H2hAwayWins,
    #[strum(serialize = "h2h_home_win_pct")]
    #[serde(rename = "h2h_home_win_pct")]
    H2hHomeWinPct,
    #[strum(serialize = "h2h_delta_win_pct")]
    #[serde(rename = "h2h_delta_win_pct")]
    H2hDeltaWinPct,
}

impl AsIndex for Feature {
    fn as_index(&self) -> usize {
        self.ordinal()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector([f64; Feature::COUNT]);
impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::iter().map(|feature| (feature, self[feature]))
    }
}

impl Index<Feature> for FeatureVector {
    type Output = f64;

    fn index(&self, feature: Feature) -> &Self::Output {
        &self.0[feature.ordinal()]
    }
}

/// Assembles a [`FeatureVector`] from whatever is known about a fixture. Anything not supplied is
/// treated as zero, except the head-to-head win share, which is even when the teams have not met.
#[derive(Debug, Clone, Default)]
pub struct FeatureVectorBuilder {
    home: TeamFeatureRow,
    away: TeamFeatureRow,
    venue_avg_score: f64,
    head_to_head: HeadToHead,
    home_lineup_override: usize,
    away_lineup_override: usize,
}
impl FeatureVectorBuilder {
    pub fn with_home(mut self, row: Option<&TeamFeatureRow>) -> Self {
        self.home = row.copied().unwrap_or_default();
        self
    }

    pub fn with_away(mut self, row: Option<&TeamFeatureRow>) -> Self {
        self.away = row.copied().unwrap_or_default();
        self
    }

    pub fn with_venue_avg_score(mut self, venue_avg_score: f64) -> Self {
        self.venue_avg_score = venue_avg_score;
        self
    }

    pub fn with_head_to_head(mut self, head_to_head: Option<HeadToHead>) -> Self {
        self.head_to_head = head_to_head.unwrap_or_default();
        self
    }

    /// Records the sizes of caller-supplied starting lineups, if any.
    pub fn with_lineup_overrides(mut self, home: Option<usize>, away: Option<usize>) -> Self {
        self.home_lineup_override = home.unwrap_or_default();
        self.away_lineup_override = away.unwrap_or_default();
        self
    }

    pub fn build(&self) -> FeatureVector {
        let mut values = [0.; Feature::COUNT];
        let mut set = |feature: Feature, value: f64| {
            values[feature.ordinal()] = finite(value);
        };
        let mut set_triple = |team: Feature, opp: Feature, delta: Feature, home: f64, away: f64| {
            let (home, away) = (finite(home), finite(away));
            set(team, home);
            set(opp, away);
            set(delta, home - away);
        };
        let (home, away) = (&self.home, &self.away);
        set_triple(
            Feature::TeamWinPct,
            Feature::OppWinPct,
            Feature::DeltaWinPct,
            home.win_pct,
            away.win_pct,
        );
        set_triple(
            Feature::TeamRunRate,
            Feature::OppRunRate,
            Feature::DeltaRunRate,
            home.run_rate,
            away.run_rate,
        );
        set_triple(
            Feature::TeamNetRunRate,
            Feature::OppNetRunRate,
            Feature::DeltaNetRunRate,
            home.net_run_rate,
            away.net_run_rate,
        );
        set_triple(
            Feature::TeamAvgRunsFor,
            Feature::OppAvgRunsFor,
            Feature::DeltaAvgRunsFor,
            home.avg_runs_for,
            away.avg_runs_for,
        );
        set_triple(
            Feature::TeamAvgRunsAgainst,
            Feature::OppAvgRunsAgainst,
            Feature::DeltaAvgRunsAgainst,
            home.avg_runs_against,
            away.avg_runs_against,
        );
        set_triple(
            Feature::TeamMatches,
            Feature::OppMatches,
            Feature::DeltaMatches,
            home.matches_played,
            away.matches_played,
        );

        let mut set = |feature: Feature, value: f64| {
            values[feature.ordinal()] = finite(value);
        };
        set(Feature::VenueAvgScore, self.venue_avg_score);
        set(Feature::HomeLineupOverride, self.home_lineup_override as f64);
        set(Feature::AwayLineupOverride, self.away_lineup_override as f64);

        let h2h = &self.head_to_head;
        let home_win_pct = h2h.home_win_pct();
        set(Feature::H2hTotalMatches, h2h.total_matches as f64);
        set(Feature::H2hHomeWins, h2h.home_wins as f64);
        set(Feature::H2hAwayWins, h2h.away_wins as f64);
        set(Feature::H2hHomeWinPct, home_win_pct);
        set(Feature::H2hDeltaWinPct, home_win_pct - 0.5);

        FeatureVector(values)
    }
}

fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.
    }
}
