//! The four-team playoff: two qualifiers, an eliminator and a final. Every tie is a coin flip.

use serde::Serialize;
use strum_macros::{Display, EnumIter};
use tinyrand::Rand;

use duckworth::random::bernoulli;

use crate::domain::TeamId;

pub const QUALIFIERS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[strum(serialize = "Qualifier 1")]
    Qualifier1,
    Eliminator,
    #[strum(serialize = "Qualifier 2")]
    Qualifier2,
    Final,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tie {
    pub stage: Stage,
    pub first: TeamId,
    pub second: TeamId,
    pub winner: TeamId,
}
impl Tie {
    fn play(stage: Stage, first: TeamId, second: TeamId, rand: &mut impl Rand) -> Self {
        let winner = if bernoulli(rand, 0.5) { first } else { second };
        Self {
            stage,
            first,
            second,
            winner,
        }
    }

    pub fn loser(&self) -> TeamId {
        if self.winner == self.first {
            self.second
        } else {
            self.first
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayoffBracket {
    /// In the order played; empty if there were too few qualifiers for a bracket.
    pub ties: Vec<Tie>,
    pub champion: Option<TeamId>,
}

/// Plays out the bracket over `seeds`, ordered by league position. With fewer than
/// [`QUALIFIERS`] seeds the top seed is champion by default; with none there is no champion.
/// Seeds past the fourth are ignored.
pub fn resolve_playoffs(seeds: &[TeamId], rand: &mut impl Rand) -> PlayoffBracket {
    if seeds.len() < QUALIFIERS {
        return PlayoffBracket {
            ties: vec![],
            champion: seeds.first().copied(),
        };
    }
    let qualifier_1 = Tie::play(Stage::Qualifier1, seeds[0], seeds[1], rand);
    let eliminator = Tie::play(Stage::Eliminator, seeds[2], seeds[3], rand);
    let qualifier_2 = Tie::play(Stage::Qualifier2, qualifier_1.loser(), eliminator.winner, rand);
    let final_ = Tie::play(Stage::Final, qualifier_1.winner, qualifier_2.winner, rand);
    let champion = Some(final_.winner);
    PlayoffBracket {
        ties: vec![qualifier_1, eliminator, qualifier_2, final_],
        champion,
    }
}
