use crate::season::SimulatedSeason;

const FINALISTS: usize = 2;
const PLAYOFF_TEAMS: usize = 4;

/// Per-team and per-player tallies over a run of simulated seasons. Teams and players are
/// addressed by their indices in the season tables. Sample vectors hold one entry per simulation,
/// in simulation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationAccumulator {
    pub simulations: usize,
    pub playoffs: Vec<u32>,
    pub finals: Vec<u32>,
    pub championships: Vec<u32>,
    pub positions: Vec<Vec<f64>>,
    pub points: Vec<Vec<f64>>,
    pub wins: Vec<Vec<f64>>,
    pub player_runs: Vec<Vec<f64>>,
    pub player_wickets: Vec<Vec<f64>>,
}
impl SimulationAccumulator {
    pub fn new(num_teams: usize, num_players: usize) -> Self {
        Self {
            simulations: 0,
            playoffs: vec![0; num_teams],
            finals: vec![0; num_teams],
            championships: vec![0; num_teams],
            positions: vec![vec![]; num_teams],
            points: vec![vec![]; num_teams],
            wins: vec![vec![]; num_teams],
            player_runs: vec![vec![]; num_players],
            player_wickets: vec![vec![]; num_players],
        }
    }

    pub fn num_teams(&self) -> usize {
        self.playoffs.len()
    }

    pub fn num_players(&self) -> usize {
        self.player_runs.len()
    }

    pub fn record(&mut self, season: &SimulatedSeason, champion: Option<usize>) {
        self.simulations += 1;
        for (rank, (team, row)) in season.standings.iter().enumerate() {
            if rank < PLAYOFF_TEAMS {
                self.playoffs[*team] += 1;
            }
            if rank < FINALISTS {
                self.finals[*team] += 1;
            }
            self.positions[*team].push(row.position as f64);
            self.points[*team].push(row.points as f64);
            self.wins[*team].push(row.wins as f64);
        }
        if let Some(champion) = champion {
            self.championships[champion] += 1;
        }
        for (samples, &total) in self.player_runs.iter_mut().zip(&season.player_runs) {
            samples.push(total);
        }
        for (samples, &total) in self.player_wickets.iter_mut().zip(&season.player_wickets) {
            samples.push(total);
        }
    }

    /// Folds in the tallies of `other`, whose simulations follow this one's.
    pub fn merge(&mut self, other: SimulationAccumulator) {
        self.simulations += other.simulations;
        add_counts(&mut self.playoffs, &other.playoffs);
        add_counts(&mut self.finals, &other.finals);
        add_counts(&mut self.championships, &other.championships);
        append_samples(&mut self.positions, other.positions);
        append_samples(&mut self.points, other.points);
        append_samples(&mut self.wins, other.wins);
        append_samples(&mut self.player_runs, other.player_runs);
        append_samples(&mut self.player_wickets, other.player_wickets);
    }
}

fn add_counts(counts: &mut [u32], other: &[u32]) {
    assert_eq!(counts.len(), other.len(), "accumulators differ in shape");
    for (count, other) in counts.iter_mut().zip(other) {
        *count += other;
    }
}

fn append_samples(samples: &mut [Vec<f64>], other: Vec<Vec<f64>>) {
    assert_eq!(samples.len(), other.len(), "accumulators differ in shape");
    for (samples, mut other) in samples.iter_mut().zip(other) {
        samples.append(&mut other);
    }
}
