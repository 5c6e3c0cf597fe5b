use std::path::Path;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use duckworth::file::read_json;

use crate::error::{ConfigError, DataError};
use crate::sampler::DEFAULT_VENUE_AVG;
use crate::season::default_workers;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key of the competition in the team feature snapshot.
    pub competition: String,
    /// First-innings average assumed at venues without usable stats.
    pub default_venue_avg: f64,
    pub num_simulations: usize,
    /// Size of the simulation worker pool; all available cores if unset.
    pub workers: Option<usize>,
    /// Master seed for runs that do not supply their own; a fresh seed each run if unset.
    pub seed: Option<u64>,
}
impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        Ok(read_json(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.competition.trim().is_empty() {
            return Err(anyhow!("competition cannot be blank").into());
        }
        if !self.default_venue_avg.is_finite() || self.default_venue_avg <= 0. {
            return Err(anyhow!(
                "default venue average ({}) must be a positive number",
                self.default_venue_avg
            )
            .into());
        }
        if self.num_simulations == 0 {
            return Err(ConfigError::NoSimulations);
        }
        if self.workers == Some(0) {
            return Err(anyhow!("worker pool cannot be empty").into());
        }
        Ok(())
    }

    pub fn workers(&self) -> usize {
        self.workers.unwrap_or_else(default_workers)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            competition: "sa20".into(),
            default_venue_avg: DEFAULT_VENUE_AVG,
            num_simulations: 1_000,
            workers: None,
            seed: None,
        }
    }
}
