//! Match-outcome and season forecasting for a T20 franchise league. A trained win-probability model
//! prices each fixture; complete, internally consistent scorecards are sampled from it; and whole
//! seasons, with their league table, playoff bracket and awards, are simulated many times over.

pub mod aggregate;
pub mod cancel;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod features;
pub mod lineup;
pub mod model;
pub mod playoffs;
pub mod print;
pub mod projection;
pub mod sampler;
pub mod season;
pub mod standings;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
