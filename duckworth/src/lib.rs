//! Numeric building blocks for Monte Carlo sports simulation: seedable sampling primitives,
//! slice statistics, ordinal-keyed linear and logistic predictors, and the small amount of file
//! plumbing needed to feed them.

pub mod csv;
pub mod file;
pub mod hash_lookup;
pub mod linear;
pub mod random;
pub mod stats;
pub mod timed;

#[doc = include_str!("../../README.md")]
#[cfg(doc)]
fn readme() {}
