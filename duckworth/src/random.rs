//! Sampling primitives over a [`Rand`] source, and derivation of independent sub-seeds so that
//! parallel simulations remain reproducible regardless of how work is split among threads.

use std::f64::consts::PI;

use tinyrand::{Rand, Seeded, StdRand};
use tinyrand_std::ClockSeed;

/// A uniformly distributed value in `[0, 1)`.
#[inline]
pub fn random_f64(rand: &mut impl Rand) -> f64 {
    (rand.next_u64() >> 11) as f64 * (1. / (1_u64 << 53) as f64)
}

/// `true` with probability `p`. Probabilities outside `[0, 1]` saturate.
#[inline]
pub fn bernoulli(rand: &mut impl Rand, p: f64) -> bool {
    random_f64(rand) < p
}

/// A uniformly distributed integer in the closed range `[lo, hi]`. Returns `lo` if the range is
/// empty.
#[inline]
pub fn uniform_inclusive(rand: &mut impl Rand, lo: u32, hi: u32) -> u32 {
    if hi <= lo {
        return lo;
    }
    lo + rand.next_lim_u32(hi - lo + 1)
}

/// A normally distributed value, by the Box–Muller transform. A non-positive `std_dev` yields the
/// `mean` exactly.
pub fn gaussian(rand: &mut impl Rand, mean: f64, std_dev: f64) -> f64 {
    if std_dev <= 0. || !std_dev.is_finite() {
        return mean;
    }
    let u1 = 1. - random_f64(rand);
    let u2 = random_f64(rand);
    let z = (-2. * u1.ln()).sqrt() * (2. * PI * u2).cos();
    mean + std_dev * z
}

/// Picks one of `values` with probability proportional to its weight in `weights`.
///
/// # Panics
/// If `values` is empty or the two slices differ in length.
pub fn weighted<T: Copy>(rand: &mut impl Rand, values: &[T], weights: &[f64]) -> T {
    assert!(!values.is_empty(), "no values to choose from");
    assert_eq!(values.len(), weights.len(), "one weight must be given for each value");
    let total: f64 = weights.iter().sum();
    let random = random_f64(rand) * total;
    let mut cumulative = 0.;
    for (index, &weight) in weights.iter().enumerate() {
        cumulative += weight;
        if random < cumulative {
            return values[index];
        }
    }
    values[values.len() - 1]
}

/// The SplitMix64 finaliser. Consecutive inputs map to uncorrelated outputs.
#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Derives the seed of an independent stream, identified by `stream`, from a `master` seed.
#[inline]
pub fn sub_seed(master: u64, stream: u64) -> u64 {
    splitmix64(master ^ splitmix64(stream))
}

/// A generator seeded with `seed`.
pub fn seeded(seed: u64) -> StdRand {
    StdRand::seed(seed)
}

/// A seed drawn from the system clock, for runs that have not asked for reproducibility.
pub fn entropy_seed() -> u64 {
    ClockSeed::default().next_u64()
}
