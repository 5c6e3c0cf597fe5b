//! Timing of computations.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct Timed<V> {
    pub value: V,
    pub elapsed: Duration,
}
impl<V> Timed<V> {
    pub fn result<E>(f: impl FnOnce() -> Result<V, E>) -> Result<Timed<V>, E> {
        let start_time = Instant::now();
        f().map(|value| Timed {
            value,
            elapsed: start_time.elapsed(),
        })
    }

    /// Throughput in units per second, given the number of units of work that `value` represents.
    pub fn rate(&self, units: usize) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0. {
            units as f64 / secs
        } else {
            0.
        }
    }
}
