//! Descriptive statistics over sample slices.

pub trait SliceExt {
    fn sum(&self) -> f64;
    fn mean(&self) -> f64;
    fn variance(&self) -> f64;
    fn std_dev(&self) -> f64;
    fn min_value(&self) -> f64;
    fn max_value(&self) -> f64;
    fn percentile(&self, q: f64) -> f64;
    fn percentiles<const N: usize>(&self, qs: [f64; N]) -> [f64; N];
}

impl SliceExt for [f64] {
    fn sum(&self) -> f64 {
        self.iter().sum()
    }

    /// The arithmetic mean, or zero for an empty slice.
    fn mean(&self) -> f64 {
        if self.is_empty() {
            0.
        } else {
            self.sum() / self.len() as f64
        }
    }

    /// The population variance, or zero for an empty slice.
    fn variance(&self) -> f64 {
        if self.is_empty() {
            return 0.;
        }
        let mean = self.mean();
        self.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / self.len() as f64
    }

    fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    fn min_value(&self) -> f64 {
        if self.is_empty() {
            0.
        } else {
            self.iter().copied().fold(f64::INFINITY, f64::min)
        }
    }

    fn max_value(&self) -> f64 {
        if self.is_empty() {
            0.
        } else {
            self.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        }
    }

    /// The `q`-th percentile (`q` in `[0, 100]`), linearly interpolated between the two nearest
    /// ranks. Zero for an empty slice.
    fn percentile(&self, q: f64) -> f64 {
        self.percentiles([q])[0]
    }

    /// Several percentiles, sorting the samples only once.
    fn percentiles<const N: usize>(&self, qs: [f64; N]) -> [f64; N] {
        if self.is_empty() {
            return [0.; N];
        }
        let mut sorted = self.to_vec();
        sorted.sort_by(f64::total_cmp);
        qs.map(|q| interpolate(&sorted, q))
    }
}

fn interpolate(sorted: &[f64], q: f64) -> f64 {
    let rank = (q.clamp(0., 100.) / 100.) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
