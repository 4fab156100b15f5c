//! Low-variance systematic resampling.

use station_core::ModelRng;

/// Select ancestor indices proportionally to `weights`.
///
/// One uniform draw `u1 ~ U(0, 1/N)` seeds N evenly spaced sample points
/// `u1 + k/N`; each point selects the first index whose cumulative weight
/// meets or exceeds it.  The single shared draw is what keeps the variance
/// of the selection low compared to multinomial resampling, and the
/// first-index tie-break is fixed so a given seed always reproduces the
/// same ancestry.
pub fn systematic_resample(weights: &[f32], rng: &mut ModelRng) -> Vec<usize> {
    let n = weights.len();
    if n == 0 {
        return Vec::new();
    }

    let mut cumulative = Vec::with_capacity(n);
    let mut acc = 0.0f64;
    for &w in weights {
        acc += w as f64;
        cumulative.push(acc);
    }

    let u1: f64 = rng.gen_range(0.0..1.0 / n as f64);

    let mut ancestors = Vec::with_capacity(n);
    let mut index = 0;
    for k in 0..n {
        let point = u1 + k as f64 / n as f64;
        while index + 1 < n && cumulative[index] < point {
            index += 1;
        }
        ancestors.push(index);
    }
    ancestors
}
