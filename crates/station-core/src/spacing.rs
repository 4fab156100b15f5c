//! Evenly- and linearly-spaced value sequences.
//!
//! These are the two spacing helpers the model construction relies on:
//! agent deceleration grids (`evenly_spaced_values_within_interval`) and
//! gate placement along a wall (`linear_spaced_vector`).

/// Values from `start` toward `stop` (exclusive) in increments of `step`.
///
/// Mirrors `numpy.arange` semantics for the cases the simulator uses:
/// `step` may be negative to count downward.  If the sign of `step` cannot
/// reach `stop` from `start` the result is empty rather than looping
/// forever.
pub fn evenly_spaced_values_within_interval(start: f32, stop: f32, step: f32) -> Vec<f32> {
    let mut result = Vec::new();
    let mut value = start;

    if start < stop {
        if step <= 0.0 {
            return result;
        }
        while value < stop {
            result.push(value);
            value += step;
        }
    } else {
        if step >= 0.0 {
            return result;
        }
        while value > stop {
            result.push(value);
            value += step;
        }
    }

    result
}

/// `points` values spaced uniformly over `[start, end]`, endpoints included.
///
/// Returns empty for `points <= 0` and `[start]` for a single point (the
/// uniform spacing is undefined there).
pub fn linear_spaced_vector(start: f32, end: f32, points: i32) -> Vec<f32> {
    if points <= 0 {
        return Vec::new();
    }
    if points == 1 {
        return vec![start];
    }

    let delta = (end - start) / (points - 1) as f32;
    (0..points).map(|i| start + i as f32 * delta).collect()
}
