//! Per-window tracking quality records.

use station_core::Point2D;
use station_filter::FilterStatistics;
use station_model::{AgentStatus, ModelState};

/// Records, at every window boundary, how the particle cloud relates to
/// the measured crowd.
///
/// Positions are summarized as the centroid of the active agents (the
/// agents active in the measured state define the mask for every
/// particle, so all centroids average the same agent subset).
#[derive(Debug, Default)]
pub struct TrackingStatistics {
    truth_centroids:    Vec<Point2D>,
    absolute_centroids: Vec<Point2D>,
    weighted_centroids: Vec<Point2D>,
    mean_errors:        Vec<f32>,
    active_counts:      Vec<usize>,
}

impl TrackingStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Measured-crowd centroid per window.
    #[inline]
    pub fn truth_centroids(&self) -> &[Point2D] {
        &self.truth_centroids
    }

    /// Unweighted mean of the particle centroids per window.
    #[inline]
    pub fn absolute_centroids(&self) -> &[Point2D] {
        &self.absolute_centroids
    }

    /// Weight-averaged particle centroid per window.
    #[inline]
    pub fn weighted_centroids(&self) -> &[Point2D] {
        &self.weighted_centroids
    }

    /// Distance between the weighted centroid and the truth centroid.
    #[inline]
    pub fn mean_errors(&self) -> &[f32] {
        &self.mean_errors
    }

    /// Number of measured-active agents per window.
    #[inline]
    pub fn active_counts(&self) -> &[usize] {
        &self.active_counts
    }

    #[inline]
    pub fn windows(&self) -> usize {
        self.mean_errors.len()
    }
}

impl FilterStatistics<ModelState> for TrackingStatistics {
    fn calculate_statistics(
        &mut self,
        measured: &ModelState,
        states: &[ModelState],
        weights: &[f32],
    ) {
        let active: Vec<usize> = measured
            .agent_statuses
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == AgentStatus::Active)
            .map(|(i, _)| i)
            .collect();

        let truth = centroid(&measured.agent_locations, &active);

        let mut absolute = Point2D::default();
        let mut weighted = Point2D::default();
        let mut weight_sum = 0.0f32;
        for (state, &weight) in states.iter().zip(weights) {
            let center = centroid(&state.agent_locations, &active);
            absolute.x += center.x;
            absolute.y += center.y;
            weighted.x += weight * center.x;
            weighted.y += weight * center.y;
            weight_sum += weight;
        }
        if !states.is_empty() {
            absolute.x /= states.len() as f32;
            absolute.y /= states.len() as f32;
        }
        if weight_sum > 0.0 {
            weighted.x /= weight_sum;
            weighted.y /= weight_sum;
        }

        self.mean_errors.push(weighted.distance(truth));
        self.truth_centroids.push(truth);
        self.absolute_centroids.push(absolute);
        self.weighted_centroids.push(weighted);
        self.active_counts.push(active.len());
    }
}

fn centroid(locations: &[Point2D], active: &[usize]) -> Point2D {
    if active.is_empty() {
        return Point2D::default();
    }
    let mut sum = Point2D::default();
    for &i in active {
        sum.x += locations[i].x;
        sum.y += locations[i].y;
    }
    Point2D::new(sum.x / active.len() as f32, sum.y / active.len() as f32)
}
