//! The serialization contract between a model and a particle filter.

use station_core::Point2D;

use crate::agent::AgentStatus;

/// Snapshot of the filter-visible portion of a model.
///
/// All three vectors are index-aligned 1:1 with the model's agent vector
/// (agent-id order) and their lengths are invariant for a given
/// `population_total`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelState {
    pub agent_locations:   Vec<Point2D>,
    pub agent_statuses:    Vec<AgentStatus>,
    pub desired_locations: Vec<Point2D>,
}

impl ModelState {
    /// Number of agents described by this snapshot.
    #[inline]
    pub fn population(&self) -> usize {
        self.agent_locations.len()
    }
}
