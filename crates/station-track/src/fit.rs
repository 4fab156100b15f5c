//! Distance between a particle's crowd and the measured crowd.

use station_filter::ParticleFit;
use station_model::{AgentStatus, ModelState};

use crate::particle::ModelParticle;

/// Euclidean distance over the agents active in the measured state.
///
/// Agents the measurement has not seen enter (or has seen leave) carry no
/// position information, so only measured-active agents contribute.  A
/// population mismatch scores infinitely bad rather than panicking; the
/// reweight map turns that into a zero weight.
pub struct AgentLocationFit;

impl ParticleFit<ModelParticle> for AgentLocationFit {
    fn fit(&self, particle: &ModelParticle, measured: &ModelState) -> f32 {
        let agents = particle.model().agents();
        if agents.len() != measured.population()
            || measured.agent_statuses.len() != measured.population()
        {
            return f32::INFINITY;
        }

        let mut sum_squares = 0.0f32;
        for (agent, (location, status)) in agents.iter().zip(
            measured
                .agent_locations
                .iter()
                .zip(&measured.agent_statuses),
        ) {
            if *status == AgentStatus::Active {
                let d = agent.location().distance(*location);
                sum_squares += d * d;
            }
        }
        sum_squares.sqrt()
    }
}
