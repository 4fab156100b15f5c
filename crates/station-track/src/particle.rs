//! `Particle` adapter for the station model.

use station_filter::{FilterError, FilterResult, Particle};
use station_model::{Model, ModelState};

/// A station model acting as one particle.
///
/// Newtype rather than a direct impl so neither the model nor the filter
/// crate needs to know about the other.
pub struct ModelParticle {
    model: Model,
}

impl ModelParticle {
    pub fn new(model: Model) -> Self {
        ModelParticle { model }
    }

    #[inline]
    pub fn model(&self) -> &Model {
        &self.model
    }

    #[inline]
    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }
}

impl Particle for ModelParticle {
    type State = ModelState;

    /// A model can progress while it is running and agents remain in
    /// transit.  A fully evacuated model keeps `ModelStatus::Active`, so
    /// both conditions are checked.
    fn is_active(&self) -> bool {
        self.model.is_active() && !self.model.simulation_finished()
    }

    fn state(&self) -> ModelState {
        self.model.state()
    }

    fn set_state(&mut self, state: &ModelState) -> FilterResult<()> {
        self.model
            .set_state(state)
            .map_err(|e| FilterError::State(e.to_string()))
    }

    fn perturb_state(&mut self, std: f32) {
        self.model.perturb_state(std);
    }

    fn step(&mut self) {
        self.model.step();
    }

    fn reseed(&mut self) {
        self.model.reseed_rng();
    }
}
