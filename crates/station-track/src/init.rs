//! Builds the particle population from a base model.

use station_filter::{FilterResult, ParticlesInitialiser};
use station_model::Model;

use crate::particle::ModelParticle;

/// Replicates a base model into particles.
///
/// Every replica starts from the base model's exact state;
/// [`Model::duplicate`] gives each one an independent generator so the
/// replicas diverge from the first prediction window.
pub struct ModelParticlesInitialiser {
    base: Model,
}

impl ModelParticlesInitialiser {
    pub fn new(base: Model) -> Self {
        ModelParticlesInitialiser { base }
    }
}

impl ParticlesInitialiser<ModelParticle> for ModelParticlesInitialiser {
    fn initialise_particles(
        &self,
        count: usize,
        offset: usize,
    ) -> FilterResult<Vec<ModelParticle>> {
        Ok((0..count)
            .map(|i| ModelParticle::new(self.base.duplicate(offset + i)))
            .collect())
    }
}
