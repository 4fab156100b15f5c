//! Collaborator traits the filter engine consumes.
//!
//! The engine is generic over where observations come from
//! ([`DataFeed`]), how the particle population is built
//! ([`ParticlesInitialiser`]), how a particle is scored against an
//! observation ([`ParticleFit`]), and what gets recorded at each window
//! boundary ([`FilterStatistics`]).

use crate::error::FilterResult;
use crate::particle::Particle;

/// Source of ground-truth observations, advanced in lockstep with the
/// particle population.
pub trait DataFeed<S> {
    /// Advance the underlying truth by one tick.
    fn progress_feed(&mut self);

    /// Current measured state.
    fn state(&self) -> S;

    /// Optional end-of-run report from the feed's side.
    fn print_statistics(&self) {}
}

/// Builds a worker's local slice of the particle population.
pub trait ParticlesInitialiser<P: Particle> {
    /// Produce `count` particles filling global slots
    /// `offset .. offset + count`.
    fn initialise_particles(&self, count: usize, offset: usize) -> FilterResult<Vec<P>>;
}

/// Scores a particle against a measured state.
///
/// Lower is better; `0.0` is an exact match.  `Sync` because fits are
/// computed across particles in parallel.
pub trait ParticleFit<P: Particle>: Sync {
    fn fit(&self, particle: &P, measured: &P::State) -> f32;
}

/// Observer invoked at every window boundary, before reweighting, with the
/// particle snapshots and the weights carried into the window.
pub trait FilterStatistics<S> {
    fn calculate_statistics(&mut self, measured: &S, states: &[S], weights: &[f32]);
}

/// Statistics sink that records nothing.
pub struct NoopStatistics;

impl<S> FilterStatistics<S> for NoopStatistics {
    fn calculate_statistics(&mut self, _measured: &S, _states: &[S], _weights: &[f32]) {}
}
