//! The contract a simulation must satisfy to be filtered.

use crate::error::FilterResult;

/// One hypothesis of the hidden system state.
///
/// The filter never looks inside a particle; it only advances it, swaps
/// snapshots in and out through `State`, and jitters it after resampling.
pub trait Particle: Send {
    /// Snapshot type exchanged between particles and workers.
    type State: Clone + Send;

    /// `false` once the particle's simulation can make no further progress.
    fn is_active(&self) -> bool;

    fn state(&self) -> Self::State;

    /// Adopt a snapshot taken from another particle.
    fn set_state(&mut self, state: &Self::State) -> FilterResult<()>;

    /// Add Gaussian noise with the given standard deviation.
    fn perturb_state(&mut self, std: f32);

    /// Advance one tick.
    fn step(&mut self);

    /// Re-randomize internal generators before a prediction window, so
    /// particles sharing an ancestor diverge.  Deterministic particles can
    /// keep the default no-op.
    fn reseed(&mut self) {}
}
