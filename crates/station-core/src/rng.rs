//! Deterministic per-model RNG wrapper.
//!
//! # Ownership strategy
//!
//! Every `Model` owns exactly one `ModelRng`; its agents never hold their
//! own generator and instead receive `&mut ModelRng` through their step
//! calls.  This keeps a model and all of its agents on a single stream
//! (reproducible runs for a fixed seed) with no shared-pointer aliasing.
//!
//! Two operations create new streams:
//!
//! - [`ModelRng::child`] derives a deterministic sub-stream (golden-ratio
//!   seed mixing so nearby offsets land far apart in seed space);
//! - [`ModelRng::from_entropy`] draws a fresh OS-seeded stream, used when a
//!   particle filter reseeds cloned models so replicas diverge.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::Distribution;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// The single pseudo-random stream shared by a model and its agents.
pub struct ModelRng(SmallRng);

impl ModelRng {
    /// Seed deterministically.
    pub fn new(seed: u64) -> Self {
        ModelRng(SmallRng::seed_from_u64(seed))
    }

    /// A fresh, independently seeded stream (OS entropy).
    pub fn from_entropy() -> Self {
        ModelRng(SmallRng::from_entropy())
    }

    /// Derive a child stream with a deterministic seed offset — useful for
    /// seeding replica models from one root seed.
    pub fn child(&mut self, offset: u64) -> ModelRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        ModelRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` adaptor types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Sample from any `rand_distr` distribution.
    #[inline]
    pub fn sample<T, D: Distribution<T>>(&mut self, distribution: &D) -> T {
        distribution.sample(&mut self.0)
    }
}
