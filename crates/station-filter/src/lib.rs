//! `station-filter` — a generic sequential Monte Carlo particle filter.
//!
//! The engine knows nothing about crowds or concourses: anything
//! implementing [`Particle`] can be filtered against any [`DataFeed`] of
//! observations, scored by any [`ParticleFit`].
//!
//! # Window loop
//!
//! ```text
//! while steps_run < total_steps:
//!   ① predict — advance the feed and every local particle by one window
//!      (or one tick when multi_step is off)
//!   ② at each resample_window boundary:
//!      statistics ▸ reweight (global normalization) ▸ systematic
//!      resample (coordinator draws, all workers swap state) ▸ perturb
//! ```
//!
//! # Workers
//!
//! The particle population is statically partitioned across workers
//! behind the [`WorkerComm`] trait.  [`SingleWorker`] covers the common
//! single-process case; [`channel_workers`] builds an in-process mesh for
//! multi-worker runs and tests.  Communication happens only at resample
//! time.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Runs predict, reweight, and perturb on Rayon's thread pool. |

pub mod comm;
pub mod error;
pub mod filter;
pub mod particle;
pub mod resample;
pub mod traits;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use comm::{ChannelWorker, SingleWorker, WorkerComm, channel_workers};
pub use error::{FilterError, FilterResult};
pub use filter::{FilterConfig, ParticleFilter};
pub use particle::Particle;
pub use resample::systematic_resample;
pub use traits::{DataFeed, FilterStatistics, NoopStatistics, ParticleFit, ParticlesInitialiser};
