//! `station-track` — binds the station model to the particle filter.
//!
//! The filter engine is generic; this crate supplies the concrete
//! collaborators for crowd tracking:
//!
//! | Type                        | Filter seam                  |
//! |-----------------------------|------------------------------|
//! | [`ModelParticle`]           | `Particle` (wraps a `Model`) |
//! | [`SyntheticDataFeed`]       | `DataFeed<ModelState>`       |
//! | [`ModelParticlesInitialiser`] | `ParticlesInitialiser`     |
//! | [`AgentLocationFit`]        | `ParticleFit`                |
//! | [`TrackingStatistics`]      | `FilterStatistics`           |

pub mod feed;
pub mod fit;
pub mod init;
pub mod particle;
pub mod stats;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use feed::SyntheticDataFeed;
pub use fit::AgentLocationFit;
pub use init::ModelParticlesInitialiser;
pub use particle::ModelParticle;
pub use stats::TrackingStatistics;
