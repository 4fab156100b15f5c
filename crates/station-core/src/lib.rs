//! `station-core` — foundational types for the station crowd simulator.
//!
//! This crate is a dependency of every other `station-*` crate.  It
//! intentionally has no `station-*` dependencies and minimal external ones
//! (only `rand`/`rand_distr`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                |
//! |--------------|---------------------------------------------------------|
//! | [`geometry`] | `Point2D`, point-in-polygon test, bounding-box clipping |
//! | [`spacing`]  | evenly-spaced and linearly-spaced value sequences       |
//! | [`rng`]      | `ModelRng` — the per-model deterministic generator      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod geometry;
pub mod rng;
pub mod spacing;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geometry::{Point2D, clip_to_bounds, is_outside_polygon};
pub use rng::ModelRng;
pub use spacing::{evenly_spaced_values_within_interval, linear_spaced_vector};
