//! `station-model` — the station crowd simulation.
//!
//! A rectangular concourse with entrance gates on the left wall and exit
//! gates on the right.  Pedestrians enter through a random entrance gate,
//! walk toward a random exit gate, and decelerate or sidestep ("wiggle")
//! when other pedestrians block the way.
//!
//! # Tick loop
//!
//! ```text
//! Model::step():
//!   ① progress print (every 100 steps, when do_print)
//!   ② move_agents — each agent's state machine in agent-id order;
//!      collision checks read the live positions of all other agents,
//!      including those already moved this tick
//!   ③ history snapshot of all agent locations (when do_history)
//!   ④ step_id += 1
//! ```
//!
//! Agent updates are deliberately sequential: the same-tick read-after-write
//! dependency between neighbouring agents is part of the model definition.
//!
//! # State extraction
//!
//! [`Model::state`] / [`Model::set_state`] expose the agent locations,
//! statuses, and desired locations as a [`ModelState`] — the serialization
//! contract a particle filter uses to clone and overwrite replicas.

pub mod agent;
pub mod analytics;
pub mod error;
pub mod model;
pub mod params;
pub mod state;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use agent::{Agent, AgentStatus};
pub use analytics::ModelAnalytics;
pub use error::{ModelError, ModelResult};
pub use model::{Model, ModelHistory, ModelStatus};
pub use params::ModelParameters;
pub use state::ModelState;
