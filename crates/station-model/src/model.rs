//! The station model: gate layout, the tick loop, and the state contract.

use rand_distr::{Exp, Normal, StandardNormal};
use station_core::{ModelRng, Point2D, linear_spaced_vector};

use crate::agent::{Agent, AgentStatus, Neighbours, StepContext};
use crate::analytics::ModelAnalytics;
use crate::error::{ModelError, ModelResult};
use crate::params::ModelParameters;
use crate::state::ModelState;

const PRINT_PER_STEPS: u64 = 100;

/// Lifecycle of a model run.
///
/// `Finished` here means the run was cut short (the step limit fired while
/// agents were still in transit); a run where every agent reaches its exit
/// stays `Active` and is detected via [`Model::simulation_finished`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModelStatus {
    Active,
    Finished,
}

/// Population counters, kept incrementally by agent transitions and
/// recomputed wholesale by [`Model::set_state`].
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Census {
    pub active:   usize,
    pub finished: usize,
}

// ── History ───────────────────────────────────────────────────────────────────

/// Event traces recorded while `do_history` is on.
///
/// Everything an external trajectory or density writer would read lives
/// here; the model itself only appends.
#[derive(Clone, Debug, Default)]
pub struct ModelHistory {
    collision_locations: Vec<Point2D>,
    wiggle_locations:    Vec<Point2D>,
    state_snapshots:     Vec<Vec<Point2D>>,

    steps_expected: Vec<f32>,
    steps_taken:    Vec<f32>,
    steps_delay:    Vec<f32>,
}

impl ModelHistory {
    pub(crate) fn record_collision(&mut self, location: Point2D) {
        self.collision_locations.push(location);
    }

    pub(crate) fn record_wiggle(&mut self, location: Point2D) {
        self.wiggle_locations.push(location);
    }

    pub(crate) fn record_finish(&mut self, expected: f32, taken: f32) {
        self.steps_expected.push(expected);
        self.steps_taken.push(taken);
        self.steps_delay.push(taken - expected);
    }

    pub(crate) fn record_snapshot(&mut self, locations: Vec<Point2D>) {
        self.state_snapshots.push(locations);
    }

    #[inline]
    pub fn collision_locations(&self) -> &[Point2D] {
        &self.collision_locations
    }

    #[inline]
    pub fn wiggle_locations(&self) -> &[Point2D] {
        &self.wiggle_locations
    }

    /// One location vector per completed step, in step order.
    #[inline]
    pub fn state_snapshots(&self) -> &[Vec<Point2D>] {
        &self.state_snapshots
    }

    #[inline]
    pub fn steps_expected(&self) -> &[f32] {
        &self.steps_expected
    }

    #[inline]
    pub fn steps_taken(&self) -> &[f32] {
        &self.steps_taken
    }

    #[inline]
    pub fn steps_delay(&self) -> &[f32] {
        &self.steps_delay
    }
}

// ── Model ─────────────────────────────────────────────────────────────────────

pub struct Model {
    id:     usize,
    status: ModelStatus,

    params: ModelParameters,

    step_id: u64,
    census:  Census,

    boundaries: Vec<Point2D>,
    gates_in:   Vec<Point2D>,
    gates_out:  Vec<Point2D>,

    speed_step: f32,

    agents:  Vec<Agent>,
    history: ModelHistory,

    speed_normal: Normal<f32>,
    activation:   Exp<f32>,
    rng: ModelRng,
}

impl Model {
    /// Build a model and generate its full population.
    ///
    /// Gate positions are interior points of an even subdivision of the
    /// respective wall: `n` gates sit at `linear_spaced_vector(0, height,
    /// n + 2)` with the two wall corners dropped.
    pub fn new(id: usize, params: ModelParameters) -> ModelResult<Self> {
        let width = params.space_width();
        let height = params.space_height();

        let boundaries = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, height),
            Point2D::new(width, height),
            Point2D::new(width, 0.0),
        ];

        let gates_in = gate_wall(0.0, height, params.gates_in_count());
        let gates_out = gate_wall(width, height, params.gates_out_count());

        let speed_step =
            (params.speed_mean() - params.speed_min()) / params.speed_steps() as f32;
        if !(speed_step > 0.0) {
            return Err(ModelError::InvalidArgument {
                name:  "speed_mean - speed_min",
                value: (params.speed_mean() - params.speed_min()) as f64,
            });
        }

        let speed_normal = Normal::new(params.speed_mean(), params.speed_std())
            .map_err(|_| ModelError::InvalidArgument {
                name:  "speed_std",
                value: params.speed_std() as f64,
            })?;
        let activation = Exp::new(params.gates_speed()).map_err(|_| {
            ModelError::InvalidArgument {
                name:  "gates_speed",
                value: params.gates_speed() as f64,
            }
        })?;

        let mut rng = ModelRng::new(params.random_seed());

        let mut agents = Vec::with_capacity(params.population_total());
        for agent_id in 0..params.population_total() {
            agents.push(Agent::new(
                agent_id,
                &gates_in,
                &gates_out,
                &params,
                speed_step,
                &speed_normal,
                &activation,
                &mut rng,
            ));
        }

        Ok(Model {
            id,
            status: ModelStatus::Active,
            params,
            step_id: 0,
            census: Census::default(),
            boundaries,
            gates_in,
            gates_out,
            speed_step,
            agents,
            history: ModelHistory::default(),
            speed_normal,
            activation,
            rng,
        })
    }

    // ── Tick loop ─────────────────────────────────────────────────────────

    /// Advance the simulation by one tick.
    ///
    /// Runs while agents remain in transit, the step limit has not fired,
    /// and the model is `Active`.  Hitting the step limit with agents still
    /// in transit flips the status to `Finished` once; a fully evacuated
    /// concourse leaves the status alone and is observed through
    /// [`simulation_finished`][Model::simulation_finished].
    pub fn step(&mut self) {
        let all_finished = self.census.finished >= self.params.population_total();

        if !all_finished
            && self.step_id < self.params.step_limit()
            && self.status == ModelStatus::Active
        {
            if self.params.do_print() && self.step_id % PRINT_PER_STEPS == 0 {
                println!(
                    "model {} step {}: {} active, {} finished",
                    self.id, self.step_id, self.census.active, self.census.finished
                );
            }

            self.move_agents();

            if self.params.do_history() {
                let snapshot = self.agents.iter().map(Agent::location).collect();
                self.history.record_snapshot(snapshot);
            }

            self.step_id += 1;
        } else if !all_finished {
            if self.status == ModelStatus::Active && self.params.do_print() {
                println!(
                    "model {} halted at step {} with {} agents unfinished",
                    self.id,
                    self.step_id,
                    self.params.population_total() - self.census.finished
                );
            }
            self.status = ModelStatus::Finished;
        }
    }

    /// Step every agent in agent-id order.
    ///
    /// Updates are sequential on purpose: agent `i` sees the already-moved
    /// positions of agents `0..i` and the not-yet-moved positions of
    /// `i+1..`, which is part of the model definition.
    fn move_agents(&mut self) {
        for i in 0..self.agents.len() {
            let (before, rest) = self.agents.split_at_mut(i);
            if let Some((agent, after)) = rest.split_first_mut() {
                let mut ctx = StepContext {
                    step_id:    self.step_id,
                    boundaries: &self.boundaries,
                    rng:        &mut self.rng,
                    history:    &mut self.history,
                    census:     &mut self.census,
                };
                let neighbours = Neighbours { before, after };
                agent.step(&mut ctx, &neighbours, &self.params);
            }
        }
    }

    // ── State contract ────────────────────────────────────────────────────

    /// Extract the filter-visible state in agent-id order.
    pub fn state(&self) -> ModelState {
        ModelState {
            agent_locations:   self.agents.iter().map(Agent::location).collect(),
            agent_statuses:    self.agents.iter().map(Agent::status).collect(),
            desired_locations: self.agents.iter().map(Agent::desired_location).collect(),
        }
    }

    /// Overwrite locations, statuses, and desired locations from a snapshot.
    ///
    /// The agent vector is never resized; a length mismatch in any of the
    /// three arrays rejects the whole snapshot before anything is applied.
    /// Population counters are recomputed from the applied statuses.
    pub fn set_state(&mut self, state: &ModelState) -> ModelResult<()> {
        let expected = self.agents.len();
        let checks: [(&'static str, usize); 3] = [
            ("agent_locations", state.agent_locations.len()),
            ("agent_statuses", state.agent_statuses.len()),
            ("desired_locations", state.desired_locations.len()),
        ];
        for (what, got) in checks {
            if got != expected {
                return Err(ModelError::DimensionMismatch { expected, got, what });
            }
        }

        for (i, agent) in self.agents.iter_mut().enumerate() {
            agent.set_location(state.agent_locations[i]);
            agent.set_status(state.agent_statuses[i]);
            agent.set_desired_location(state.desired_locations[i]);
        }

        let mut census = Census::default();
        for status in &state.agent_statuses {
            match status {
                AgentStatus::NotStarted => {}
                AgentStatus::Active => census.active += 1,
                AgentStatus::Finished => census.finished += 1,
            }
        }
        self.census = census;

        Ok(())
    }

    /// Add Gaussian noise to every active agent's location.
    pub fn perturb_state(&mut self, std: f32) {
        for i in 0..self.agents.len() {
            if self.agents[i].status() != AgentStatus::Active {
                continue;
            }
            let dx: f32 = self.rng.sample(&StandardNormal);
            let dy: f32 = self.rng.sample(&StandardNormal);
            let location = self.agents[i].location();
            self.agents[i].set_location(Point2D::new(
                location.x + dx * std,
                location.y + dy * std,
            ));
        }
    }

    /// Replace the generator with a fresh entropy-seeded stream.
    ///
    /// Particle replicas call this after copying a base model so their
    /// futures diverge.
    pub fn reseed_rng(&mut self) {
        self.rng = ModelRng::from_entropy();
    }

    /// Deep copy with an independent generator.
    ///
    /// Deliberately not a `Clone` impl: copying a model always reseeds, so
    /// two copies never replay the same random stream.
    pub fn duplicate(&self, id: usize) -> Self {
        Model {
            id,
            status: self.status,
            params: self.params.clone(),
            step_id: self.step_id,
            census: self.census,
            boundaries: self.boundaries.clone(),
            gates_in: self.gates_in.clone(),
            gates_out: self.gates_out.clone(),
            speed_step: self.speed_step,
            agents: self.agents.clone(),
            history: self.history.clone(),
            speed_normal: self.speed_normal,
            activation: self.activation,
            rng: ModelRng::from_entropy(),
        }
    }

    // ── Read side ─────────────────────────────────────────────────────────

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == ModelStatus::Active
    }

    /// `true` once every agent has reached its exit gate.
    #[inline]
    pub fn simulation_finished(&self) -> bool {
        self.census.finished >= self.params.population_total()
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn status(&self) -> ModelStatus {
        self.status
    }

    #[inline]
    pub fn step_id(&self) -> u64 {
        self.step_id
    }

    #[inline]
    pub fn pop_active(&self) -> usize {
        self.census.active
    }

    #[inline]
    pub fn pop_finished(&self) -> usize {
        self.census.finished
    }

    #[inline]
    pub fn params(&self) -> &ModelParameters {
        &self.params
    }

    #[inline]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[inline]
    pub fn boundaries(&self) -> &[Point2D] {
        &self.boundaries
    }

    #[inline]
    pub fn gates_in(&self) -> &[Point2D] {
        &self.gates_in
    }

    #[inline]
    pub fn gates_out(&self) -> &[Point2D] {
        &self.gates_out
    }

    #[inline]
    pub fn speed_step(&self) -> f32 {
        self.speed_step
    }

    #[inline]
    pub fn history(&self) -> &ModelHistory {
        &self.history
    }

    /// Aggregate run statistics over agents and finish records.
    pub fn analytics(&self) -> ModelAnalytics {
        ModelAnalytics::from_model(self)
    }
}

/// Interior gate positions on a vertical wall at `x`.
fn gate_wall(x: f32, height: f32, count: usize) -> Vec<Point2D> {
    linear_spaced_vector(0.0, height, count as i32 + 2)
        .into_iter()
        .skip(1)
        .take(count)
        .map(|y| Point2D::new(x, y))
        .collect()
}
