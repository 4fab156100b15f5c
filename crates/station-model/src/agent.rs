//! Per-pedestrian state machine and motion logic.
//!
//! An agent is owned exclusively by one [`Model`][crate::Model] and mutated
//! only through [`Agent::step`], which receives the model-level context
//! (boundaries, RNG, history buffers, population census) plus read access
//! to every *other* agent so collision checks can see the live positions of
//! neighbours, including those already moved this tick.

use rand_distr::{Exp, Normal};
use station_core::{ModelRng, Point2D, clip_to_bounds, evenly_spaced_values_within_interval,
                   is_outside_polygon};

use crate::model::{Census, ModelHistory};
use crate::params::ModelParameters;

/// Lifecycle of a pedestrian.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentStatus {
    /// Generated but still waiting for its activation step.
    NotStarted,
    /// On the concourse, walking toward its exit gate.
    Active,
    /// Reached its exit gate; no longer moves or collides.
    Finished,
}

// ── Step context ──────────────────────────────────────────────────────────────

/// Mutable model-level state an agent touches while stepping.
pub(crate) struct StepContext<'a> {
    pub step_id:    u64,
    pub boundaries: &'a [Point2D],
    pub rng:        &'a mut ModelRng,
    pub history:    &'a mut ModelHistory,
    pub census:     &'a mut Census,
}

/// Read access to every other agent, split around the one being stepped.
pub(crate) struct Neighbours<'a> {
    pub before: &'a [Agent],
    pub after:  &'a [Agent],
}

impl Neighbours<'_> {
    /// `true` if an active neighbour within `separation` blocks `candidate`.
    ///
    /// Only agents level with or ahead of the candidate (`candidate.x <=
    /// other.x`) block it; pedestrians already overtaken never hold anyone
    /// back, which keeps the crowd flowing toward the exit wall.
    fn blocks(&self, separation: f32, candidate: Point2D) -> bool {
        let blocked = |agents: &[Agent]| {
            agents.iter().any(|other| {
                other.status == AgentStatus::Active
                    && candidate.distance(other.location) <= separation
                    && candidate.x <= other.location.x
            })
        };
        blocked(self.before) || blocked(self.after)
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

pub struct Agent {
    id:     usize,
    status: AgentStatus,

    gate_in:  usize,
    gate_out: usize,
    start_location:   Point2D,
    desired_location: Point2D,
    location: Point2D,

    speed:     f32,
    max_speed: f32,
    /// Candidate speeds from fastest to slowest; the shared deceleration
    /// grid (same step for all agents, different ceiling per agent).
    available_speeds: Vec<f32>,

    /// Activation threshold drawn from `Exp(gates_speed)`; the agent enters
    /// the concourse once `step_id` exceeds it.
    steps_activate: f32,
    /// Sidestep magnitude when all forward speeds are blocked.
    wiggle: f32,

    step_start: u64,
    history_locations: Vec<Point2D>,
    collisions: usize,
    wiggles:    usize,
}

impl Clone for Agent {
    fn clone(&self) -> Self {
        Agent {
            id: self.id,
            status: self.status,
            gate_in: self.gate_in,
            gate_out: self.gate_out,
            start_location: self.start_location,
            desired_location: self.desired_location,
            location: self.location,
            speed: self.speed,
            max_speed: self.max_speed,
            available_speeds: self.available_speeds.clone(),
            steps_activate: self.steps_activate,
            wiggle: self.wiggle,
            step_start: self.step_start,
            history_locations: self.history_locations.clone(),
            collisions: self.collisions,
            wiggles: self.wiggles,
        }
    }
}

impl Agent {
    /// Draw a fresh pedestrian from the model's shared generator.
    ///
    /// The maximum speed is rejection-sampled from `Normal(speed_mean,
    /// speed_std)` until it strictly exceeds `speed_min`, so the
    /// deceleration grid is never empty.
    pub(crate) fn new(
        id:          usize,
        gates_in:    &[Point2D],
        gates_out:   &[Point2D],
        params:      &ModelParameters,
        speed_step:  f32,
        speed_normal: &Normal<f32>,
        activation:  &Exp<f32>,
        rng:         &mut ModelRng,
    ) -> Self {
        let perturb: f32 = rng.gen_range(-1.0..1.0f32) * params.gates_space();

        let gate_in = rng.gen_range(0..gates_in.len());
        let mut start_location = gates_in[gate_in];
        start_location.y += perturb;

        let gate_out = rng.gen_range(0..gates_out.len());
        let desired_location = gates_out[gate_out];

        let mut max_speed = 0.0;
        while max_speed <= params.speed_min() {
            max_speed = rng.sample(speed_normal);
        }
        let available_speeds =
            evenly_spaced_values_within_interval(max_speed, params.speed_min(), -speed_step);

        let steps_activate: f32 = rng.sample(activation);
        let wiggle = params.max_wiggle().min(max_speed);

        Agent {
            id,
            status: AgentStatus::NotStarted,
            gate_in,
            gate_out,
            start_location,
            desired_location,
            location: start_location,
            speed: 0.0,
            max_speed,
            available_speeds,
            steps_activate,
            wiggle,
            step_start: 0,
            history_locations: Vec::new(),
            collisions: 0,
            wiggles: 0,
        }
    }

    // ── State machine ─────────────────────────────────────────────────────

    pub(crate) fn step(
        &mut self,
        ctx:        &mut StepContext<'_>,
        neighbours: &Neighbours<'_>,
        params:     &ModelParameters,
    ) {
        match self.status {
            AgentStatus::NotStarted => {
                if ctx.step_id as f32 > self.steps_activate {
                    self.activate(ctx);
                    self.move_agent(ctx, neighbours, params);
                }
            }
            AgentStatus::Active => {
                self.move_agent(ctx, neighbours, params);
                self.finish_if_at_exit(ctx, params);
            }
            AgentStatus::Finished => {}
        }

        if params.do_history() {
            self.history_locations.push(self.location);
        }
    }

    fn activate(&mut self, ctx: &mut StepContext<'_>) {
        self.status = AgentStatus::Active;
        ctx.census.active += 1;
        self.step_start = ctx.step_id;
    }

    /// Greedy deceleration with collision avoidance.
    ///
    /// Try each available speed from fastest to slowest and accept the
    /// first candidate position that stays inside the boundaries and clear
    /// of other active agents.  If every speed is blocked, wiggle: keep x
    /// and nudge y by `wiggle * {-1, 0, 1}`.
    fn move_agent(
        &mut self,
        ctx:        &mut StepContext<'_>,
        neighbours: &Neighbours<'_>,
        params:     &ModelParameters,
    ) {
        let direction = self.direction_to_goal();

        let mut next_location = self.location;
        let mut next_speed = 0.0;
        let mut moved = false;

        for i in 0..self.available_speeds.len() {
            let speed = self.available_speeds[i];
            let candidate = Point2D::new(
                self.location.x + speed * direction.x,
                self.location.y + speed * direction.y,
            );

            if is_outside_polygon(ctx.boundaries, candidate)
                || neighbours.blocks(params.separation(), candidate)
            {
                if params.do_history() {
                    self.collisions += 1;
                    ctx.history.record_collision(candidate);
                }
            } else {
                next_location = candidate;
                next_speed = speed;
                moved = true;
                break;
            }
        }

        if !moved {
            let jitter = ctx.rng.gen_range(-1i32..=1) as f32 * self.wiggle;
            next_location = Point2D::new(self.location.x, self.location.y + jitter);
            if params.do_history() {
                self.wiggles += 1;
                ctx.history.record_wiggle(next_location);
            }
        }

        if is_outside_polygon(ctx.boundaries, next_location) {
            next_location = clip_to_bounds(ctx.boundaries, next_location);
        }

        self.location = next_location;
        self.speed = next_speed;
    }

    /// Unit vector toward the exit gate.
    ///
    /// When the agent already sits on its desired location there is no
    /// direction to normalize; the zero vector keeps it in place until the
    /// exit check retires it this same tick.
    fn direction_to_goal(&self) -> Point2D {
        let distance = self.location.distance(self.desired_location);
        if distance <= f32::EPSILON {
            return Point2D::new(0.0, 0.0);
        }
        Point2D::new(
            (self.desired_location.x - self.location.x) / distance,
            (self.desired_location.y - self.location.y) / distance,
        )
    }

    fn finish_if_at_exit(&mut self, ctx: &mut StepContext<'_>, params: &ModelParameters) {
        if self.location.distance(self.desired_location) >= params.gates_space() {
            return;
        }

        self.status = AgentStatus::Finished;
        ctx.census.active -= 1;
        ctx.census.finished += 1;

        if params.do_history() {
            let top_speed = self.available_speeds.first().copied().unwrap_or(self.max_speed);
            let expected = (self.start_location.distance(self.desired_location)
                - params.gates_space())
                / top_speed;
            let taken = (ctx.step_id - self.step_start) as f32;
            ctx.history.record_finish(expected, taken);
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: AgentStatus) {
        self.status = status;
    }

    #[inline]
    pub fn location(&self) -> Point2D {
        self.location
    }

    pub(crate) fn set_location(&mut self, location: Point2D) {
        self.location = location;
    }

    #[inline]
    pub fn desired_location(&self) -> Point2D {
        self.desired_location
    }

    pub(crate) fn set_desired_location(&mut self, location: Point2D) {
        self.desired_location = location;
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    #[inline]
    pub fn available_speeds(&self) -> &[f32] {
        &self.available_speeds
    }

    #[inline]
    pub fn entry_gate(&self) -> usize {
        self.gate_in
    }

    #[inline]
    pub fn exit_gate(&self) -> usize {
        self.gate_out
    }

    #[inline]
    pub fn activation_threshold(&self) -> f32 {
        self.steps_activate
    }

    /// Per-step location trace (populated when `do_history`); what an
    /// external trajectory writer reads.
    #[inline]
    pub fn history_locations(&self) -> &[Point2D] {
        &self.history_locations
    }

    #[inline]
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    #[inline]
    pub fn wiggles(&self) -> usize {
        self.wiggles
    }
}
