//! Aggregate run statistics, computed on demand from a finished (or
//! in-flight) model.

use std::fmt;

use crate::model::Model;

/// Means over the finish records and per-agent event counters.
///
/// All means are zero when the underlying series is empty, so the struct is
/// safe to compute at any point in a run.
#[derive(Clone, Copy, Debug, Default)]
pub struct ModelAnalytics {
    pub finished_count: usize,

    pub mean_steps_expected: f32,
    pub mean_steps_taken:    f32,
    pub mean_steps_delay:    f32,

    pub mean_collisions: f32,
    pub mean_wiggles:    f32,
}

impl ModelAnalytics {
    pub(crate) fn from_model(model: &Model) -> Self {
        let history = model.history();
        let agents = model.agents();

        let total_collisions: usize = agents.iter().map(|a| a.collisions()).sum();
        let total_wiggles: usize = agents.iter().map(|a| a.wiggles()).sum();

        ModelAnalytics {
            finished_count:      history.steps_taken().len(),
            mean_steps_expected: mean(history.steps_expected()),
            mean_steps_taken:    mean(history.steps_taken()),
            mean_steps_delay:    mean(history.steps_delay()),
            mean_collisions:     ratio(total_collisions, agents.len()),
            mean_wiggles:        ratio(total_wiggles, agents.len()),
        }
    }
}

impl fmt::Display for ModelAnalytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "finished agents:     {}", self.finished_count)?;
        writeln!(f, "mean steps expected: {:.2}", self.mean_steps_expected)?;
        writeln!(f, "mean steps taken:    {:.2}", self.mean_steps_taken)?;
        writeln!(f, "mean steps delay:    {:.2}", self.mean_steps_delay)?;
        writeln!(f, "mean collisions:     {:.2}", self.mean_collisions)?;
        write!(f, "mean wiggles:        {:.2}", self.mean_wiggles)
    }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

fn ratio(total: usize, count: usize) -> f32 {
    if count == 0 {
        return 0.0;
    }
    total as f32 / count as f32
}
