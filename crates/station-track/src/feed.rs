//! Ground-truth observation source backed by a hidden model run.

use rand_distr::StandardNormal;
use station_core::{ModelRng, Point2D};
use station_filter::DataFeed;
use station_model::{AgentStatus, Model, ModelState};

/// Steps a ground-truth model and serves its state as the measurement,
/// optionally corrupted with Gaussian sensor noise on active agents.
///
/// The noise stream is keyed on `(noise_seed, truth clock)`, so repeated
/// reads of the same tick observe the same measurement and `state` can
/// stay `&self`.
pub struct SyntheticDataFeed {
    truth:      Model,
    noise_std:  f32,
    noise_seed: u64,
}

impl SyntheticDataFeed {
    /// Noise-free feed: measurements are the exact truth state.
    pub fn exact(truth: Model) -> Self {
        SyntheticDataFeed { truth, noise_std: 0.0, noise_seed: 0 }
    }

    pub fn noisy(truth: Model, noise_std: f32, noise_seed: u64) -> Self {
        SyntheticDataFeed { truth, noise_std, noise_seed }
    }

    #[inline]
    pub fn truth(&self) -> &Model {
        &self.truth
    }
}

impl DataFeed<ModelState> for SyntheticDataFeed {
    fn progress_feed(&mut self) {
        self.truth.step();
    }

    fn state(&self) -> ModelState {
        let mut state = self.truth.state();
        if self.noise_std > 0.0 {
            let mut rng = ModelRng::new(self.noise_seed).child(self.truth.step_id());
            for (location, status) in
                state.agent_locations.iter_mut().zip(&state.agent_statuses)
            {
                if *status == AgentStatus::Active {
                    let dx: f32 = rng.sample(&StandardNormal);
                    let dy: f32 = rng.sample(&StandardNormal);
                    *location = Point2D::new(
                        location.x + dx * self.noise_std,
                        location.y + dy * self.noise_std,
                    );
                }
            }
        }
        state
    }

    fn print_statistics(&self) {
        println!("ground truth after {} steps:", self.truth.step_id());
        println!("{}", self.truth.analytics());
    }
}
