//! The window loop: predict, observe, reweight, resample, perturb.

use station_core::ModelRng;

use crate::comm::WorkerComm;
use crate::error::{FilterError, FilterResult};
use crate::particle::Particle;
use crate::resample::systematic_resample;
use crate::traits::{DataFeed, FilterStatistics, ParticleFit, ParticlesInitialiser};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Run configuration for one filter instance.
#[derive(Clone, Debug)]
pub struct FilterConfig {
    pub number_of_particles: usize,
    /// Ticks between observations.
    pub resample_window: u64,
    /// Predict a whole window per outer iteration instead of one tick.
    /// Trades observation frequency for throughput.
    pub multi_step: bool,
    /// Post-resample jitter applied to every particle.
    pub particle_std: f32,
    pub do_resample: bool,
    pub total_steps: u64,
    pub seed: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            number_of_particles: 100,
            resample_window:     100,
            multi_step:          true,
            particle_std:        0.25,
            do_resample:         true,
            total_steps:         1000,
            seed:                rand::random(),
        }
    }
}

/// One worker's view of a sequential Monte Carlo particle filter.
///
/// Owns `number_of_particles / world_size` particles filling the global
/// slot range `rank * local .. (rank + 1) * local`; weights are indexed
/// the same way.  All workers execute [`run`][ParticleFilter::run] in
/// lockstep and rendezvous inside the resample collectives.
pub struct ParticleFilter<P, D, F, C>
where
    P: Particle,
    D: DataFeed<P::State>,
    F: ParticleFit<P>,
    C: WorkerComm<P::State>,
{
    config: FilterConfig,
    feed:   D,
    fit:    F,
    comm:   C,

    particles: Vec<P>,
    weights:   Vec<f32>,

    rng: ModelRng,
}

impl<P, D, F, C> ParticleFilter<P, D, F, C>
where
    P: Particle + Sync,
    P::State: Sync,
    D: DataFeed<P::State>,
    F: ParticleFit<P>,
    C: WorkerComm<P::State>,
{
    /// Validate the worker partition and build the local population.
    pub fn new<I>(
        config: FilterConfig,
        feed: D,
        fit: F,
        comm: C,
        initialiser: &I,
    ) -> FilterResult<Self>
    where
        I: ParticlesInitialiser<P>,
    {
        let world = comm.world_size();
        let particles = config.number_of_particles;
        if world > particles || particles % world != 0 {
            return Err(FilterError::Partition { particles, workers: world });
        }

        let local_count = particles / world;
        let offset = comm.rank() * local_count;
        let local = initialiser.initialise_particles(local_count, offset)?;
        if local.len() != local_count {
            return Err(FilterError::Init(format!(
                "initialiser produced {} particles, wanted {local_count}",
                local.len()
            )));
        }

        Ok(ParticleFilter {
            rng: ModelRng::new(config.seed),
            weights: vec![1.0; local_count],
            config,
            feed,
            fit,
            comm,
            particles: local,
        })
    }

    // ── Window loop ───────────────────────────────────────────────────────

    /// Run to `total_steps`, invoking `statistics` at every window
    /// boundary with the particle snapshots and the weights carried into
    /// the window.
    pub fn run<St>(&mut self, statistics: &mut St) -> FilterResult<()>
    where
        St: FilterStatistics<P::State>,
    {
        let mut steps_run: u64 = 0;
        while steps_run < self.config.total_steps {
            let batch = if self.config.multi_step {
                self.config.resample_window
            } else {
                1
            };

            self.predict(batch);
            steps_run += batch;

            if steps_run % self.config.resample_window == 0 {
                let measured = self.feed.state();

                let states: Vec<P::State> =
                    self.particles.iter().map(|p| p.state()).collect();
                statistics.calculate_statistics(&measured, &states, &self.weights);

                if self.config.do_resample {
                    self.reweight(&measured)?;
                    self.resample()?;
                    self.perturb_particles();
                }
            }
        }
        Ok(())
    }

    /// Advance the feed and every local particle by `steps` ticks.
    ///
    /// Particles are skipped once none of them can progress, but the feed
    /// still advances so the clock stays aligned across workers.
    fn predict(&mut self, steps: u64) {
        for _ in 0..steps {
            self.feed.progress_feed();
        }

        if !self.particles.iter().any(|p| p.is_active()) {
            return;
        }

        #[cfg(feature = "parallel")]
        self.particles.par_iter_mut().for_each(|particle| {
            particle.reseed();
            for _ in 0..steps {
                particle.step();
            }
        });

        #[cfg(not(feature = "parallel"))]
        for particle in &mut self.particles {
            particle.reseed();
            for _ in 0..steps {
                particle.step();
            }
        }
    }

    /// Score every particle against the measured state and normalize by
    /// the global weight sum.
    ///
    /// The inverse-square map `w = 1 / (fit + 1e-9)^2` rewards near
    /// matches steeply; the sum and division run in f64 because squared
    /// reciprocals of tiny fits overflow the dynamic range of f32.
    fn reweight(&mut self, measured: &P::State) -> FilterResult<()> {
        // Borrow the fit alone: the filter as a whole is not Sync (the
        // comm side holds channel receivers).
        let fit = &self.fit;

        #[cfg(feature = "parallel")]
        let fits: Vec<f32> = self
            .particles
            .par_iter()
            .map(|p| fit.fit(p, measured))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let fits: Vec<f32> = self
            .particles
            .iter()
            .map(|p| fit.fit(p, measured))
            .collect();

        let raw: Vec<f64> = fits
            .iter()
            .map(|&fit| 1.0 / (fit as f64 + 1e-9).powi(2))
            .collect();

        let local_sum: f64 = raw.iter().sum();
        let global_sum = self.comm.reduce_weight_sum(local_sum)?;

        for (weight, value) in self.weights.iter_mut().zip(&raw) {
            *weight = (value / global_sum) as f32;
        }
        Ok(())
    }

    /// Systematic resampling with the globally ordered weight vector.
    ///
    /// The coordinator draws the ancestor mapping; every worker then walks
    /// the global slots in order and copies, sends, or receives state
    /// depending on which side of the transfer it owns.  Ancestor states
    /// are snapshotted before any slot is overwritten.
    fn resample(&mut self) -> FilterResult<()> {
        let gathered = self.comm.gather_weights(&self.weights)?;
        let ancestors = match gathered {
            Some(all_weights) => {
                let mapping = systematic_resample(&all_weights, &mut self.rng);
                self.comm.broadcast_ancestors(Some(mapping))?
            }
            None => self.comm.broadcast_ancestors(None)?,
        };

        let local_count = self.particles.len();
        let rank = self.comm.rank();
        let base = rank * local_count;

        let snapshot: Vec<P::State> = self.particles.iter().map(|p| p.state()).collect();

        for (slot, &ancestor) in ancestors.iter().enumerate() {
            let slot_owner = slot / local_count;
            let ancestor_owner = ancestor / local_count;

            if ancestor_owner == rank && slot_owner == rank {
                if slot != ancestor {
                    self.particles[slot - base].set_state(&snapshot[ancestor - base])?;
                }
            } else if ancestor_owner == rank {
                self.comm.send_state(slot_owner, slot, &snapshot[ancestor - base])?;
            } else if slot_owner == rank {
                let state = self.comm.recv_state(ancestor_owner, slot)?;
                self.particles[slot - base].set_state(&state)?;
            }
        }

        let uniform = 1.0 / ancestors.len() as f32;
        for weight in &mut self.weights {
            *weight = uniform;
        }
        Ok(())
    }

    fn perturb_particles(&mut self) {
        let std = self.config.particle_std;

        #[cfg(feature = "parallel")]
        self.particles
            .par_iter_mut()
            .for_each(|particle| particle.perturb_state(std));

        #[cfg(not(feature = "parallel"))]
        for particle in &mut self.particles {
            particle.perturb_state(std);
        }
    }

    // ── Read side ─────────────────────────────────────────────────────────

    /// Index and fit of the local particle closest to `measured`.
    pub fn best_particle_fit(&self, measured: &P::State) -> Option<(usize, f32)> {
        self.particles
            .iter()
            .enumerate()
            .map(|(i, p)| (i, self.fit.fit(p, measured)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    #[inline]
    pub fn particles(&self) -> &[P] {
        &self.particles
    }

    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[inline]
    pub fn feed(&self) -> &D {
        &self.feed
    }

    #[inline]
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }
}
