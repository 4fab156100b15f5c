use std::thread;

use station_core::ModelRng;

use crate::comm::{SingleWorker, channel_workers};
use crate::error::FilterResult;
use crate::filter::{FilterConfig, ParticleFilter};
use crate::particle::Particle;
use crate::resample::systematic_resample;
use crate::traits::{DataFeed, FilterStatistics, NoopStatistics, ParticleFit,
                    ParticlesInitialiser};

// ── Test fixtures: a 1-D drift model ──────────────────────────────────────────

/// Particle whose hidden parameter is its drift; only the value is state.
struct DriftParticle {
    value: f32,
    drift: f32,
    rng:   ModelRng,
}

impl Particle for DriftParticle {
    type State = f32;

    fn is_active(&self) -> bool {
        true
    }

    fn state(&self) -> f32 {
        self.value
    }

    fn set_state(&mut self, state: &f32) -> FilterResult<()> {
        self.value = *state;
        Ok(())
    }

    fn perturb_state(&mut self, std: f32) {
        if std > 0.0 {
            self.value += self.rng.gen_range(-std..std);
        }
    }

    fn step(&mut self) {
        self.value += self.drift;
    }
}

struct DriftFeed {
    value: f32,
    drift: f32,
}

impl DataFeed<f32> for DriftFeed {
    fn progress_feed(&mut self) {
        self.value += self.drift;
    }

    fn state(&self) -> f32 {
        self.value
    }
}

struct AbsoluteFit;

impl ParticleFit<DriftParticle> for AbsoluteFit {
    fn fit(&self, particle: &DriftParticle, measured: &f32) -> f32 {
        (particle.value - measured).abs()
    }
}

/// Drifts fan out in steps of 0.1 starting from `first_drift`.
struct DriftSpread {
    start_value: f32,
    first_drift: f32,
}

impl ParticlesInitialiser<DriftParticle> for DriftSpread {
    fn initialise_particles(
        &self,
        count: usize,
        offset: usize,
    ) -> FilterResult<Vec<DriftParticle>> {
        Ok((0..count)
            .map(|i| {
                let slot = offset + i;
                DriftParticle {
                    value: self.start_value,
                    drift: self.first_drift + 0.1 * slot as f32,
                    rng:   ModelRng::new(slot as u64),
                }
            })
            .collect())
    }
}

/// Particles pinned at fixed values, never moving: lets a test steer the
/// resample outcome exactly.
struct PinnedValues(Vec<f32>);

impl ParticlesInitialiser<DriftParticle> for PinnedValues {
    fn initialise_particles(
        &self,
        count: usize,
        offset: usize,
    ) -> FilterResult<Vec<DriftParticle>> {
        Ok((0..count)
            .map(|i| DriftParticle {
                value: self.0[offset + i],
                drift: 0.0,
                rng:   ModelRng::new((offset + i) as u64),
            })
            .collect())
    }
}

struct WindowCounter(usize);

impl FilterStatistics<f32> for WindowCounter {
    fn calculate_statistics(&mut self, _measured: &f32, states: &[f32], weights: &[f32]) {
        assert_eq!(states.len(), weights.len());
        self.0 += 1;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

mod resampling {
    use super::*;

    #[test]
    fn uniform_weights_keep_every_slot() {
        let mut rng = ModelRng::new(7);
        let weights = vec![0.25f32; 4];
        let ancestors = systematic_resample(&weights, &mut rng);
        assert_eq!(ancestors, vec![0, 1, 2, 3]);
    }

    #[test]
    fn concentrated_weight_takes_every_slot() {
        let mut rng = ModelRng::new(8);
        let weights = vec![0.0, 0.0, 1.0, 0.0, 0.0];
        let ancestors = systematic_resample(&weights, &mut rng);
        assert_eq!(ancestors, vec![2; 5]);
    }

    #[test]
    fn split_weight_splits_the_slots() {
        let mut rng = ModelRng::new(9);
        let weights = vec![0.5, 0.5, 0.0, 0.0];
        let ancestors = systematic_resample(&weights, &mut rng);
        assert_eq!(ancestors, vec![0, 0, 1, 1]);
    }

    #[test]
    fn selection_is_weight_proportional() {
        let mut rng = ModelRng::new(10);
        let mut weights = vec![0.7f32];
        weights.extend(vec![0.3 / 9.0; 9]);
        let ancestors = systematic_resample(&weights, &mut rng);
        let zeros = ancestors.iter().filter(|&&a| a == 0).count();
        assert!((6..=8).contains(&zeros), "index 0 selected {zeros} times");
    }

    #[test]
    fn empty_weights_give_empty_ancestry() {
        let mut rng = ModelRng::new(11);
        assert!(systematic_resample(&[], &mut rng).is_empty());
    }
}

mod partition {
    use super::*;

    fn config(particles: usize) -> FilterConfig {
        FilterConfig {
            number_of_particles: particles,
            resample_window: 1,
            multi_step: false,
            particle_std: 0.0,
            do_resample: false,
            total_steps: 1,
            seed: 1,
        }
    }

    #[test]
    fn uneven_split_is_rejected() {
        let mut workers = channel_workers::<f32>(3);
        let comm = workers.remove(0);
        let result = ParticleFilter::new(
            config(10),
            DriftFeed { value: 0.0, drift: 1.0 },
            AbsoluteFit,
            comm,
            &DriftSpread { start_value: 0.0, first_drift: 0.5 },
        );
        assert!(result.is_err());
    }

    #[test]
    fn more_workers_than_particles_is_rejected() {
        let mut workers = channel_workers::<f32>(4);
        let comm = workers.remove(0);
        let result = ParticleFilter::new(
            config(2),
            DriftFeed { value: 0.0, drift: 1.0 },
            AbsoluteFit,
            comm,
            &DriftSpread { start_value: 0.0, first_drift: 0.5 },
        );
        assert!(result.is_err());
    }

    #[test]
    fn even_split_is_accepted() {
        let filter = ParticleFilter::new(
            config(10),
            DriftFeed { value: 0.0, drift: 1.0 },
            AbsoluteFit,
            SingleWorker,
            &DriftSpread { start_value: 0.0, first_drift: 0.5 },
        )
        .unwrap();
        assert_eq!(filter.particles().len(), 10);
        assert_eq!(filter.weights().len(), 10);
    }
}

mod single_worker_runs {
    use super::*;

    #[test]
    fn statistics_fire_once_per_window() {
        let config = FilterConfig {
            number_of_particles: 4,
            resample_window: 10,
            multi_step: true,
            particle_std: 0.0,
            do_resample: false,
            total_steps: 50,
            seed: 3,
        };
        let mut filter = ParticleFilter::new(
            config,
            DriftFeed { value: 0.0, drift: 1.0 },
            AbsoluteFit,
            SingleWorker,
            &DriftSpread { start_value: 0.0, first_drift: 0.8 },
        )
        .unwrap();

        let mut counter = WindowCounter(0);
        filter.run(&mut counter).unwrap();
        assert_eq!(counter.0, 5);
    }

    #[test]
    fn resampling_tracks_the_truth() {
        let config = FilterConfig {
            number_of_particles: 10,
            resample_window: 10,
            multi_step: true,
            particle_std: 0.01,
            do_resample: true,
            total_steps: 100,
            seed: 4,
        };
        // Drifts 0.5..1.4; the truth drifts at exactly 1.0.
        let mut filter = ParticleFilter::new(
            config,
            DriftFeed { value: 0.0, drift: 1.0 },
            AbsoluteFit,
            SingleWorker,
            &DriftSpread { start_value: 0.0, first_drift: 0.5 },
        )
        .unwrap();

        filter.run(&mut NoopStatistics).unwrap();

        let measured = filter.feed().state();
        let (_, best) = filter.best_particle_fit(&measured).unwrap();
        assert!(best < 1.0, "best particle fit {best} after tracking");

        let total: f32 = filter.weights().iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn without_resampling_weights_stay_initial() {
        let config = FilterConfig {
            number_of_particles: 3,
            resample_window: 5,
            multi_step: true,
            particle_std: 0.0,
            do_resample: false,
            total_steps: 15,
            seed: 5,
        };
        let mut filter = ParticleFilter::new(
            config,
            DriftFeed { value: 0.0, drift: 1.0 },
            AbsoluteFit,
            SingleWorker,
            &DriftSpread { start_value: 0.0, first_drift: 0.9 },
        )
        .unwrap();

        filter.run(&mut NoopStatistics).unwrap();
        assert!(filter.weights().iter().all(|&w| w == 1.0));
    }
}

mod channel_mesh {
    use super::*;

    #[test]
    fn collectives_agree_across_three_workers() {
        let workers = channel_workers::<f32>(3);
        let mut handles = Vec::new();

        for (rank, mut comm) in workers.into_iter().enumerate() {
            handles.push(thread::spawn(move || {
                use crate::comm::WorkerComm;

                let total = comm.reduce_weight_sum((rank + 1) as f64).unwrap();

                let local = [rank as f32; 2];
                let gathered = comm.gather_weights(&local).unwrap();

                let ancestors = if rank == 0 {
                    let all = gathered.clone().unwrap();
                    assert_eq!(all, vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
                    comm.broadcast_ancestors(Some(vec![5, 4, 3, 2, 1, 0])).unwrap()
                } else {
                    assert!(gathered.is_none());
                    comm.broadcast_ancestors(None).unwrap()
                };

                (total, ancestors)
            }));
        }

        for handle in handles {
            let (total, ancestors) = handle.join().unwrap();
            assert_eq!(total, 6.0);
            assert_eq!(ancestors, vec![5, 4, 3, 2, 1, 0]);
        }
    }

    #[test]
    fn resample_swaps_state_across_workers() {
        // Slot 0 matches the measurement exactly, so every slot's ancestor
        // is 0 and worker 1 must receive its states from worker 0.
        let values = vec![5.0f32, 100.0, 200.0, 300.0];
        let config = FilterConfig {
            number_of_particles: 4,
            resample_window: 1,
            multi_step: true,
            particle_std: 0.0,
            do_resample: true,
            total_steps: 1,
            seed: 6,
        };

        let workers = channel_workers::<f32>(2);
        let mut handles = Vec::new();

        for comm in workers {
            let config = config.clone();
            let values = values.clone();
            handles.push(thread::spawn(move || {
                let mut filter = ParticleFilter::new(
                    config,
                    DriftFeed { value: 5.0, drift: 0.0 },
                    AbsoluteFit,
                    comm,
                    &PinnedValues(values),
                )
                .unwrap();
                filter.run(&mut NoopStatistics).unwrap();
                filter.particles().iter().map(|p| p.state()).collect::<Vec<f32>>()
            }));
        }

        for handle in handles {
            let states = handle.join().unwrap();
            assert_eq!(states, vec![5.0, 5.0]);
        }
    }
}
