//! station-demo — track a hidden crowd with a particle filter.
//!
//! Runs a ground-truth station simulation behind a synthetic data feed,
//! then estimates it with a population of particle models that only see
//! the feed's measurements at each resample window.

use std::time::Instant;

use anyhow::Result;

use station_filter::{DataFeed, FilterConfig, ParticleFilter, SingleWorker};
use station_model::{Model, ModelParameters};
use station_track::{
    AgentLocationFit, ModelParticlesInitialiser, SyntheticDataFeed, TrackingStatistics,
};

// ── Constants ─────────────────────────────────────────────────────────────────

const POPULATION:      usize = 40;
const SEED:            u64   = 42;
const PARTICLES:       usize = 50;
const RESAMPLE_WINDOW: u64   = 50;
const TOTAL_STEPS:     u64   = 1_000;
const PARTICLE_STD:    f32   = 0.25;
const SENSOR_NOISE:    f32   = 0.5;

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    println!("=== station-demo — particle-filter crowd tracking ===");
    println!("Agents: {POPULATION}  |  Particles: {PARTICLES}  |  Seed: {SEED}");
    println!();

    // 1. Ground truth: the model the filter is trying to recover.
    let mut params = ModelParameters::default();
    params.set_population_total(POPULATION)?;
    params.set_step_limit(TOTAL_STEPS + 1)?;
    params.set_do_print(false);
    params.set_random_seed(SEED);

    let truth = Model::new(0, params.clone())?;
    println!(
        "Concourse: {} x {} m, {} entrance / {} exit gates",
        params.space_width(),
        params.space_height(),
        params.gates_in_count(),
        params.gates_out_count()
    );

    // 2. Particle base: same parameters, different seed, so the filter
    //    starts from the right crowd but the wrong randomness.
    params.set_random_seed(SEED + 1);
    let base = Model::new(1, params)?;

    // 3. Assemble the filter.
    let config = FilterConfig {
        number_of_particles: PARTICLES,
        resample_window:     RESAMPLE_WINDOW,
        multi_step:          true,
        particle_std:        PARTICLE_STD,
        do_resample:         true,
        total_steps:         TOTAL_STEPS,
        seed:                SEED,
    };
    println!(
        "Filter: {} windows of {} ticks, jitter {} m, sensor noise {} m",
        TOTAL_STEPS / RESAMPLE_WINDOW,
        RESAMPLE_WINDOW,
        PARTICLE_STD,
        SENSOR_NOISE
    );
    println!();

    let feed = SyntheticDataFeed::noisy(truth, SENSOR_NOISE, SEED);
    let mut filter = ParticleFilter::new(
        config,
        feed,
        AgentLocationFit,
        SingleWorker,
        &ModelParticlesInitialiser::new(base),
    )?;

    // 4. Run.
    let t0 = Instant::now();
    let mut stats = TrackingStatistics::new();
    filter.run(&mut stats)?;
    let elapsed = t0.elapsed();

    // 5. Per-window tracking table.
    println!("Tracking complete in {:.3} s", elapsed.as_secs_f64());
    println!();
    println!(
        "{:<8} {:<8} {:>12} {:>12} {:>10}",
        "Window", "Active", "Truth x", "Estimate x", "Error"
    );
    println!("{}", "-".repeat(54));
    for window in 0..stats.windows() {
        println!(
            "{:<8} {:<8} {:>12.2} {:>12.2} {:>10.2}",
            window + 1,
            stats.active_counts()[window],
            stats.truth_centroids()[window].x,
            stats.weighted_centroids()[window].x,
            stats.mean_errors()[window],
        );
    }
    println!();

    // 6. Final fit of the best surviving particle.
    let measured = filter.feed().state();
    if let Some((index, fit)) = filter.best_particle_fit(&measured) {
        println!("Best particle: #{index} at distance {fit:.2} m from the measurement");
    }
    filter.feed().print_statistics();

    Ok(())
}
