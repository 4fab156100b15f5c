use crate::agent::AgentStatus;
use crate::model::{Model, ModelStatus};
use crate::params::ModelParameters;

fn quiet_params(seed: u64) -> ModelParameters {
    let mut params = ModelParameters::default();
    params.set_do_print(false);
    params.set_random_seed(seed);
    params
}

mod params {
    use super::*;

    #[test]
    fn rejects_nonpositive_without_mutation() {
        let mut params = ModelParameters::default();

        assert!(params.set_population_total(0).is_err());
        assert_eq!(params.population_total(), 40);

        assert!(params.set_space_width(0.0).is_err());
        assert!(params.set_space_width(-5.0).is_err());
        assert!(params.set_space_width(f32::NAN).is_err());
        assert_eq!(params.space_width(), 200.0);

        assert!(params.set_space_height(-1.0).is_err());
        assert_eq!(params.space_height(), 100.0);

        assert!(params.set_gates_in_count(0).is_err());
        assert_eq!(params.gates_in_count(), 3);

        assert!(params.set_gates_out_count(0).is_err());
        assert_eq!(params.gates_out_count(), 2);

        assert!(params.set_gates_space(0.0).is_err());
        assert_eq!(params.gates_space(), 1.0);

        assert!(params.set_gates_speed(-0.5).is_err());
        assert_eq!(params.gates_speed(), 1.0);

        assert!(params.set_speed_min(0.0).is_err());
        assert_eq!(params.speed_min(), 0.2);

        assert!(params.set_speed_mean(-1.0).is_err());
        assert_eq!(params.speed_mean(), 1.0);

        assert!(params.set_speed_std(0.0).is_err());
        assert_eq!(params.speed_std(), 1.0);

        assert!(params.set_speed_steps(0).is_err());
        assert_eq!(params.speed_steps(), 3);

        assert!(params.set_separation(-2.0).is_err());
        assert_eq!(params.separation(), 2.0);

        assert!(params.set_max_wiggle(0.0).is_err());
        assert_eq!(params.max_wiggle(), 1.0);

        assert!(params.set_step_limit(0).is_err());
        assert_eq!(params.step_limit(), 3600);
    }

    #[test]
    fn accepts_positive_values() {
        let mut params = ModelParameters::default();
        params.set_population_total(7).unwrap();
        params.set_space_width(50.0).unwrap();
        assert_eq!(params.population_total(), 7);
        assert_eq!(params.space_width(), 50.0);
    }
}

mod construction {
    use super::*;

    #[test]
    fn gates_sit_inside_the_walls() {
        let model = Model::new(0, quiet_params(11)).unwrap();

        assert_eq!(model.gates_in().len(), 3);
        assert_eq!(model.gates_out().len(), 2);

        for gate in model.gates_in() {
            assert_eq!(gate.x, 0.0);
            assert!(gate.y > 0.0 && gate.y < 100.0);
        }
        for gate in model.gates_out() {
            assert_eq!(gate.x, 200.0);
            assert!(gate.y > 0.0 && gate.y < 100.0);
        }

        // 3 in-gates split the left wall in quarters.
        assert!((model.gates_in()[0].y - 25.0).abs() < 1e-4);
        assert!((model.gates_in()[1].y - 50.0).abs() < 1e-4);
        assert!((model.gates_in()[2].y - 75.0).abs() < 1e-4);
    }

    #[test]
    fn population_is_generated_idle() {
        let model = Model::new(0, quiet_params(12)).unwrap();

        assert_eq!(model.agents().len(), 40);
        assert_eq!(model.pop_active(), 0);
        assert_eq!(model.pop_finished(), 0);
        assert!(model
            .agents()
            .iter()
            .all(|a| a.status() == AgentStatus::NotStarted));
    }

    #[test]
    fn agent_speeds_descend_from_max() {
        let model = Model::new(0, quiet_params(13)).unwrap();
        let speed_min = model.params().speed_min();

        for agent in model.agents() {
            let speeds = agent.available_speeds();
            assert!(!speeds.is_empty());
            assert_eq!(speeds[0], agent.max_speed());
            assert!(agent.max_speed() > speed_min);
            for pair in speeds.windows(2) {
                assert!(pair[0] > pair[1]);
            }
            for &speed in speeds {
                assert!(speed > speed_min);
            }
        }
    }

    #[test]
    fn degenerate_speed_band_is_rejected() {
        let mut params = quiet_params(14);
        params.set_speed_min(1.0).unwrap();
        params.set_speed_mean(1.0).unwrap();
        assert!(Model::new(0, params).is_err());
    }

    #[test]
    fn same_seed_same_population() {
        let a = Model::new(0, quiet_params(99)).unwrap();
        let b = Model::new(1, quiet_params(99)).unwrap();
        assert_eq!(a.state(), b.state());
    }
}

mod stepping {
    use super::*;

    #[test]
    fn step_advances_the_clock() {
        let mut model = Model::new(0, quiet_params(21)).unwrap();
        assert_eq!(model.step_id(), 0);
        model.step();
        model.step();
        assert_eq!(model.step_id(), 2);
        assert_eq!(model.status(), ModelStatus::Active);
    }

    #[test]
    fn population_counters_stay_consistent() {
        let mut model = Model::new(0, quiet_params(22)).unwrap();
        for _ in 0..200 {
            model.step();
            let idle = model
                .agents()
                .iter()
                .filter(|a| a.status() == AgentStatus::NotStarted)
                .count();
            assert_eq!(
                idle + model.pop_active() + model.pop_finished(),
                model.params().population_total()
            );
        }
    }

    #[test]
    fn step_limit_halts_an_unfinished_run() {
        let mut params = quiet_params(23);
        params.set_step_limit(5).unwrap();
        let mut model = Model::new(0, params).unwrap();

        for _ in 0..10 {
            model.step();
        }
        assert_eq!(model.step_id(), 5);
        assert_eq!(model.status(), ModelStatus::Finished);
        assert!(!model.simulation_finished());
    }

    #[test]
    fn history_records_snapshots_per_step() {
        let mut model = Model::new(0, quiet_params(24)).unwrap();
        for _ in 0..10 {
            model.step();
        }
        assert_eq!(model.history().state_snapshots().len(), 10);
        for snapshot in model.history().state_snapshots() {
            assert_eq!(snapshot.len(), 40);
        }
    }

    #[test]
    fn full_run_evacuates_everyone() {
        let mut params = quiet_params(25);
        params.set_population_total(60).unwrap();
        params.set_step_limit(10_000).unwrap();
        let mut model = Model::new(0, params).unwrap();

        while !model.simulation_finished() && model.is_active() {
            model.step();
        }

        assert!(model.simulation_finished());
        assert_eq!(model.pop_finished(), 60);
        assert_eq!(model.pop_active(), 0);

        let analytics = model.analytics();
        assert_eq!(analytics.finished_count, 60);
        assert!(analytics.mean_steps_taken > 0.0);
        // An unobstructed agent can beat its expectation by at most one
        // step, so the mean delay is bounded below.
        assert!(analytics.mean_steps_delay > -1.0);
    }
}

mod state_contract {
    use super::*;

    #[test]
    fn round_trip_is_idempotent() {
        let mut model = Model::new(0, quiet_params(31)).unwrap();
        for _ in 0..50 {
            model.step();
        }

        let before = model.state();
        model.set_state(&before).unwrap();
        assert_eq!(model.state(), before);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut model = Model::new(0, quiet_params(32)).unwrap();
        let mut state = model.state();
        state.agent_locations.pop();
        assert!(model.set_state(&state).is_err());

        let mut state = model.state();
        state.agent_statuses.push(AgentStatus::Active);
        assert!(model.set_state(&state).is_err());
    }

    #[test]
    fn counters_follow_applied_statuses() {
        let mut model = Model::new(0, quiet_params(33)).unwrap();
        let mut state = model.state();
        state.agent_statuses[0] = AgentStatus::Active;
        state.agent_statuses[1] = AgentStatus::Active;
        state.agent_statuses[2] = AgentStatus::Finished;

        model.set_state(&state).unwrap();
        assert_eq!(model.pop_active(), 2);
        assert_eq!(model.pop_finished(), 1);
    }

    #[test]
    fn perturb_moves_only_active_agents() {
        let mut model = Model::new(0, quiet_params(34)).unwrap();
        let mut state = model.state();
        state.agent_statuses[0] = AgentStatus::Active;
        model.set_state(&state).unwrap();

        let before = model.state();
        model.perturb_state(0.5);
        let after = model.state();

        assert_ne!(after.agent_locations[0], before.agent_locations[0]);
        for i in 1..before.agent_locations.len() {
            assert_eq!(after.agent_locations[i], before.agent_locations[i]);
        }
    }

    #[test]
    fn duplicate_copies_state_but_not_the_stream() {
        let mut model = Model::new(0, quiet_params(35)).unwrap();
        for _ in 0..20 {
            model.step();
        }

        let copy = model.duplicate(1);
        assert_eq!(copy.state(), model.state());
        assert_eq!(copy.step_id(), model.step_id());
        assert_eq!(copy.pop_active(), model.pop_active());
    }
}
