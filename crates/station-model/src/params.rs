//! Run configuration for a single model.
//!
//! Fields are private and only reachable through validated setters: every
//! numeric field must be strictly positive, and a rejected value leaves the
//! previous one untouched.  Parameters are read-heavy after construction:
//! a model copies them once and never writes them back.

use crate::error::{ModelError, ModelResult};

/// Immutable-per-run configuration bundle.
///
/// `Default` reproduces the reference scenario: a 200 m × 100 m concourse,
/// 40 pedestrians, three entrance gates and two exit gates.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelParameters {
    population_total: usize,

    space_width:  f32,
    space_height: f32,

    gates_in_count:  usize,
    gates_out_count: usize,
    gates_space: f32,
    gates_speed: f32,

    speed_min:  f32,
    speed_mean: f32,
    speed_std:  f32,
    speed_steps: u32,

    separation: f32,
    max_wiggle: f32,

    step_limit: u64,

    do_history: bool,
    do_print:   bool,

    random_seed: u64,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            population_total: 40,
            space_width:      200.0,
            space_height:     100.0,
            gates_in_count:   3,
            gates_out_count:  2,
            gates_space:      1.0,
            gates_speed:      1.0,
            speed_min:        0.2,
            speed_mean:       1.0,
            speed_std:        1.0,
            speed_steps:      3,
            separation:       2.0,
            max_wiggle:       1.0,
            step_limit:       3600,
            do_history:       true,
            do_print:         true,
            random_seed:      rand::random(),
        }
    }
}

/// Reject non-positive values without mutating the target field.
macro_rules! positive_setter {
    ($(#[$attr:meta])* $setter:ident, $getter:ident, $field:ident, f32) => {
        $(#[$attr])*
        pub fn $setter(&mut self, value: f32) -> ModelResult<()> {
            if !(value > 0.0) {
                return Err(ModelError::InvalidArgument {
                    name:  stringify!($field),
                    value: value as f64,
                });
            }
            self.$field = value;
            Ok(())
        }

        #[inline]
        pub fn $getter(&self) -> f32 {
            self.$field
        }
    };
    ($(#[$attr:meta])* $setter:ident, $getter:ident, $field:ident, $int:ty) => {
        $(#[$attr])*
        pub fn $setter(&mut self, value: $int) -> ModelResult<()> {
            if value == 0 {
                return Err(ModelError::InvalidArgument {
                    name:  stringify!($field),
                    value: 0.0,
                });
            }
            self.$field = value;
            Ok(())
        }

        #[inline]
        pub fn $getter(&self) -> $int {
            self.$field
        }
    };
}

impl ModelParameters {
    positive_setter!(
        /// Total number of pedestrians the model generates.
        set_population_total, population_total, population_total, usize
    );
    positive_setter!(set_space_width, space_width, space_width, f32);
    positive_setter!(set_space_height, space_height, space_height, f32);
    positive_setter!(set_gates_in_count, gates_in_count, gates_in_count, usize);
    positive_setter!(set_gates_out_count, gates_out_count, gates_out_count, usize);
    positive_setter!(
        /// Vertical spread around a gate; also the exit-capture radius.
        set_gates_space, gates_space, gates_space, f32
    );
    positive_setter!(
        /// Rate of the exponential activation-delay distribution.
        set_gates_speed, gates_speed, gates_speed, f32
    );
    positive_setter!(set_speed_min, speed_min, speed_min, f32);
    positive_setter!(set_speed_mean, speed_mean, speed_mean, f32);
    positive_setter!(set_speed_std, speed_std, speed_std, f32);
    positive_setter!(
        /// Number of deceleration steps between an agent's max and min speed.
        set_speed_steps, speed_steps, speed_steps, u32
    );
    positive_setter!(
        /// Minimum distance two active agents may approach each other.
        set_separation, separation, separation, f32
    );
    positive_setter!(set_max_wiggle, max_wiggle, max_wiggle, f32);
    positive_setter!(set_step_limit, step_limit, step_limit, u64);

    pub fn set_do_history(&mut self, value: bool) {
        self.do_history = value;
    }

    #[inline]
    pub fn do_history(&self) -> bool {
        self.do_history
    }

    pub fn set_do_print(&mut self, value: bool) {
        self.do_print = value;
    }

    #[inline]
    pub fn do_print(&self) -> bool {
        self.do_print
    }

    pub fn set_random_seed(&mut self, value: u64) {
        self.random_seed = value;
    }

    #[inline]
    pub fn random_seed(&self) -> u64 {
        self.random_seed
    }
}
