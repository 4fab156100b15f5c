use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// A configuration field received a non-positive value.
    #[error("invalid argument: {name} must be positive (got {value})")]
    InvalidArgument { name: &'static str, value: f64 },

    /// A state vector does not line up with the agent population.
    #[error("{what} length {got} does not match population {expected}")]
    DimensionMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },
}

pub type ModelResult<T> = Result<T, ModelError>;
