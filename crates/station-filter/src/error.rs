use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    /// The particle population cannot be split evenly across the workers.
    /// Partition math has no degraded mode, so construction fails outright
    /// and the caller terminates the computation.
    #[error("cannot partition {particles} particles across {workers} workers")]
    Partition { particles: usize, workers: usize },

    /// A particle rejected a state it was asked to adopt.
    #[error("particle state rejected: {0}")]
    State(String),

    /// A worker-to-worker exchange failed (peer gone, malformed payload).
    #[error("worker communication failed: {0}")]
    Comm(String),

    /// The particles initialiser could not produce the local population.
    #[error("particle initialisation failed: {0}")]
    Init(String),
}

pub type FilterResult<T> = Result<T, FilterError>;
