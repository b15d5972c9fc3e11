//! Error taxonomy for the scoring pipeline.
//!
//! Per-row failure categories stay distinguishable so the batch scorer
//! can skip a row without losing track of why it failed.

use thiserror::Error;

/// Failures surfaced by the prediction client and batch scorer.
#[derive(Debug, Error)]
pub enum PredictionError {
    /// Dataset unreadable, unparsable, or a sample index out of range.
    #[error("data source error: {0}")]
    DataSource(String),

    /// Serving endpoint unreachable.
    #[error("serving endpoint unreachable: {0}")]
    Connection(String),

    /// Request exceeded the configured deadline. No retry is attempted;
    /// callers wanting retries wrap the client themselves.
    #[error("prediction request timed out after {0}s")]
    Timeout(f64),

    /// Response missing an expected output tensor or carrying the wrong arity.
    #[error("malformed serving response: {0}")]
    Protocol(String),

    /// Model directory missing or not exported in the expected layout.
    #[error("model load error: {0}")]
    ModelLoad(String),
}

impl PredictionError {
    /// Whether a batch run may skip the affected row and continue.
    ///
    /// Transport and protocol failures are scoped to a single request;
    /// dataset and model failures poison the whole run.
    pub fn is_row_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Timeout(_) | Self::Protocol(_)
        )
    }
}
