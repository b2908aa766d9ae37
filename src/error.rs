use thiserror::Error;

/// Error taxonomy shared by every engine entry point.
///
/// Nothing here is fatal to the process: all variants are per-computation
/// and recoverable by the caller.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("graph inconsistency: {0}")]
    GraphInconsistency(String),
    #[error("computation limit exceeded: {0}")]
    ComputationLimitExceeded(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
