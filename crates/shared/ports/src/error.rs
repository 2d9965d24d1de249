use thiserror::Error;

/// Errors surfaced by external collaborators
///
/// Gating treats any of these as an indeterminate result and fails closed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("External service timed out: {0}")]
    Timeout(String),

    #[error("External service unavailable: {0}")]
    Unavailable(String),

    #[error("External service rejected the request: {0}")]
    Rejected(String),
}

pub type PortResult<T> = std::result::Result<T, PortError>;
