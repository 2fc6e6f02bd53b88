//! Error types for the LbGate core.

/// Core error type for LbGate infrastructure.
///
/// These errors are raised while building the service and prevent it from
/// starting. Per-request failures live in `lbgate_model::GatewayError`.
#[derive(Debug, thiserror::Error)]
pub enum LbGateError {
    /// The target function identifier is missing or empty.
    #[error("function arn cannot be empty")]
    MissingFunctionId,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for LbGate construction.
pub type LbGateResult<T> = Result<T, LbGateError>;
