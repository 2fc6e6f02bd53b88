//! Per-request error taxonomy.

/// Errors that abort the processing of a single request.
///
/// None of these affect other in-flight requests. A value that cannot be
/// coerced into a query string is not an error; coercion returns `None`.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The inbound request body could not be read to completion.
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// The call to the invocation backend failed or did not succeed.
    #[error("function invocation failed: {0}")]
    Transport(String),

    /// The returned payload is not a valid response envelope.
    #[error("invalid function response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Short machine-readable name of the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BodyRead(_) => "BodyReadError",
            Self::Transport(_) => "TransportError",
            Self::Decode(_) => "DecodeError",
        }
    }

    /// HTTP status the host answers with when this error aborts a request.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            Self::BodyRead(_) => http::StatusCode::BAD_REQUEST,
            Self::Transport(_) | Self::Decode(_) => http::StatusCode::BAD_GATEWAY,
        }
    }
}
