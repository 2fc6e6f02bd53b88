//! The raw invoke capability.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use lbgate_core::FunctionId;
use lbgate_model::GatewayError;

/// Future returned by [`FunctionInvoker::invoke`].
pub type InvokeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<InvokeOutput, GatewayError>> + Send + 'a>>;

/// Result of a completed call to the invocation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeOutput {
    /// Transport-level status of the call (200 on success).
    pub status_code: u16,
    /// Raw payload returned by the function.
    pub payload: Bytes,
    /// Function error kind reported by the backend (`Unhandled`, ...).
    pub function_error: Option<String>,
}

impl InvokeOutput {
    /// A successful result carrying `payload`.
    pub fn ok(payload: impl Into<Bytes>) -> Self {
        Self {
            status_code: 200,
            payload: payload.into(),
            function_error: None,
        }
    }
}

/// Trait that the invocation backend must implement.
///
/// Implementations are shared by every in-flight request and must not hold
/// per-request state. A network or protocol failure is reported as
/// [`GatewayError::Transport`]; a completed call with a non-success status is
/// returned as an [`InvokeOutput`] for the caller to judge.
pub trait FunctionInvoker: Send + Sync + 'static {
    /// Invoke `function_id` synchronously with `payload`.
    fn invoke<'a>(&'a self, function_id: &'a FunctionId, payload: Bytes) -> InvokeFuture<'a>;
}
