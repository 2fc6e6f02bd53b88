//! Envelope-level adapter over a [`FunctionInvoker`].

use std::sync::Arc;
use std::time::Duration;

use lbgate_core::FunctionId;
use lbgate_model::{GatewayError, InvocationRequest, InvocationResponse};
use tracing::debug;

use crate::invoker::FunctionInvoker;

/// Maximum number of payload bytes quoted in an error message.
const ERROR_EXCERPT_LEN: usize = 256;

/// Sends request envelopes to one function and decodes its response envelopes.
///
/// The function identifier and timeout are fixed at construction. Clones share
/// the same invoker.
#[derive(Debug)]
pub struct InvocationClient<I: FunctionInvoker> {
    invoker: Arc<I>,
    function_id: FunctionId,
    timeout: Duration,
}

impl<I: FunctionInvoker> Clone for InvocationClient<I> {
    fn clone(&self) -> Self {
        Self {
            invoker: Arc::clone(&self.invoker),
            function_id: self.function_id.clone(),
            timeout: self.timeout,
        }
    }
}

impl<I: FunctionInvoker> InvocationClient<I> {
    /// Create an adapter for `function_id` over `invoker`.
    pub fn new(invoker: Arc<I>, function_id: FunctionId, timeout: Duration) -> Self {
        Self {
            invoker,
            function_id,
            timeout,
        }
    }

    /// The function this adapter invokes.
    #[must_use]
    pub fn function_id(&self) -> &FunctionId {
        &self.function_id
    }

    /// Invoke the function with `request` and decode its response envelope.
    ///
    /// Any failure is fatal for the current request only: a transport error,
    /// a timeout, a non-200 status, or a reported function error yields
    /// [`GatewayError::Transport`]; an undecodable payload yields
    /// [`GatewayError::Decode`].
    pub async fn invoke(
        &self,
        request: &InvocationRequest,
    ) -> Result<InvocationResponse, GatewayError> {
        let payload = serde_json::to_vec(request)
            .map_err(|e| GatewayError::Transport(format!("failed to encode request: {e}")))?;

        let output = tokio::time::timeout(
            self.timeout,
            self.invoker.invoke(&self.function_id, payload.into()),
        )
        .await
        .map_err(|_| {
            GatewayError::Transport(format!(
                "invocation of {} timed out after {:?}",
                self.function_id, self.timeout
            ))
        })??;

        debug!(
            function = %self.function_id,
            status = output.status_code,
            bytes = output.payload.len(),
            "function returned"
        );

        if output.status_code != 200 {
            return Err(GatewayError::Transport(format!(
                "call to lambda failed with status {}: {}",
                output.status_code,
                excerpt(&output.payload)
            )));
        }

        if let Some(kind) = output.function_error {
            return Err(GatewayError::Transport(format!(
                "function error ({kind}): {}",
                excerpt(&output.payload)
            )));
        }

        serde_json::from_slice(&output.payload).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

fn excerpt(payload: &[u8]) -> String {
    let end = payload.len().min(ERROR_EXCERPT_LEN);
    String::from_utf8_lossy(&payload[..end]).into_owned()
}
