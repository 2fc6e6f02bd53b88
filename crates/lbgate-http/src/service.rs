//! The hyper `Service` that forwards requests to a function.
//!
//! [`LbGateHttpService`] runs one request through the full pipeline:
//!
//! 1. Build the invocation envelope (reading the body to completion)
//! 2. Invoke the function through the [`InvocationClient`]
//! 3. Project the returned envelope onto the response
//!
//! A failure at any stage is turned into a complete error response at this
//! boundary; nothing from the function is emitted in that case.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use hyper::body::Incoming;
use hyper::service::Service;
use lbgate_invoke::{FunctionInvoker, InvocationClient};
use lbgate_model::GatewayError;
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

use crate::body::LbGateResponseBody;
use crate::request::build_invocation_request;
use crate::response::{error_to_response, project_response};

/// HTTP front of a single function.
///
/// # Type Parameters
///
/// - `I`: The backend performing the raw invocation.
#[derive(Debug)]
pub struct LbGateHttpService<I: FunctionInvoker> {
    client: InvocationClient<I>,
}

impl<I: FunctionInvoker> Clone for LbGateHttpService<I> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}

impl<I: FunctionInvoker> LbGateHttpService<I> {
    /// Create a service forwarding to `client`.
    #[must_use]
    pub fn new(client: InvocationClient<I>) -> Self {
        Self { client }
    }

    /// Process one request and produce the response to send.
    ///
    /// Never fails: errors become error responses carrying `request_id`.
    pub async fn handle<B>(
        &self,
        req: http::Request<B>,
        request_id: &str,
    ) -> http::Response<LbGateResponseBody>
    where
        B: http_body::Body,
        B::Error: std::fmt::Display,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();

        let span = info_span!("request", request_id, %method, path = %path);
        match self.forward(req).instrument(span).await {
            Ok(response) => {
                debug!(
                    request_id,
                    status = response.status().as_u16(),
                    "projected function response"
                );
                response
            }
            Err(err) => {
                warn!(
                    request_id,
                    %method,
                    path = %path,
                    function = %self.client.function_id(),
                    kind = err.kind(),
                    error = %err,
                    "request aborted"
                );
                error_to_response(&err, request_id)
            }
        }
    }

    async fn forward<B>(
        &self,
        req: http::Request<B>,
    ) -> Result<http::Response<LbGateResponseBody>, GatewayError>
    where
        B: http_body::Body,
        B::Error: std::fmt::Display,
    {
        let envelope = build_invocation_request(req).await?;
        debug!(
            single_query = envelope.query_string_parameters.len(),
            multi_query = envelope.multi_value_query_string_parameters.len(),
            encoded = envelope.is_base64_encoded,
            "built invocation envelope"
        );

        let returned = self.client.invoke(&envelope).await?;
        project_response(returned)
    }
}

impl<I: FunctionInvoker> Service<http::Request<Incoming>> for LbGateHttpService<I> {
    type Response = http::Response<LbGateResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move {
            let request_id = Uuid::new_v4().to_string();
            Ok(service.handle(req, &request_id).await)
        })
    }
}
