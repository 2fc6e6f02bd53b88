//! Gateway service in front of the function.
//!
//! Health-check requests (`GET /_lbgate/health`) are answered here without
//! invoking the function. Everything else is forwarded to the
//! [`LbGateHttpService`].

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use hyper::body::Incoming;
use hyper::service::Service;

use lbgate_http::LbGateResponseBody;
use lbgate_http::service::LbGateHttpService;
use lbgate_invoke::FunctionInvoker;

/// Path answered by the gateway itself.
pub const HEALTH_PATH: &str = "/_lbgate/health";

/// Gateway wrapping the forwarding service.
#[derive(Debug)]
pub struct GatewayService<I: FunctionInvoker> {
    inner: LbGateHttpService<I>,
}

impl<I: FunctionInvoker> GatewayService<I> {
    /// Create a gateway in front of `inner`.
    pub fn new(inner: LbGateHttpService<I>) -> Self {
        Self { inner }
    }
}

impl<I: FunctionInvoker> Clone for GatewayService<I> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<I: FunctionInvoker> Service<http::Request<Incoming>> for GatewayService<I> {
    type Response = http::Response<LbGateResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        if is_health_check(req.method(), req.uri().path()) {
            return Box::pin(async { Ok(health_check_response()) });
        }

        self.inner.call(req)
    }
}

/// Check if the request is a health check probe.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && path == HEALTH_PATH
}

fn health_check_response() -> http::Response<LbGateResponseBody> {
    let mut response =
        http::Response::new(LbGateResponseBody::from_bytes(r#"{"status":"running"}"#));
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    response
}
