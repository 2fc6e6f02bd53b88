//! End-to-end tests for LbGate.
//!
//! Each test starts a mock Lambda `Invoke` endpoint and a gateway on
//! ephemeral loopback ports, then drives the gateway over real HTTP. Nothing
//! outside the test process is contacted.
//!
//! Run them with:
//! ```text
//! cargo test -p lbgate-integration
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use lbgate_core::InvokerConfig;
use lbgate_http::LbGateHttpService;
use lbgate_invoke::{InvocationClient, LambdaClient};

#[cfg(test)]
mod test_errors;

/// Function targeted by every test gateway.
pub const FUNCTION_ARN: &str = "arn:aws:lambda:eu-west-1:000000000000:function:xxx:1";

/// Path the gateway must call for [`FUNCTION_ARN`].
pub const INVOCATION_PATH: &str = "/2015-03-31/functions/arn%3Aaws%3Alambda%3Aeu-west-1%3A000000000000%3Afunction%3Axxx%3A1/invocations";

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A request received by the mock Lambda endpoint.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Request method.
    pub method: http::Method,
    /// Raw request path, as sent on the wire.
    pub path: String,
    /// Request headers.
    pub headers: http::HeaderMap,
    /// Request body.
    pub body: Bytes,
}

impl RecordedCall {
    /// The request body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

/// What the mock Lambda endpoint answers with.
#[derive(Debug, Clone)]
pub struct MockReply {
    /// Transport-level status.
    pub status: u16,
    /// Extra response headers.
    pub headers: Vec<(&'static str, &'static str)>,
    /// Response payload.
    pub body: String,
    /// Delay before answering.
    pub delay: Option<Duration>,
}

impl MockReply {
    /// A successful invocation returning `envelope`.
    #[must_use]
    pub fn envelope(envelope: &serde_json::Value) -> Self {
        Self::raw(200, envelope.to_string())
    }

    /// An arbitrary status and payload.
    #[must_use]
    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            delay: None,
        }
    }

    /// Add a response header.
    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }

    /// Answer only after `delay`.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// An in-process stand-in for the Lambda `Invoke` API.
#[derive(Debug)]
pub struct MockLambda {
    addr: SocketAddr,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    task: JoinHandle<()>,
}

impl MockLambda {
    /// Start the mock on an ephemeral port, answering every call with `reply`.
    pub async fn start(reply: MockReply) -> anyhow::Result<Self> {
        init_tracing();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let calls = Arc::new(Mutex::new(Vec::new()));
        let reply = Arc::new(reply);

        let recorded = Arc::clone(&calls);
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = Arc::clone(&recorded);
                let reply = Arc::clone(&reply);
                tokio::spawn(async move {
                    let svc = service_fn(move |req: http::Request<Incoming>| {
                        answer(req, Arc::clone(&recorded), Arc::clone(&reply))
                    });
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), svc)
                        .await
                    {
                        tracing::debug!(error = %e, "mock lambda connection ended");
                    }
                });
            }
        });

        Ok(Self { addr, calls, task })
    }

    /// Base URL of the mock.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Drop for MockLambda {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn answer(
    req: http::Request<Incoming>,
    recorded: Arc<Mutex<Vec<RecordedCall>>>,
    reply: Arc<MockReply>,
) -> anyhow::Result<http::Response<Full<Bytes>>> {
    let (parts, body) = req.into_parts();
    let body = body.collect().await?.to_bytes();

    if let Ok(mut calls) = recorded.lock() {
        calls.push(RecordedCall {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            headers: parts.headers,
            body,
        });
    }

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let mut builder = http::Response::builder().status(reply.status);
    for (name, value) in &reply.headers {
        builder = builder.header(*name, *value);
    }
    Ok(builder.body(Full::new(Bytes::from(reply.body.clone())))?)
}

/// Invoker settings pointing at `endpoint` with static test credentials.
#[must_use]
pub fn invoker_config(endpoint: &str) -> InvokerConfig {
    let mut config = InvokerConfig::for_function(FUNCTION_ARN);
    config.endpoint = Some(endpoint.to_owned());
    config.access_key = Some("test".to_owned());
    config.secret_key = Some("test".to_owned());
    config
}

/// A gateway served on an ephemeral loopback port.
#[derive(Debug)]
pub struct TestGateway {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl TestGateway {
    /// Start a gateway for `config`.
    pub async fn start(config: &InvokerConfig) -> anyhow::Result<Self> {
        init_tracing();

        let function_id = config.validate()?;
        let lambda = LambdaClient::from_config(config).await?;
        let client =
            InvocationClient::new(Arc::new(lambda), function_id, config.invoke_timeout());
        let service = LbGateHttpService::new(client);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let svc = service.clone();
                tokio::spawn(async move {
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), svc)
                        .await
                    {
                        tracing::debug!(error = %e, "gateway connection ended");
                    }
                });
            }
        });

        Ok(Self { addr, task })
    }

    /// Start a mock Lambda answering with `reply` and a gateway in front of it.
    pub async fn with_mock(reply: MockReply) -> anyhow::Result<(Self, MockLambda)> {
        let mock = MockLambda::start(reply).await?;
        let gateway = Self::start(&invoker_config(&mock.endpoint())).await?;
        Ok((gateway, mock))
    }

    /// URL of `path_and_query` on the gateway.
    #[must_use]
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{path_and_query}", self.addr)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.task.abort();
    }
}
