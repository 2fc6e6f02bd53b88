//! LbGate Server - forwards HTTP requests to a Lambda function.
//!
//! Every inbound request is converted into the load balancer Lambda-target
//! request envelope, sent to the configured function with a synchronous
//! `Invoke`, and the returned envelope is written back as the HTTP response.
//!
//! # Usage
//!
//! ```text
//! LAMBDA_FUNCTION_ARN=arn:aws:lambda:eu-west-1:000000000000:function:api lbgate-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:8080` | Bind address |
//! | `LAMBDA_FUNCTION_ARN` | *(required)* | Function name or ARN to invoke |
//! | `LAMBDA_REGION` | *(from ARN, else `us-east-1`)* | Signing region |
//! | `LAMBDA_ENDPOINT` | *(regional service endpoint)* | Endpoint override |
//! | `LAMBDA_ACCESS_KEY` / `LAMBDA_SECRET_KEY` | *(AWS default credential chain)* | Static credentials |
//! | `LAMBDA_INVOKE_TIMEOUT_SECS` | `30` | Bound on one invocation |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod gateway;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use lbgate_core::LbGateConfig;
use lbgate_http::LbGateHttpService;
use lbgate_invoke::{InvocationClient, LambdaClient};

use crate::gateway::{GatewayService, HEALTH_PATH};

/// Server version logged at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the gateway from configuration.
///
/// Fails when no AWS credentials resolve and no endpoint override is set.
async fn build_gateway(config: &LbGateConfig) -> Result<GatewayService<LambdaClient>> {
    let function_id = config
        .invoker
        .validate()
        .context("invalid invoker configuration")?;
    let lambda = LambdaClient::from_config(&config.invoker)
        .await
        .context("failed to create Lambda client")?;

    info!(
        function = %function_id,
        timeout = ?config.invoker.invoke_timeout(),
        "initializing invocation client",
    );

    let client = InvocationClient::new(
        Arc::new(lambda),
        function_id,
        config.invoker.invoke_timeout(),
    );
    Ok(GatewayService::new(LbGateHttpService::new(client)))
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: GatewayService<LambdaClient>) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Probe a running gateway's health endpoint.
///
/// Succeeds if the response is 200 OK and reports a running status.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request =
        format!("GET {HEALTH_PATH} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

/// Address the health probe connects to for a given listen address.
fn probe_addr(listen_addr: &str) -> String {
    listen_addr.replace("0.0.0.0", "127.0.0.1")
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = LbGateConfig::from_env();

    // Handle --health-check flag for container health probes.
    if std::env::args().any(|a| a == "--health-check") {
        let healthy = run_health_check(&probe_addr(&config.gateway_listen))
            .await
            .is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level)?;

    let gateway = build_gateway(&config).await?;

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, version = VERSION, "starting LbGate Server");

    serve(listener, gateway).await
}
