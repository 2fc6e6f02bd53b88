//! Lambda `Invoke` client built on the AWS SDK.
//!
//! Credentials come from the SDK default chain (environment, shared config
//! and credentials files, SSO, web identity, container and instance roles)
//! unless a static key pair is configured. A client that resolves no
//! credentials is only accepted for an endpoint override, where it signs with
//! placeholder keys that local emulators ignore.

use std::fmt;

use aws_config::BehaviorVersion;
use aws_config::retry::RetryConfig;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_lambda::config::{Credentials, Region};
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use bytes::Bytes;
use lbgate_core::{AwsRegion, FunctionId, InvokerConfig, LbGateError, LbGateResult};
use lbgate_model::GatewayError;
use tracing::{debug, info, warn};

use crate::invoker::{FunctionInvoker, InvokeFuture, InvokeOutput};

/// Provider name attached to credentials built from configured keys.
const STATIC_PROVIDER: &str = "lbgate-static";

/// Provider name of the placeholder keys used against emulators.
const PLACEHOLDER_PROVIDER: &str = "lbgate-placeholder";

/// Client for the Lambda `Invoke` API.
///
/// Built once at startup and shared read-only by every request.
#[derive(Clone)]
pub struct LambdaClient {
    client: aws_sdk_lambda::Client,
    region: AwsRegion,
    endpoint: Option<String>,
    access_key_id: Option<String>,
}

impl fmt::Debug for LambdaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LambdaClient")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

impl LambdaClient {
    /// Create a client from the invoker configuration.
    ///
    /// Static keys from the configuration take precedence over the default
    /// credential chain. Retries are disabled; the invocation timeout is the
    /// only bound on a call.
    ///
    /// # Errors
    ///
    /// Returns [`LbGateError::Config`] when no credentials resolve and no
    /// endpoint override is set.
    pub async fn from_config(config: &InvokerConfig) -> LbGateResult<Self> {
        let region = config.resolved_region();
        let endpoint = config.endpoint_override();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.as_str().to_owned()))
            .retry_config(RetryConfig::disabled());
        if let Some(endpoint) = &endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        if let Some(keys) = config.static_keys() {
            loader = loader.credentials_provider(Credentials::new(
                keys.access_key,
                keys.secret_key,
                None,
                None,
                STATIC_PROVIDER,
            ));
        }
        let sdk_config = loader.load().await;

        let resolved = match sdk_config.credentials_provider() {
            Some(provider) => provider
                .provide_credentials()
                .await
                .map_err(|e| DisplayErrorContext(e).to_string()),
            None => Err("no credentials provider configured".to_owned()),
        };

        let mut builder = aws_sdk_lambda::config::Builder::from(&sdk_config);
        let access_key_id = match (resolved, &endpoint) {
            (Ok(credentials), _) => Some(credentials.access_key_id().to_owned()),
            (Err(reason), Some(endpoint)) => {
                warn!(
                    %endpoint,
                    %reason,
                    "no AWS credentials resolved, using placeholder keys for the endpoint override"
                );
                builder = builder.credentials_provider(Credentials::new(
                    "lbgate",
                    "lbgate",
                    None,
                    None,
                    PLACEHOLDER_PROVIDER,
                ));
                None
            }
            (Err(reason), None) => {
                return Err(LbGateError::Config(format!(
                    "no AWS credentials resolved ({reason}); configure static keys, \
                     ambient AWS credentials, or an endpoint override"
                )));
            }
        };

        let client = Self {
            client: aws_sdk_lambda::Client::from_conf(builder.build()),
            region,
            endpoint,
            access_key_id,
        };

        info!(
            region = %client.region,
            endpoint = client.endpoint.as_deref().unwrap_or("default"),
            signed = client.is_signed(),
            "configured Lambda client"
        );

        Ok(client)
    }

    /// Whether calls are signed with resolved credentials.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.access_key_id.is_some()
    }

    async fn call(
        &self,
        function_id: &FunctionId,
        payload: Bytes,
    ) -> Result<InvokeOutput, GatewayError> {
        debug!(function = %function_id, bytes = payload.len(), "invoking function");

        let result = self
            .client
            .invoke()
            .function_name(function_id.as_str())
            .invocation_type(InvocationType::RequestResponse)
            .payload(Blob::new(Vec::from(payload)))
            .send()
            .await;

        match result {
            Ok(output) => Ok(InvokeOutput {
                status_code: u16::try_from(output.status_code()).unwrap_or_default(),
                payload: output
                    .payload()
                    .map(|blob| Bytes::copy_from_slice(blob.as_ref()))
                    .unwrap_or_default(),
                function_error: output.function_error().map(ToOwned::to_owned),
            }),
            // A service answer with an error status is reported like any
            // other non-200 invocation.
            Err(err) => match err.raw_response() {
                Some(raw) if raw.status().as_u16() != 200 => Ok(InvokeOutput {
                    status_code: raw.status().as_u16(),
                    payload: raw
                        .body()
                        .bytes()
                        .map(Bytes::copy_from_slice)
                        .unwrap_or_default(),
                    function_error: None,
                }),
                _ => Err(GatewayError::Transport(
                    DisplayErrorContext(&err).to_string(),
                )),
            },
        }
    }
}

impl FunctionInvoker for LambdaClient {
    fn invoke<'a>(&'a self, function_id: &'a FunctionId, payload: Bytes) -> InvokeFuture<'a> {
        Box::pin(self.call(function_id, payload))
    }
}
