//! Configuration management for LbGate.
//!
//! All configuration is driven by environment variables. The invoker section
//! also deserializes from camelCase JSON (`functionArn`, `accessKey`, ...) so a
//! host that embeds the gateway can feed it from its own config files.

use std::fmt;
use std::time::Duration;

use crate::error::{LbGateError, LbGateResult};
use crate::types::{AwsRegion, FunctionId};

/// Default bound on a single function invocation, in seconds.
const DEFAULT_INVOKE_TIMEOUT_SECS: u64 = 30;

/// Global configuration for the LbGate server.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LbGateConfig {
    /// Bind address for the gateway.
    pub gateway_listen: String,
    /// Log level.
    pub log_level: String,
    /// Target function and connection settings.
    pub invoker: InvokerConfig,
}

impl Default for LbGateConfig {
    fn default() -> Self {
        Self {
            gateway_listen: "0.0.0.0:8080".to_owned(),
            log_level: "info".to_owned(),
            invoker: InvokerConfig::default(),
        }
    }
}

impl LbGateConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        config.invoker = InvokerConfig::from_lookup(&lookup);

        config
    }
}

/// Settings for the connection to the invocation backend.
///
/// Read once at startup and never mutated afterwards.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvokerConfig {
    /// Function name or ARN to invoke (required).
    pub function_arn: String,
    /// Signing region. Falls back to the ARN region, then `us-east-1`.
    pub region: Option<String>,
    /// Endpoint override, e.g. a local emulator.
    pub endpoint: Option<String>,
    /// Static access key id.
    pub access_key: Option<String>,
    /// Static secret access key.
    pub secret_key: Option<String>,
    /// Bound on a single invocation, in seconds.
    pub invoke_timeout_secs: u64,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            function_arn: String::new(),
            region: None,
            endpoint: None,
            access_key: None,
            secret_key: None,
            invoke_timeout_secs: DEFAULT_INVOKE_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for InvokerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvokerConfig")
            .field("function_arn", &self.function_arn)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "..."))
            .field("invoke_timeout_secs", &self.invoke_timeout_secs)
            .finish()
    }
}

/// A static access key pair taken from configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticKeys {
    /// Access key id.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
}

impl fmt::Debug for StaticKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticKeys")
            .field("access_key", &self.access_key)
            .field("secret_key", &"...")
            .finish()
    }
}

impl InvokerConfig {
    /// Create a configuration targeting the given function with defaults elsewhere.
    #[must_use]
    pub fn for_function(function_arn: impl Into<String>) -> Self {
        Self {
            function_arn: function_arn.into(),
            ..Self::default()
        }
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self {
            function_arn: non_empty("LAMBDA_FUNCTION_ARN").unwrap_or_default(),
            region: non_empty("LAMBDA_REGION")
                .or_else(|| non_empty("AWS_REGION"))
                .or_else(|| non_empty("AWS_DEFAULT_REGION")),
            endpoint: non_empty("LAMBDA_ENDPOINT"),
            access_key: non_empty("LAMBDA_ACCESS_KEY"),
            secret_key: non_empty("LAMBDA_SECRET_KEY"),
            ..Self::default()
        };

        if let Some(v) = non_empty("LAMBDA_INVOKE_TIMEOUT_SECS") {
            match v.parse() {
                Ok(secs) => config.invoke_timeout_secs = secs,
                Err(_) => {
                    tracing::warn!(value = %v, "ignoring invalid LAMBDA_INVOKE_TIMEOUT_SECS");
                }
            }
        }

        config
    }

    /// Check the configuration and return the parsed function identifier.
    pub fn validate(&self) -> LbGateResult<FunctionId> {
        let function_id = FunctionId::new(self.function_arn.clone())?;

        if self.invoke_timeout_secs == 0 {
            return Err(LbGateError::Config(
                "invoke timeout must be greater than zero".to_owned(),
            ));
        }

        if let Some(endpoint) = &self.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(LbGateError::Config(format!(
                    "endpoint must be an http(s) URL, got {endpoint}"
                )));
            }
        }

        if self.access_key.is_some() != self.secret_key.is_some() {
            return Err(LbGateError::Config(
                "access key and secret key must be set together".to_owned(),
            ));
        }

        Ok(function_id)
    }

    /// The region requests are signed for.
    #[must_use]
    pub fn resolved_region(&self) -> AwsRegion {
        self.region
            .as_deref()
            .filter(|r| !r.is_empty())
            .map(AwsRegion::new)
            .or_else(|| {
                FunctionId::new(self.function_arn.clone())
                    .ok()
                    .and_then(|id| id.arn_region())
            })
            .unwrap_or_default()
    }

    /// The endpoint override without a trailing slash, if one is set.
    ///
    /// Without an override the regional service endpoint is used.
    #[must_use]
    pub fn endpoint_override(&self) -> Option<String> {
        self.endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .map(|e| e.trim_end_matches('/').to_owned())
    }

    /// The static key pair, when both halves are configured.
    #[must_use]
    pub fn static_keys(&self) -> Option<StaticKeys> {
        match (&self.access_key, &self.secret_key) {
            (Some(access_key), Some(secret_key))
                if !access_key.is_empty() && !secret_key.is_empty() =>
            {
                Some(StaticKeys {
                    access_key: access_key.clone(),
                    secret_key: secret_key.clone(),
                })
            }
            _ => None,
        }
    }

    /// Bound on a single invocation.
    #[must_use]
    pub fn invoke_timeout(&self) -> Duration {
        Duration::from_secs(self.invoke_timeout_secs)
    }
}
