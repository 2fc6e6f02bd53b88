//! JSON envelopes exchanged with the invocation backend.
//!
//! The request envelope is what a load balancer sends to a Lambda target:
//!
//! ```json
//! {
//!   "httpMethod": "POST",
//!   "path": "/orders",
//!   "queryStringParameters": {"a": "1"},
//!   "multiValueQueryStringParameters": {"c": ["3", "4"]},
//!   "headers": {"Content-Type": "text/plain"},
//!   "multiValueHeaders": {"X-Test": ["foo", "foobar"]},
//!   "body": "VGhpcyBpcyB0aGUgYm9keQ==",
//!   "isBase64Encoded": true
//! }
//! ```
//!
//! Maps are `BTreeMap` so that serialization order is deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Single-valued parameter or header map.
pub type SingleValueMap = BTreeMap<String, String>;

/// Multi-valued parameter or header map.
pub type MultiValueMap = BTreeMap<String, Vec<String>>;

/// The request envelope sent to the function.
///
/// A query parameter or header name appears in at most one of the single and
/// multi-value maps. All four maps are always serialized, empty or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRequest {
    /// HTTP method, verbatim.
    pub http_method: String,
    /// Decoded request path without the query string.
    pub path: String,
    /// Query parameters that occurred exactly once.
    pub query_string_parameters: SingleValueMap,
    /// Query parameters that occurred two or more times.
    pub multi_value_query_string_parameters: MultiValueMap,
    /// Headers that occurred exactly once.
    pub headers: SingleValueMap,
    /// Headers that occurred two or more times.
    pub multi_value_headers: MultiValueMap,
    /// Request body, base64 text when `is_base64_encoded`.
    pub body: String,
    /// Whether `body` is base64-encoded.
    pub is_base64_encoded: bool,
}

/// The response envelope returned by the function.
///
/// Every field is optional on the wire; missing or `null` fields take their
/// empty defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    /// HTTP status code of the response.
    #[serde(default)]
    pub status_code: u16,
    /// Reason phrase. Accepted but not echoed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_description: String,
    /// Whether `body` is base64-encoded.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_base64_encoded: bool,
    /// Headers set with overwrite semantics.
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: SingleValueMap,
    /// Headers appended with additive semantics.
    #[serde(default, deserialize_with = "null_as_default")]
    pub multi_value_headers: MultiValueMap,
    /// Response body.
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
