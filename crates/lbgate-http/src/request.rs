//! Inbound HTTP request to [`InvocationRequest`] conversion.
//!
//! - Query parameters are parsed as form-urlencoded pairs, grouped per name,
//!   and split by cardinality through the value coercion rules.
//! - Headers are split by cardinality only; names are emitted in canonical
//!   MIME form (`x-test` -> `X-Test`).
//! - A body with a declared length of zero is sent as an empty string. Any
//!   other body is read completely and base64-encoded.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use http_body_util::BodyExt;
use lbgate_model::envelope::{MultiValueMap, SingleValueMap};
use lbgate_model::value::partition_query_params;
use lbgate_model::{GatewayError, InvocationRequest, QueryValue};
use percent_encoding::percent_decode_str;

/// Build the invocation envelope for an inbound request.
///
/// The body is read to completion before the envelope is built; a read
/// failure aborts the request with [`GatewayError::BodyRead`].
pub async fn build_invocation_request<B>(
    req: http::Request<B>,
) -> Result<InvocationRequest, GatewayError>
where
    B: http_body::Body,
    B::Error: std::fmt::Display,
{
    let (parts, body) = req.into_parts();
    let (body, is_base64_encoded) = encode_body(body).await?;
    Ok(envelope_from_parts(&parts, body, is_base64_encoded))
}

/// Build the envelope from the request head and an already encoded body.
#[must_use]
pub fn envelope_from_parts(
    parts: &http::request::Parts,
    body: String,
    is_base64_encoded: bool,
) -> InvocationRequest {
    let query = group_query(parts.uri.query().unwrap_or(""));
    let (query_string_parameters, multi_value_query_string_parameters) = partition_query_params(
        query
            .into_iter()
            .map(|(name, values)| (name, QueryValue::from(values))),
    );
    let (headers, multi_value_headers) = partition_headers(&parts.headers);

    InvocationRequest {
        http_method: parts.method.as_str().to_owned(),
        path: decoded_path(&parts.uri),
        query_string_parameters,
        multi_value_query_string_parameters,
        headers,
        multi_value_headers,
        body,
        is_base64_encoded,
    }
}

/// Read and encode the body. Returns the body text and whether it is base64.
async fn encode_body<B>(body: B) -> Result<(String, bool), GatewayError>
where
    B: http_body::Body,
    B::Error: std::fmt::Display,
{
    if body.size_hint().exact() == Some(0) {
        return Ok((String::new(), false));
    }

    let bytes = body
        .collect()
        .await
        .map_err(|e| GatewayError::BodyRead(e.to_string()))?
        .to_bytes();

    Ok((BASE64.encode(&bytes), true))
}

/// The percent-decoded path component of `uri`.
#[must_use]
pub fn decoded_path(uri: &http::Uri) -> String {
    percent_decode_str(uri.path())
        .decode_utf8_lossy()
        .into_owned()
}

/// Group form-urlencoded query pairs by name, preserving value order.
fn group_query(query: &str) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in form_urlencoded::parse(query.as_bytes()) {
        grouped
            .entry(name.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    grouped
}

/// Split headers into the single and multi-value envelope maps.
///
/// Names with one value go to the first map, names with two or more to the
/// second. Values that are not UTF-8 are converted lossily.
#[must_use]
pub fn partition_headers(headers: &http::HeaderMap) -> (SingleValueMap, MultiValueMap) {
    let mut single = BTreeMap::new();
    let mut multi = BTreeMap::new();

    for name in headers.keys() {
        let mut values: Vec<String> = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        let name = canonical_header_name(name.as_str());

        match values.len() {
            0 => {}
            1 => {
                single.insert(name, values.remove(0));
            }
            _ => {
                multi.insert(name, values);
            }
        }
    }

    (single, multi)
}

/// Canonical MIME form of a header name.
///
/// The first letter and every letter following a hyphen are upper-cased, the
/// rest lower-cased. Names containing a byte that is not an RFC 7230 token
/// character are returned unchanged.
#[must_use]
pub fn canonical_header_name(name: &str) -> String {
    if !name.bytes().all(is_token_byte) {
        return name.to_owned();
    }

    let mut upper = true;
    name.chars()
        .map(|c| {
            let mapped = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            mapped
        })
        .collect()
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
