//! Projection of [`InvocationResponse`] envelopes onto HTTP responses.
//!
//! The whole response is assembled in memory; nothing is written to the
//! connection until projection has succeeded.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use lbgate_model::{GatewayError, InvocationResponse};

use crate::body::LbGateResponseBody;

/// Header carrying the gateway-assigned request id.
pub const REQUEST_ID_HEADER: &str = "x-amzn-requestid";

/// Build the outbound response described by `envelope`.
///
/// Single-value headers are set first, then multi-value headers are appended.
///
/// # Errors
///
/// Returns [`GatewayError::Decode`] if the status code is outside `100..=999`,
/// a header name or value is not valid HTTP, or the body is flagged as base64
/// but does not decode.
pub fn project_response(
    envelope: InvocationResponse,
) -> Result<http::Response<LbGateResponseBody>, GatewayError> {
    let status = http::StatusCode::from_u16(envelope.status_code).map_err(|_| {
        GatewayError::Decode(format!("invalid status code {}", envelope.status_code))
    })?;

    let body = if envelope.is_base64_encoded {
        BASE64
            .decode(envelope.body.as_bytes())
            .map(Bytes::from)
            .map_err(|e| GatewayError::Decode(format!("invalid base64 body: {e}")))?
    } else {
        Bytes::from(envelope.body)
    };

    let mut response = http::Response::new(LbGateResponseBody::from_bytes(body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    for (name, value) in &envelope.headers {
        headers.insert(header_name(name)?, header_value(name, value)?);
    }
    for (name, values) in &envelope.multi_value_headers {
        let header = header_name(name)?;
        for value in values {
            headers.append(header.clone(), header_value(name, value)?);
        }
    }

    Ok(response)
}

/// Build the response sent when a request aborts with `err`.
///
/// The body names the error kind only; details belong in the logs.
#[must_use]
pub fn error_to_response(
    err: &GatewayError,
    request_id: &str,
) -> http::Response<LbGateResponseBody> {
    let message = match err {
        GatewayError::BodyRead(_) => "failed to read request body",
        GatewayError::Transport(_) => "function invocation failed",
        GatewayError::Decode(_) => "function returned an invalid response",
    };
    let json = serde_json::json!({
        "__type": err.kind(),
        "message": message,
    });

    let mut response = http::Response::new(LbGateResponseBody::from_bytes(json.to_string()));
    *response.status_mut() = err.status_code();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(hv) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, hv);
    }
    response
}

fn header_name(name: &str) -> Result<HeaderName, GatewayError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| GatewayError::Decode(format!("invalid header name {name:?}")))
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, GatewayError> {
    HeaderValue::from_str(value)
        .map_err(|_| GatewayError::Decode(format!("invalid value for header {name:?}")))
}
