//! Conversion between live HTTP messages and stored interaction records.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{HeaderMap, HeaderName, HeaderValue};

use crate::cassette::format::{Body, CapturedRequest, CapturedResponse, HeaderText, Interaction};
use crate::censor::Censors;
use crate::error::VcrError;
use crate::ports::transport::{HttpRequest, HttpResponse};

/// Extension attached to responses served from a cassette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replayed {
    /// When the replayed interaction was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Duration of the original real call in milliseconds.
    pub duration_ms: u64,
}

fn capture_headers(headers: &HeaderMap) -> Vec<(String, HeaderText)> {
    headers
        .iter()
        .map(|(name, value)| (name.as_str().to_string(), HeaderText::from_bytes(value.as_bytes())))
        .collect()
}

/// Capture a censored copy of `request`. The live request is not modified.
#[must_use]
pub fn to_request(request: &HttpRequest, censors: &Censors) -> CapturedRequest {
    let mut captured = CapturedRequest {
        method: request.method().as_str().to_string(),
        uri: request.uri().to_string(),
        headers: capture_headers(request.headers()),
        body: Body::from_bytes(request.body()),
    };
    censors.apply_to_request(&mut captured);
    captured
}

/// Capture a censored copy of `response`. The live response is not modified.
#[must_use]
pub fn to_response(response: &HttpResponse, censors: &Censors) -> CapturedResponse {
    let mut captured = CapturedResponse {
        status: response.status().as_u16(),
        headers: capture_headers(response.headers()),
        body: Body::from_bytes(response.body()),
    };
    censors.apply_to_response(&mut captured);
    captured
}

/// Rebuild a live response from a stored interaction.
///
/// Status, headers and body bytes are reproduced exactly as stored, so
/// censored values stay censored. The response takes the HTTP version of
/// `request` and carries a [`Replayed`] extension.
///
/// # Errors
///
/// Returns [`VcrError::InvalidInteraction`] if the stored status or a header
/// cannot be represented.
pub fn to_live_response(
    interaction: &Interaction,
    request: &HttpRequest,
) -> Result<HttpResponse, VcrError> {
    let stored = &interaction.response;
    let mut builder = http::Response::builder()
        .status(stored.status)
        .version(request.version())
        .extension(Replayed {
            recorded_at: interaction.recorded_at,
            duration_ms: interaction.duration_ms,
        });
    for (name, value) in &stored.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| VcrError::InvalidInteraction(format!("header name {name:?}: {e}")))?;
        let value = HeaderValue::from_bytes(value.as_bytes())
            .map_err(|e| VcrError::InvalidInteraction(format!("header {name}: {e}")))?;
        builder = builder.header(name, value);
    }
    builder
        .body(Bytes::copy_from_slice(stored.body.as_bytes()))
        .map_err(|e| VcrError::InvalidInteraction(e.to_string()))
}
