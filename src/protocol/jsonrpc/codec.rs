// Copyright (c) 2025 Kapili RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Wire codec for JSON-RPC payloads.
//!
//! Decoding turns a transport payload into an ordered list of requests plus a flag
//! telling whether the payload was a batch (a JSON array). Encoding does the reverse
//! for responses: a batch is answered with an array, a single request with a bare
//! object, and notifications are never answered.

use bytes::Bytes;
use tracing::{debug, trace};

use super::error::{JsonRpcError, Result};
use super::types::{Request, Response};

/// A decoded transport payload.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// Requests in payload order
    pub requests: Vec<Request>,

    /// True when the payload was a JSON array
    pub batch: bool,
}

/// Decodes a raw payload.
///
/// `max_batch` caps the number of members of a batch; `0` disables the cap.
///
/// # Errors
///
/// * `invalid-request` for an empty payload, an empty batch or an oversized batch
/// * `parse-error` when the payload is not a request object or an array of them
pub fn decode(payload: &[u8], max_batch: usize) -> std::result::Result<Decoded, JsonRpcError> {
    let start = payload
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(payload.len());
    let trimmed = &payload[start..];
    let Some(first) = trimmed.first() else {
        return Err(JsonRpcError::invalid_request());
    };

    if *first != b'[' {
        let request: Request = serde_json::from_slice(trimmed).map_err(|e| {
            debug!(error = %e, "failed to decode request");
            JsonRpcError::parse_error()
        })?;
        return Ok(Decoded {
            requests: vec![request],
            batch: false,
        });
    }

    let requests: Vec<Request> = serde_json::from_slice(trimmed).map_err(|e| {
        debug!(error = %e, "failed to decode batch");
        JsonRpcError::parse_error()
    })?;

    if requests.is_empty() {
        return Err(JsonRpcError::invalid_request());
    }
    if max_batch > 0 && requests.len() > max_batch {
        return Err(JsonRpcError::invalid_request().data(serde_json::json!({
            "batch_size": requests.len(),
            "max_batch_size": max_batch,
        })));
    }

    trace!(size = requests.len(), "decoded batch");
    Ok(Decoded {
        requests,
        batch: true,
    })
}

/// Encodes the responses of one transport call.
///
/// `responses` holds one entry per request; `None` marks a notification and is
/// skipped. A batch made only of notifications encodes to an empty body. Every
/// non-empty body ends with a newline.
///
/// # Errors
///
/// Serialization failures of a response.
pub fn encode(responses: &[Option<Response>], batch: bool) -> Result<Bytes> {
    let answered: Vec<&Response> = responses.iter().flatten().collect();

    let mut body = if batch || answered.len() > 1 {
        if answered.is_empty() {
            return Ok(Bytes::new());
        }
        serde_json::to_vec(&answered)?
    } else {
        match answered.first() {
            Some(response) => serde_json::to_vec(response)?,
            None => return Ok(Bytes::new()),
        }
    };

    body.push(b'\n');
    Ok(Bytes::from(body))
}
