// Copyright (c) 2025 Kapili RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Types for the JSON-RPC 2.0 protocol.
//!
//! Request parameters and identifiers are kept as raw JSON text
//! ([`RawValue`]) so that the dispatcher never re-types them: a response echoes the
//! id exactly as the client spelled it, and handlers decide how to read their params.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::Value;

use super::error::JsonRpcError;

/// The only protocol version this dispatcher speaks.
pub const VERSION: &str = "2.0";

/// A JSON-RPC 2.0 request object.
///
/// Missing `jsonrpc` and `method` members decode to empty strings so that structural
/// problems surface as `invalid-request` responses at lookup time rather than as a
/// parse failure of the whole payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Request {
    /// JSON-RPC protocol version, expected to be "2.0"
    #[serde(default)]
    pub jsonrpc: String,

    /// Name of the method to be invoked
    #[serde(default)]
    pub method: String,

    /// Method parameters, left undecoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Box<RawValue>>,

    /// Request identifier, if None then the request is a notification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Box<RawValue>>,
}

impl Request {
    /// Creates a new JSON-RPC 2.0 request.
    pub fn new(
        method: impl Into<String>,
        params: Option<Box<RawValue>>,
        id: Option<Box<RawValue>>,
    ) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }

    /// Returns true if this request is a notification (no id).
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Returns the raw id text, if any.
    pub fn id_str(&self) -> Option<&str> {
        self.id.as_deref().map(RawValue::get)
    }
}

/// A JSON-RPC 2.0 response object.
///
/// Exactly one of `result` and `error` appears on the wire. Without an error the
/// `result` member is written even when the handler chain produced nothing, as `null`.
#[derive(Debug, Clone)]
pub struct Response {
    /// JSON-RPC protocol version, always "2.0"
    pub jsonrpc: &'static str,

    /// The result of the method invocation
    pub result: Option<Value>,

    /// The error object, if an error occurred
    pub error: Option<JsonRpcError>,

    /// Same identifier as the request this is responding to, `null` when unknown
    pub id: Option<Box<RawValue>>,
}

impl Response {
    /// Creates an empty response correlated with `request`.
    pub fn for_request(request: &Request) -> Self {
        Self {
            jsonrpc: VERSION,
            result: None,
            error: None,
            id: request.id.clone(),
        }
    }

    /// Creates an error response correlated with `request`.
    pub fn error_for(request: &Request, error: JsonRpcError) -> Self {
        Self {
            error: Some(error),
            ..Self::for_request(request)
        }
    }

    /// Creates an error response that cannot be tied to any request, such as a
    /// parse failure of the whole payload.
    pub fn uncorrelated(error: JsonRpcError) -> Self {
        Self {
            jsonrpc: VERSION,
            result: None,
            error: Some(error),
            id: None,
        }
    }

    /// Returns the raw id text, if any.
    pub fn id_str(&self) -> Option<&str> {
        self.id.as_deref().map(RawValue::get)
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Response", 3)?;
        state.serialize_field("jsonrpc", self.jsonrpc)?;
        match &self.error {
            Some(error) => state.serialize_field("error", error)?,
            None => state.serialize_field("result", &self.result)?,
        }
        state.serialize_field("id", &self.id)?;
        state.end()
    }
}
