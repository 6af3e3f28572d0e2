// Copyright (c) 2025 Kapili RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Error types for the JSON-RPC 2.0 dispatcher.
//!
//! Two families live here. [`JsonRpcError`] is the wire-level error object that ends
//! up inside a response, as defined by the
//! [JSON-RPC 2.0 specification](https://www.jsonrpc.org/specification#error_object).
//! [`Error`] covers failures of the dispatcher machinery itself (registration,
//! encoding, misuse of a context) that never travel to the client as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard JSON-RPC 2.0 error codes.
///
/// The error codes from -32768 to -32000 are reserved for pre-defined errors.
/// The remaining codes in the reserved range are available for application-defined errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Parse error (-32700)
    /// Invalid JSON was received by the server.
    ParseError = -32700,

    /// Invalid Request (-32600)
    /// The JSON sent is not a valid Request object.
    InvalidRequest = -32600,

    /// Method not found (-32601)
    /// The method does not exist / is not available.
    MethodNotFound = -32601,

    /// Invalid params (-32602)
    /// Invalid method parameter(s).
    InvalidParams = -32602,

    /// Internal error (-32603)
    /// Internal JSON-RPC error.
    InternalError = -32603,

    /// Server error (-32000 to -32099)
    /// Reserved for implementation-defined server errors.
    ServerError = -32000,

    /// Application error (-32500)
    /// General application error.
    ApplicationError = -32500,

    /// Request cancelled (-32800)
    /// The request was cancelled before a handler produced an answer.
    RequestCancelled = -32800,
}

impl ErrorCode {
    /// Returns a string description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidRequest => "Invalid Request",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid params",
            ErrorCode::InternalError => "Internal error",
            ErrorCode::ServerError => "Server error",
            ErrorCode::ApplicationError => "Application error",
            ErrorCode::RequestCancelled => "Request cancelled",
        }
    }

    /// Create an ErrorCode from a raw integer value.
    ///
    /// Returns None if the code is not a predefined error code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -32700 => Some(ErrorCode::ParseError),
            -32600 => Some(ErrorCode::InvalidRequest),
            -32601 => Some(ErrorCode::MethodNotFound),
            -32602 => Some(ErrorCode::InvalidParams),
            -32603 => Some(ErrorCode::InternalError),
            -32500 => Some(ErrorCode::ApplicationError),
            -32800 => Some(ErrorCode::RequestCancelled),
            c if (-32099..=-32000).contains(&c) => Some(ErrorCode::ServerError),
            _ => None,
        }
    }

    /// Returns the integer error code.
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> i32 {
        code as i32
    }
}

/// JSON-RPC error object carried in the `error` member of a response.
///
/// Handlers and middleware may build one with any code; application errors travel
/// to the client unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// The error code
    pub code: i32,

    /// A short description of the error
    pub message: String,

    /// Additional information about the error (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    /// Creates a new JSON-RPC error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
        }
    }

    /// Creates an error with an application-defined numeric code.
    pub fn application(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Creates a new JSON-RPC error with additional data.
    pub fn with_data(code: ErrorCode, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Attaches structured data to an existing error.
    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Creates a standard parse error.
    pub fn parse_error() -> Self {
        Self::new(ErrorCode::ParseError, ErrorCode::ParseError.description())
    }

    /// Creates a standard invalid request error.
    pub fn invalid_request() -> Self {
        Self::new(ErrorCode::InvalidRequest, ErrorCode::InvalidRequest.description())
    }

    /// Creates a standard method not found error.
    pub fn method_not_found() -> Self {
        Self::new(ErrorCode::MethodNotFound, ErrorCode::MethodNotFound.description())
    }

    /// Creates a standard invalid params error.
    pub fn invalid_params() -> Self {
        Self::new(ErrorCode::InvalidParams, ErrorCode::InvalidParams.description())
    }

    /// Creates a standard internal error.
    pub fn internal_error() -> Self {
        Self::new(ErrorCode::InternalError, ErrorCode::InternalError.description())
    }

    /// Creates the error returned when a call observed its cancellation signal.
    pub fn request_cancelled() -> Self {
        Self::new(ErrorCode::RequestCancelled, ErrorCode::RequestCancelled.description())
    }

    /// Returns the predefined code this error carries, if any.
    pub fn kind(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.code)
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "jsonrpc error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcError {}

/// Error type for dispatcher operations.
#[derive(Debug, Error)]
pub enum Error {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid method registration; the registry was left unchanged
    #[error("configuration error: {0}")]
    Registration(String),

    /// A correlation id was requested from a context that never had one attached
    #[error("request id was not attached to this context")]
    MissingRequestId,
}

/// Specialized Result type for dispatcher operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_descriptions() {
        assert_eq!(ErrorCode::ParseError.description(), "Parse error");
        assert_eq!(ErrorCode::InvalidRequest.description(), "Invalid Request");
        assert_eq!(ErrorCode::MethodNotFound.description(), "Method not found");
        assert_eq!(ErrorCode::InvalidParams.description(), "Invalid params");
        assert_eq!(ErrorCode::InternalError.description(), "Internal error");
    }

    #[test]
    fn test_error_code_from_code() {
        assert_eq!(ErrorCode::from_code(-32700), Some(ErrorCode::ParseError));
        assert_eq!(ErrorCode::from_code(-32600), Some(ErrorCode::InvalidRequest));
        assert_eq!(ErrorCode::from_code(-32601), Some(ErrorCode::MethodNotFound));
        assert_eq!(ErrorCode::from_code(-32602), Some(ErrorCode::InvalidParams));
        assert_eq!(ErrorCode::from_code(-32603), Some(ErrorCode::InternalError));

        // Server error range
        assert_eq!(ErrorCode::from_code(-32000), Some(ErrorCode::ServerError));
        assert_eq!(ErrorCode::from_code(-32099), Some(ErrorCode::ServerError));
        assert_eq!(ErrorCode::from_code(-32050), Some(ErrorCode::ServerError));

        assert_eq!(ErrorCode::from_code(0), None);
        assert_eq!(ErrorCode::from_code(-1), None);
        assert_eq!(ErrorCode::from_code(100), None);
    }

    #[test]
    fn test_standard_errors_serialize_without_data() {
        let json = serde_json::to_string(&JsonRpcError::method_not_found()).unwrap();
        assert_eq!(json, r#"{"code":-32601,"message":"Method not found"}"#);

        let json = serde_json::to_string(&JsonRpcError::parse_error()).unwrap();
        assert_eq!(json, r#"{"code":-32700,"message":"Parse error"}"#);
    }

    #[test]
    fn test_error_with_data() {
        let error = JsonRpcError::with_data(
            ErrorCode::InvalidParams,
            "Invalid parameters",
            serde_json::json!({"field": "name"}),
        );
        assert_eq!(error.code, -32602);
        assert_eq!(error.kind(), Some(ErrorCode::InvalidParams));
        assert_eq!(error.data, Some(serde_json::json!({"field": "name"})));

        let app = JsonRpcError::application(42, "quota exhausted").data(serde_json::json!(7));
        assert_eq!(app.kind(), None);
        assert_eq!(app.data, Some(serde_json::json!(7)));
    }

    #[test]
    fn test_dispatcher_error_display() {
        let json_error = Error::Json(serde_json::from_str::<serde_json::Value>("{").unwrap_err());
        assert!(json_error.to_string().starts_with("JSON error"));

        let registration = Error::Registration("method name must not be empty".to_string());
        assert!(registration.to_string().starts_with("configuration error"));

        assert_eq!(
            Error::MissingRequestId.to_string(),
            "request id was not attached to this context"
        );
    }
}
