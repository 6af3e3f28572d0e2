// Copyright (c) 2025 Kapili RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Typed decoding of request parameters.

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use tracing::trace;

use super::error::JsonRpcError;

/// Decodes a raw `params` member into `T`.
///
/// # Errors
///
/// `invalid-params` when the member is absent or does not match `T`. The decoder
/// message is attached as error data.
pub fn unmarshal<T: DeserializeOwned>(params: Option<&RawValue>) -> Result<T, JsonRpcError> {
    let Some(params) = params else {
        return Err(JsonRpcError::invalid_params());
    };

    serde_json::from_str(params.get()).map_err(|e| {
        trace!(error = %e, "params did not match the declared shape");
        JsonRpcError::invalid_params().data(serde_json::Value::String(e.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::jsonrpc::error::ErrorCode;
    use serde::Deserialize;
    use test_case::test_case;

    #[derive(Debug, Deserialize, PartialEq)]
    struct EchoParams {
        name: String,
    }

    fn raw(text: &str) -> Box<RawValue> {
        RawValue::from_string(text.to_string()).unwrap()
    }

    #[test]
    fn test_unmarshal_named_params() {
        let params = raw(r#"{"name":"John Doe"}"#);
        let decoded: EchoParams = unmarshal(Some(&params)).unwrap();
        assert_eq!(decoded.name, "John Doe");
    }

    #[test]
    fn test_unmarshal_positional_params() {
        let params = raw("[3, 1, 1, 3, 5, 3]");
        let decoded: Vec<i64> = unmarshal(Some(&params)).unwrap();
        assert_eq!(decoded, vec![3, 1, 1, 3, 5, 3]);
    }

    #[test]
    fn test_missing_params_are_invalid() {
        let err = unmarshal::<EchoParams>(None).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorCode::InvalidParams));
        assert!(err.data.is_none());
    }

    #[test_case(r#"{"nom":"x"}"# ; "missing field")]
    #[test_case(r#"{"name":1}"# ; "wrong type")]
    #[test_case("[1,2]" ; "positional instead of named")]
    fn test_mismatched_params_are_invalid(text: &str) {
        let params = raw(text);
        let err = unmarshal::<EchoParams>(Some(&params)).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorCode::InvalidParams));
        assert!(err.data.is_some());
    }
}
