// Copyright (c) 2025 Kapili RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Implementation of the `Main.Echo` method.
//!
//! Greets the caller by the name passed as a named parameter.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tracing::debug;

use crate::protocol::jsonrpc::context::Context;
use crate::protocol::jsonrpc::error::{JsonRpcError, Result};
use crate::protocol::jsonrpc::handler::{Handler, HandlerResult, SharedHandler};
use crate::protocol::jsonrpc::params;
use crate::protocol::jsonrpc::registry::{MethodRegistry, Shape};

/// Method name under which [`EchoHandler`] is registered.
pub const METHOD: &str = "Main.Echo";

/// Request parameters for `Main.Echo`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EchoParams {
    /// Name to greet
    pub name: String,
}

/// Result of `Main.Echo`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EchoResult {
    /// Greeting
    pub message: String,
}

/// Answers `Main.Echo` calls.
#[derive(Debug, Default)]
pub struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn serve(&self, ctx: &mut Context, raw: Option<&RawValue>) -> HandlerResult {
        let params: EchoParams = params::unmarshal(raw)?;
        debug!(name = %params.name, id = ?ctx.request_id().ok().flatten().map(RawValue::get), "echo");

        let result = EchoResult {
            message: format!("Hello, {}", params.name),
        };
        serde_json::to_value(result)
            .map(Some)
            .map_err(|e| JsonRpcError::internal_error().data(serde_json::Value::String(e.to_string())))
    }
}

/// Registers `Main.Echo` with the registry.
pub fn register_echo_method(registry: &MethodRegistry) -> Result<()> {
    registry.register(
        METHOD,
        Shape::example(&EchoParams {
            name: "John Doe".to_string(),
        }),
        Shape::example(&EchoResult {
            message: "Hello, John Doe".to_string(),
        }),
        [Arc::new(EchoHandler) as SharedHandler],
    )
}
