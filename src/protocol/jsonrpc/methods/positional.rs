// Copyright (c) 2025 Kapili RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Implementation of the `Main.Positional` method.
//!
//! Served by a two-stage chain: [`PositionalGuard`] checks the positional array and
//! passes the call on, then [`PositionalHandler`] answers with the same numbers.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tracing::{debug, trace};

use crate::protocol::jsonrpc::context::Context;
use crate::protocol::jsonrpc::error::{JsonRpcError, Result};
use crate::protocol::jsonrpc::handler::{Handler, HandlerResult, SharedHandler};
use crate::protocol::jsonrpc::params;
use crate::protocol::jsonrpc::registry::{MethodRegistry, Shape};

/// Method name under which the chain is registered.
pub const METHOD: &str = "Main.Positional";

/// Result of `Main.Positional`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionalResult {
    /// The numbers that were passed in, in order
    pub message: Vec<i64>,
}

/// First stage: rejects anything but an array of integers, otherwise passes the call on.
#[derive(Debug, Default)]
pub struct PositionalGuard;

#[async_trait]
impl Handler for PositionalGuard {
    async fn serve(&self, _ctx: &mut Context, raw: Option<&RawValue>) -> HandlerResult {
        let numbers: Vec<i64> = params::unmarshal(raw)?;
        trace!(count = numbers.len(), "positional params accepted");
        Ok(None)
    }
}

/// Second stage: answers with the numbers.
#[derive(Debug, Default)]
pub struct PositionalHandler;

#[async_trait]
impl Handler for PositionalHandler {
    async fn serve(&self, _ctx: &mut Context, raw: Option<&RawValue>) -> HandlerResult {
        let numbers: Vec<i64> = params::unmarshal(raw)?;
        debug!(?numbers, "positional");

        serde_json::to_value(PositionalResult { message: numbers })
            .map(Some)
            .map_err(|e| JsonRpcError::internal_error().data(serde_json::Value::String(e.to_string())))
    }
}

/// Registers `Main.Positional` with the registry.
pub fn register_positional_method(registry: &MethodRegistry) -> Result<()> {
    registry.register(
        METHOD,
        Shape::example(&[3_i64, 1, 1, 3, 5, 3]),
        Shape::example(&PositionalResult {
            message: vec![3, 1, 1, 3, 5, 3],
        }),
        [
            Arc::new(PositionalGuard) as SharedHandler,
            Arc::new(PositionalHandler) as SharedHandler,
        ],
    )
}
