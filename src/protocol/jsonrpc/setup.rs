// Copyright (c) 2025 Kapili RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Setup and initialization utilities for the JSON-RPC dispatcher.
//!
//! This module registers the built-in methods and middleware used by the Kapili
//! server binary.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::protocol::jsonrpc::context::Context;
use crate::protocol::jsonrpc::error::Result;
use crate::protocol::jsonrpc::handler::{Flow, Middleware};
use crate::protocol::jsonrpc::methods::{register_echo_method, register_positional_method};
use crate::protocol::jsonrpc::registry::MethodRegistry;

/// Middleware that logs every incoming call.
///
/// It stops the middleware pipeline once the call has been logged; dispatch still
/// happens. Only the payload size is logged, since the same body is shared by every
/// call of a batch.
#[derive(Debug, Default)]
pub struct RequestLogger;

#[async_trait]
impl Middleware for RequestLogger {
    async fn handle(&self, ctx: &mut Context) -> Flow {
        debug!(size = ctx.body().len(), "incoming call");
        ctx.abort_pipeline();
        Flow::Abort(None)
    }
}

/// Registers all standard methods and middleware.
///
/// This function should be called once during server initialization, before the
/// registry is shared with a dispatcher.
pub fn register_standard_methods(registry: &mut MethodRegistry) -> Result<()> {
    registry.use_middleware(Arc::new(RequestLogger));

    register_echo_method(registry)?;
    register_positional_method(registry)?;

    Ok(())
}

/// Creates a registry with all standard methods pre-registered.
pub fn create_registry() -> Result<MethodRegistry> {
    let mut registry = MethodRegistry::new();
    register_standard_methods(&mut registry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::jsonrpc::Dispatcher;
    use bytes::Bytes;
    use serde_json::{json, Value};
    use tokio_util::sync::CancellationToken;

    async fn call(payload: &str) -> Value {
        let dispatcher = Dispatcher::new(Arc::new(create_registry().unwrap()));
        let reply = dispatcher.handle_detached(payload.to_string()).await;
        serde_json::from_slice(&reply.body).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_echo_method_registered() {
        let response = call(r#"{"jsonrpc":"2.0","method":"Main.Echo","params":{"name":"John Doe"},"id":"1234"}"#).await;
        assert_eq!(
            response,
            json!({ "jsonrpc": "2.0", "result": { "message": "Hello, John Doe" }, "id": "1234" })
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_positional_method_registered() {
        let response = call(r#"{"jsonrpc":"2.0","method":"Main.Positional","params":[3,1,1,3,5,3],"id":"1234"}"#).await;
        assert_eq!(response["result"], json!({ "message": [3, 1, 1, 3, 5, 3] }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unknown_method_returns_error() {
        let response = call(r#"{"jsonrpc":"2.0","method":"Foo.Bar","id":3}"#).await;
        assert!(response.get("result").is_none());
        assert_eq!(response["error"]["code"], -32601);
        assert_eq!(response["id"], 3);
    }

    #[tokio::test]
    async fn test_request_logger_stops_pipeline() {
        let mut ctx = Context::new(CancellationToken::new(), Bytes::from_static(br#"{"a":1}"#));
        assert_eq!(RequestLogger.handle(&mut ctx).await, Flow::Abort(None));
        assert!(!ctx.should_continue());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_request_logger_lets_every_batch_call_through() {
        let dispatcher = Dispatcher::new(Arc::new(create_registry().unwrap()));
        let reply = dispatcher
            .handle_detached(
                r#"[{"jsonrpc":"2.0","method":"Main.Echo","params":{"name":"a"},"id":1},{"jsonrpc":"2.0","method":"Main.Positional","params":[2],"id":2}]"#,
            )
            .await;
        let responses: Value = serde_json::from_slice(&reply.body).unwrap();

        assert_eq!(responses[0]["result"]["message"], "Hello, a");
        assert_eq!(responses[1]["result"]["message"], json!([2]));
    }
}
