// Copyright (c) 2025 Kapili RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! JSON-RPC 2.0 dispatcher.
//!
//! This module implements the server side of the
//! [JSON-RPC 2.0 specification](https://www.jsonrpc.org/specification): decoding
//! single and batched calls, running a global middleware pipeline, routing each call
//! to the handler chain registered for its method, and encoding correlated responses.
//!
//! # Features
//!
//! - Request ids echoed byte for byte, never re-typed
//! - Batch ordering preserved, notifications executed but never answered
//! - Middleware that can short-circuit a call or merely end the pipeline
//! - Handler chains with pass-through stages
//! - Concurrent-safe registry with a read/write lock
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kapili_rpc::protocol::jsonrpc::{handler_fn, params, Dispatcher, MethodRegistry, Shape};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let registry = MethodRegistry::new();
//! registry
//!     .register(
//!         "Main.Echo",
//!         Shape::none(),
//!         Shape::none(),
//!         [handler_fn(|_ctx, raw| {
//!             let name: String = params::unmarshal(raw)?;
//!             Ok(Some(json!({ "message": format!("Hello, {name}") })))
//!         })],
//!     )
//!     .unwrap();
//!
//! let dispatcher = Dispatcher::new(Arc::new(registry));
//! let reply = dispatcher
//!     .handle_detached(r#"{"jsonrpc":"2.0","method":"Main.Echo","params":"John","id":7}"#)
//!     .await;
//!
//! assert_eq!(
//!     &reply.body[..],
//!     b"{\"jsonrpc\":\"2.0\",\"result\":{\"message\":\"Hello, John\"},\"id\":7}\n"
//! );
//! # });
//! ```

pub mod codec;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod methods;
pub mod params;
pub mod registry;
pub mod setup;
pub mod types;

#[cfg(test)]
mod tests;

// Re-exports
pub use context::Context;
pub use dispatcher::{Dispatcher, DispatcherOptions, Reply, TransportStatus};
pub use error::{Error, ErrorCode, JsonRpcError, Result};
pub use handler::{
    handler_fn, middleware_fn, Flow, Handler, HandlerChain, HandlerResult, Middleware,
    SharedHandler, SharedMiddleware,
};
pub use registry::{Metadata, MethodDescription, MethodRegistry, Shape};
pub use setup::{create_registry, register_standard_methods};
pub use types::{Request, Response, VERSION};
