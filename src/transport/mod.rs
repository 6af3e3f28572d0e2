//! Transport module for the Kapili RPC server.
//!
//! Transports own the network side of a call: they read one payload, hand it to the
//! [`Dispatcher`](crate::protocol::jsonrpc::Dispatcher) together with a cancellation
//! token, and write back the reply.

pub mod http;

pub use http::{HttpServer, HttpServerConfig};
