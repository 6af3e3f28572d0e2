//! Protocol module for the Kapili RPC server.
//!
//! This module implements JSON-RPC 2.0 dispatch: decoding, middleware, method
//! routing and response correlation.

pub mod jsonrpc;
