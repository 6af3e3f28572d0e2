//! Kapili RPC Library
//!
//! This library contains the core components of the Kapili RPC server: a JSON-RPC 2.0
//! dispatcher with middleware pipelines and handler chains, an HTTP transport, and the
//! configuration and error plumbing shared by both. The library is used by the binary
//! crate, but the dispatcher can also be embedded behind any other transport.
//!
//! # Architecture
//!
//! - [`protocol::jsonrpc`] owns decoding, the method registry and dispatch
//! - [`transport`] turns network requests into dispatcher calls
//! - [`config`] loads layered settings, [`error`] reports escalated failures

pub mod config;
pub mod error;
pub mod protocol;
pub mod transport;

// Internal modules that are not part of the public API
#[cfg(test)]
pub(crate) mod tests;

/// Version information for the Kapili RPC server.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library initialization function.
///
/// Installs the tracing-backed error reporter. Safe to call more than once.
pub fn init() {
    error::set_error_reporter(std::sync::Arc::new(error::TracingErrorReporter));
}
