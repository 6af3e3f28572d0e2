//! Test modules for the Kapili RPC server.
//!
//! Crate-level tests for configuration and error reporting live here; dispatcher
//! tests live next to the dispatcher in `protocol::jsonrpc::tests`.

pub mod config_tests;

pub use test_utils::TestFixture;
