//! Transport error module.
//!
//! This module defines error types that may occur in the HTTP transport.

use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Errors that can occur during transport operations.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Error when the listener cannot be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested
        addr: SocketAddr,
        /// Underlying socket error
        source: io::Error,
    },

    /// Error when accepting a connection.
    #[error("Failed to accept connection: {0}")]
    Accept(io::Error),

    /// Error when reading a request body.
    #[error("Failed to read request body: {0}")]
    Body(String),

    /// Error when a request body exceeds the configured limit.
    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// Error when serving a connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Other IO errors.
    #[error("Transport IO error: {0}")]
    Io(#[from] io::Error),
}
