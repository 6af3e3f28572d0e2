//! Error module for the Kapili RPC server.
//!
//! This module ties together the error types of each layer (configuration, dispatch
//! and transport) and provides a reporting hook for failures that cannot be answered
//! on the wire.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use thiserror::Error;
use tracing_error::SpanTrace;

pub mod config;
pub mod transport;

/// Result type alias used throughout the Kapili RPC server.
pub type KapiliResult<T> = Result<T, KapiliError>;

/// Core error enum for the Kapili RPC server.
#[derive(Error, Debug)]
pub enum KapiliError {
    /// Errors occurring during configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Errors raised by the JSON-RPC dispatcher outside of a call.
    #[error("RPC error: {0}")]
    Rpc(#[from] crate::protocol::jsonrpc::Error),

    /// Errors related to the HTTP transport.
    #[error("Transport error: {0}")]
    Transport(#[from] transport::TransportError),

    /// IO errors that may occur during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/Deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Custom error with message for cases where specific error types are not defined.
    #[error("{0}")]
    Custom(String),
}

/// Error reporting structure to provide context and debugging information.
#[derive(Debug)]
pub struct ErrorContext {
    /// The original error that occurred.
    pub error: KapiliError,

    /// The component where the error occurred.
    pub component: String,

    /// Additional context information to help with debugging.
    pub details: Option<String>,

    /// Span trace if available.
    pub trace: Option<String>,
}

impl ErrorContext {
    /// Creates a new error context with the given error and component.
    ///
    /// # Arguments
    ///
    /// * `error` - The error that occurred
    /// * `component` - The component where the error occurred
    pub fn new<S: Into<String>>(error: KapiliError, component: S) -> Self {
        Self {
            error,
            component: component.into(),
            details: None,
            trace: None,
        }
    }

    /// Adds detail information to the error context.
    pub fn with_details<S: Into<String>>(mut self, details: S) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Adds trace information to the error context.
    pub fn with_trace<S: Into<String>>(mut self, trace: S) -> Self {
        self.trace = Some(trace.into());
        self
    }

    /// Records the spans active at the call site.
    ///
    /// Needs a `tracing_error::ErrorLayer` in the subscriber; without one the trace
    /// is empty and left unset.
    pub fn capture_span_trace(self) -> Self {
        let trace = SpanTrace::capture().to_string();
        if trace.is_empty() {
            self
        } else {
            self.with_trace(trace)
        }
    }
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error in {}: {}", self.component, self.error)?;
        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }
        Ok(())
    }
}

/// Error reporter trait for reporting errors to various sinks.
pub trait ErrorReporter: Send + Sync + std::fmt::Debug {
    /// Report an error with context.
    fn report(&self, context: ErrorContext);
}

/// Reporter that logs errors using the tracing framework.
#[derive(Default, Debug)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, context: ErrorContext) {
        tracing::error!(
            error = %context.error,
            component = %context.component,
            details = context.details.as_deref().unwrap_or("None"),
            trace = context.trace.as_deref().unwrap_or("None"),
            "Error reported"
        );
    }
}

/// Global error reporter accessor.
#[derive(Debug, Default)]
pub struct ErrorReporting {
    reporter: RwLock<Option<Arc<dyn ErrorReporter>>>,
}

impl ErrorReporting {
    /// Replaces the reporter.
    pub fn set_reporter(&self, reporter: Arc<dyn ErrorReporter>) {
        *self.reporter.write() = Some(reporter);
    }

    /// Report an error with context.
    ///
    /// Falls back to [`TracingErrorReporter`] when no reporter is configured.
    pub fn report(&self, context: ErrorContext) {
        let reporter = self.reporter.read().clone();
        match reporter {
            Some(reporter) => reporter.report(context),
            None => TracingErrorReporter.report(context),
        }
    }
}

static ERROR_REPORTING: Lazy<ErrorReporting> = Lazy::new(ErrorReporting::default);

/// Get the global error reporting instance.
pub fn get_error_reporting() -> &'static ErrorReporting {
    &ERROR_REPORTING
}

/// Set the global error reporter.
pub fn set_error_reporter(reporter: Arc<dyn ErrorReporter>) {
    ERROR_REPORTING.set_reporter(reporter);
}
