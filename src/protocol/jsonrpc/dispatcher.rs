// Copyright (c) 2025 Kapili RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Dispatch engine.
//!
//! [`Dispatcher::handle`] is the single entry point a transport needs: it takes the raw
//! payload of one transport call and its cancellation token and returns the bytes to
//! write back.
//!
//! Every call of a payload moves through the same states:
//!
//! ```text
//! RECEIVED -> MIDDLEWARE -> (SHORT_CIRCUITED | LOOKUP) -> HANDLER_CHAIN -> RESPONDED
//! ```
//!
//! Calls of a batch run one after another in payload order. Errors raised by
//! middleware, lookup or handlers become the `error` member of that call's response
//! and never affect sibling calls. Only encoding failures escalate to the transport.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::codec;
use super::context::Context;
use super::handler::Flow;
use super::registry::MethodRegistry;
use super::types::{Request, Response};
use crate::error::{get_error_reporting, ErrorContext, KapiliError};

/// Transport-level outcome of one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStatus {
    /// The body holds the encoded responses (possibly empty)
    Ok,

    /// Responses could not be encoded; the body is empty
    InternalError,
}

impl TransportStatus {
    /// HTTP status code matching this outcome.
    pub fn as_u16(&self) -> u16 {
        match self {
            TransportStatus::Ok => 200,
            TransportStatus::InternalError => 500,
        }
    }
}

/// Bytes to write back for one transport call.
#[derive(Debug, Clone)]
pub struct Reply {
    /// Encoded responses
    pub body: Bytes,

    /// Suggested transport status
    pub status: TransportStatus,
}

/// Tunables of a [`Dispatcher`].
#[derive(Debug, Clone, Default)]
pub struct DispatcherOptions {
    /// Deadline applied to every transport call, measured from its arrival
    pub request_timeout: Option<Duration>,

    /// Maximum number of members of a batch, `0` for no limit
    pub max_batch_size: usize,
}

/// Routes decoded calls through the middleware pipeline and handler chains.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<MethodRegistry>,
    options: DispatcherOptions,
}

impl Dispatcher {
    /// Creates a dispatcher over a fully set up registry.
    pub fn new(registry: Arc<MethodRegistry>) -> Self {
        Self::with_options(registry, DispatcherOptions::default())
    }

    /// Creates a dispatcher with explicit options.
    pub fn with_options(registry: Arc<MethodRegistry>, options: DispatcherOptions) -> Self {
        Self { registry, options }
    }

    /// The registry this dispatcher serves.
    pub fn registry(&self) -> &Arc<MethodRegistry> {
        &self.registry
    }

    /// Handles one transport call.
    pub async fn handle(&self, payload: Bytes, cancel: CancellationToken) -> Reply {
        let decoded = match codec::decode(&payload, self.options.max_batch_size) {
            Ok(decoded) => decoded,
            Err(error) => {
                debug!(code = error.code, "rejecting undecodable payload");
                return self.reply(&[Some(Response::uncorrelated(error))], false);
            }
        };

        debug!(
            size = payload.len(),
            calls = decoded.requests.len(),
            batch = decoded.batch,
            "decoded payload"
        );

        let mut base = Context::new(cancel, payload);
        if let Some(timeout) = self.options.request_timeout {
            base = base.with_deadline(Instant::now() + timeout);
        }

        let mut responses = Vec::with_capacity(decoded.requests.len());
        for request in &decoded.requests {
            let response = self.dispatch(&base, request).await;
            responses.push((!request.is_notification()).then_some(response));
        }

        self.reply(&responses, decoded.batch)
    }

    /// Handles a payload that is never cancelled.
    pub async fn handle_detached(&self, payload: impl Into<Bytes>) -> Reply {
        self.handle(payload.into(), CancellationToken::new()).await
    }

    /// Runs one call through middleware, lookup and its handler chain.
    ///
    /// The returned response is produced for notifications too; the codec drops it.
    pub async fn dispatch(&self, base: &Context, request: &Request) -> Response {
        trace!(method = %request.method, id = request.id_str(), "dispatching call");
        if let Some(response) = self.invoke_middleware(base, request).await {
            return response;
        }
        self.invoke_method(base, request).await
    }

    /// Runs the middleware pipeline for one call.
    ///
    /// Returns a response only when a middleware aborted with an error; dispatch must
    /// then be skipped. An abort without an error merely ends the pipeline, and so does
    /// a middleware that returns [`Flow::Continue`] after aborting the shared context.
    pub async fn invoke_middleware(&self, base: &Context, request: &Request) -> Option<Response> {
        let mut ctx = base.clone();

        for middleware in self.registry.middlewares() {
            match middleware.handle(&mut ctx).await {
                Flow::Continue if ctx.should_continue() => continue,
                Flow::Continue => {
                    trace!(method = %request.method, "middleware pipeline stopped by context flag");
                    break;
                }
                Flow::Abort(Some(error)) => {
                    debug!(method = %request.method, code = error.code, "middleware rejected call");
                    return Some(Response::error_for(request, error));
                }
                Flow::Abort(None) => {
                    trace!(method = %request.method, "middleware pipeline stopped");
                    break;
                }
            }
        }

        None
    }

    /// Looks up and runs the handler chain for one call.
    pub async fn invoke_method(&self, base: &Context, request: &Request) -> Response {
        let chain = match self.registry.lookup(request) {
            Ok(chain) => chain,
            Err(error) => {
                debug!(method = %request.method, code = error.code, "lookup failed");
                return Response::error_for(request, error);
            }
        };

        let mut response = Response::for_request(request);
        for (stage, handler) in chain.iter().enumerate() {
            let mut ctx = base.with_request_id(request.id.as_deref());
            match handler.serve(&mut ctx, request.params.as_deref()).await {
                Err(error) => {
                    debug!(method = %request.method, stage, code = error.code, "handler failed");
                    response.result = None;
                    response.error = Some(error);
                    break;
                }
                Ok(result) => {
                    let answered = result.is_some();
                    response.result = result;
                    if answered || !ctx.should_continue() {
                        break;
                    }
                    trace!(method = %request.method, stage, "handler passed the call on");
                }
            }
        }

        response
    }

    fn reply(&self, responses: &[Option<Response>], batch: bool) -> Reply {
        match codec::encode(responses, batch) {
            Ok(body) => Reply {
                body,
                status: TransportStatus::Ok,
            },
            Err(e) => {
                warn!(error = %e, "failed to encode responses");
                get_error_reporting().report(
                    ErrorContext::new(KapiliError::Rpc(e), "dispatcher").capture_span_trace(),
                );
                Reply {
                    body: Bytes::new(),
                    status: TransportStatus::InternalError,
                }
            }
        }
    }
}
