// Copyright (c) 2025 Kapili RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Handler and middleware contracts.
//!
//! A method is served by a chain of one or more [`Handler`]s. Each handler receives a
//! context bound to the call and the raw parameter payload. Handlers that return no
//! result and leave their context's continue flag alone pass the call on to the next
//! handler of the chain.
//!
//! [`Middleware`] runs before method lookup, once per call, and reports its decision
//! through [`Flow`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::value::RawValue;
use serde_json::Value;

use super::context::Context;
use super::error::JsonRpcError;

/// Outcome of one handler invocation.
///
/// `Ok(None)` means "no answer from this stage".
pub type HandlerResult = std::result::Result<Option<Value>, JsonRpcError>;

/// Shared handler type stored in the registry.
pub type SharedHandler = Arc<dyn Handler>;

/// Ordered, non-empty handler sequence registered for one method.
pub type HandlerChain = Arc<[SharedHandler]>;

/// Shared middleware type stored in the registry.
pub type SharedMiddleware = Arc<dyn Middleware>;

/// Serves one stage of a method's handler chain.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle a call.
    ///
    /// # Parameters
    /// * `ctx` - Context bound to this call; calling [`Context::abort_pipeline`] on it
    ///   stops the chain even when no result is returned.
    /// * `params` - The raw `params` member of the request, if present.
    async fn serve(&self, ctx: &mut Context, params: Option<&RawValue>) -> HandlerResult;
}

/// Decision reported by a middleware.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Run the next middleware, or proceed to dispatch after the last one.
    Continue,

    /// Stop running middleware for this call.
    ///
    /// With an error, the call is answered with that error and its handler chain never
    /// runs. Without one, the call is dispatched as if every middleware had continued.
    Abort(Option<JsonRpcError>),
}

impl Flow {
    /// Converts the flag-plus-error style into a decision.
    ///
    /// An error only counts when the context was aborted; a middleware that fails but
    /// lets the pipeline continue has its error discarded.
    pub fn from_context(ctx: &Context, outcome: std::result::Result<(), JsonRpcError>) -> Self {
        if ctx.should_continue() {
            Flow::Continue
        } else {
            Flow::Abort(outcome.err())
        }
    }

    /// Returns true for [`Flow::Abort`] carrying an error.
    pub fn short_circuits(&self) -> bool {
        matches!(self, Flow::Abort(Some(_)))
    }
}

/// Pre-dispatch filter run against the shared per-call context.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Inspect or annotate the call and decide how dispatch proceeds.
    async fn handle(&self, ctx: &mut Context) -> Flow;
}

/// Handler backed by a synchronous closure, see [`handler_fn`].
pub struct HandlerFn<F> {
    f: F,
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFn").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut Context, Option<&RawValue>) -> HandlerResult + Send + Sync,
{
    async fn serve(&self, ctx: &mut Context, params: Option<&RawValue>) -> HandlerResult {
        (self.f)(ctx, params)
    }
}

/// Wraps a closure into a shared [`Handler`].
pub fn handler_fn<F>(f: F) -> SharedHandler
where
    F: Fn(&mut Context, Option<&RawValue>) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(HandlerFn { f })
}

/// Middleware backed by a synchronous closure, see [`middleware_fn`].
pub struct MiddlewareFn<F> {
    f: F,
}

impl<F> fmt::Debug for MiddlewareFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareFn").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> Middleware for MiddlewareFn<F>
where
    F: Fn(&mut Context) -> Flow + Send + Sync,
{
    async fn handle(&self, ctx: &mut Context) -> Flow {
        (self.f)(ctx)
    }
}

/// Wraps a closure into a shared [`Middleware`].
pub fn middleware_fn<F>(f: F) -> SharedMiddleware
where
    F: Fn(&mut Context) -> Flow + Send + Sync + 'static,
{
    Arc::new(MiddlewareFn { f })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    fn context() -> Context {
        Context::new(CancellationToken::new(), Bytes::new())
    }

    #[test]
    fn test_flow_from_context() {
        let mut ctx = context();
        assert_eq!(Flow::from_context(&ctx, Ok(())), Flow::Continue);
        assert_eq!(
            Flow::from_context(&ctx, Err(JsonRpcError::parse_error())),
            Flow::Continue
        );

        ctx.abort_pipeline();
        assert_eq!(Flow::from_context(&ctx, Ok(())), Flow::Abort(None));

        let flow = Flow::from_context(&ctx, Err(JsonRpcError::parse_error()));
        assert!(flow.short_circuits());
        assert_eq!(flow, Flow::Abort(Some(JsonRpcError::parse_error())));
    }

    #[tokio::test]
    async fn test_handler_fn_sees_params_and_context() {
        let handler = handler_fn(|ctx, params| {
            ctx.abort_pipeline();
            Ok(params.map(|p| json!(p.get())))
        });

        let params = RawValue::from_string("[1,2]".to_string()).unwrap();
        let mut ctx = context().with_request_id(None);
        let result = handler.serve(&mut ctx, Some(&params)).await;

        assert_eq!(result, Ok(Some(json!("[1,2]"))));
        assert!(!ctx.should_continue());
    }

    #[tokio::test]
    async fn test_middleware_fn() {
        let middleware = middleware_fn(|ctx| {
            if ctx.body().is_empty() {
                Flow::Abort(Some(JsonRpcError::invalid_request()))
            } else {
                Flow::Continue
            }
        });

        let mut ctx = context();
        assert!(middleware.handle(&mut ctx).await.short_circuits());

        let mut ctx = Context::new(CancellationToken::new(), Bytes::from_static(b"{}"));
        assert_eq!(middleware.handle(&mut ctx).await, Flow::Continue);
    }
}
