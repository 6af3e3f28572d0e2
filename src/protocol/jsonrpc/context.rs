// Copyright (c) 2025 Kapili RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Request-scoped execution context.
//!
//! A [`Context`] is built once per transport call from the transport's cancellation
//! token and the raw payload. Handlers never see that base value directly: before
//! each handler runs, the dispatcher derives a copy with the call's correlation id
//! attached via [`Context::with_request_id`]. Derivation never touches the original.

use std::time::Duration;

use bytes::Bytes;
use serde_json::value::RawValue;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::{Error, Result};

/// Correlation id slot of a context.
#[derive(Debug, Clone)]
enum Correlation {
    /// Base context, no call bound yet.
    Unattached,
    /// Bound to a call; `None` for notifications.
    Attached(Option<Box<RawValue>>),
}

/// Per-call execution context handed to middleware and handlers.
#[derive(Debug, Clone)]
pub struct Context {
    cancel: CancellationToken,
    deadline: Option<Instant>,
    body: Bytes,
    correlation: Correlation,
    next: Option<bool>,
}

impl Context {
    /// Creates a base context for one transport call.
    pub fn new(cancel: CancellationToken, body: impl Into<Bytes>) -> Self {
        Self {
            cancel,
            deadline: None,
            body: body.into(),
            correlation: Correlation::Unattached,
            next: None,
        }
    }

    /// Sets the instant after which the call counts as cancelled.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Derives a context bound to one call.
    ///
    /// The derived value shares the cancellation token, deadline and body of `self`,
    /// carries `id`, and starts with an unset continue flag.
    pub fn with_request_id(&self, id: Option<&RawValue>) -> Self {
        Self {
            cancel: self.cancel.clone(),
            deadline: self.deadline,
            body: self.body.clone(),
            correlation: Correlation::Attached(id.map(ToOwned::to_owned)),
            next: None,
        }
    }

    /// Returns the correlation id of the call this context is bound to.
    ///
    /// `Ok(None)` means the call is a notification. Asking a base context that was
    /// never bound to a call is a programming error and yields
    /// [`Error::MissingRequestId`].
    pub fn request_id(&self) -> Result<Option<&RawValue>> {
        match &self.correlation {
            Correlation::Attached(id) => Ok(id.as_deref()),
            Correlation::Unattached => Err(Error::MissingRequestId),
        }
    }

    /// Raw bytes of the whole transport payload.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Marks the pipeline as free to advance.
    pub fn continue_pipeline(&mut self) {
        self.next = Some(true);
    }

    /// Marks the pipeline as stopped.
    pub fn abort_pipeline(&mut self) {
        self.next = Some(false);
    }

    /// True unless [`Context::abort_pipeline`] was the last flag update.
    pub fn should_continue(&self) -> bool {
        self.next.unwrap_or(true)
    }

    /// The transport's cancellation token.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Deadline of the call, if the transport configured one.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` without a deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// True once the token is cancelled or the deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
            || self
                .deadline
                .map_or(false, |deadline| Instant::now() >= deadline)
    }

    /// Resolves when the call is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.cancel.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.cancel.cancelled().await,
        }
    }
}
