// Copyright (c) 2025 Kapili RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Method registry.
//!
//! The registry maps method names to their handler chains together with descriptive
//! metadata about parameter and result shapes. The map sits behind a single
//! reader/writer lock: registrations are exclusive, lookups and snapshots share the
//! lock and never block each other. The lock is only held for the map access itself
//! and never across an `.await`.
//!
//! The registry also owns the ordered middleware list. Appending requires `&mut self`,
//! so middleware can only be installed while the registry is still being set up and
//! not yet shared with a [`Dispatcher`](super::dispatcher::Dispatcher).

use std::collections::HashMap;
use std::fmt;

use fnv::FnvHashMap;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::error::{Error, JsonRpcError, Result};
use super::handler::{HandlerChain, SharedHandler, SharedMiddleware};
use super::types::{Request, VERSION};

/// Descriptive shape of a method's parameters or result.
///
/// Shapes document a method for introspection; they are never enforced by the
/// registry. Parameter checking happens inside handlers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    /// Rust type name of the declared shape
    #[serde(rename = "type")]
    pub type_name: &'static str,

    /// Example value, if one was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl Shape {
    /// Declares a shape by type alone.
    pub fn of<T: ?Sized>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            example: None,
        }
    }

    /// Declares a shape from an example value.
    ///
    /// The example is dropped if it cannot be represented as JSON.
    pub fn example<T: Serialize>(value: &T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            example: serde_json::to_value(value).ok(),
        }
    }

    /// Shape of a method that takes or returns nothing.
    pub fn none() -> Self {
        Self::of::<()>()
    }
}

/// Everything the registry stores for one method.
#[derive(Clone)]
pub struct Metadata {
    /// Handler chain serving the method
    pub handlers: HandlerChain,

    /// Declared parameter shape
    pub params: Shape,

    /// Declared result shape
    pub result: Shape,
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metadata")
            .field("handlers", &self.handlers.len())
            .field("params", &self.params)
            .field("result", &self.result)
            .finish()
    }
}

/// Serialisable description of one registered method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDescription {
    /// Method name
    pub name: String,

    /// Number of handlers in the chain
    pub handlers: usize,

    /// Declared parameter shape
    pub params: Shape,

    /// Declared result shape
    pub result: Shape,
}

/// Name-keyed registry of handler chains plus the global middleware list.
#[derive(Default)]
pub struct MethodRegistry {
    methods: RwLock<FnvHashMap<String, Metadata>>,
    middlewares: Vec<SharedMiddleware>,
}

impl MethodRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler chain for `name`.
    ///
    /// A later registration under the same name replaces the earlier one.
    ///
    /// # Errors
    ///
    /// [`Error::Registration`] if `name` is empty or `handlers` yields nothing; the
    /// registry is left unchanged in that case.
    pub fn register<I>(&self, name: impl Into<String>, params: Shape, result: Shape, handlers: I) -> Result<()>
    where
        I: IntoIterator<Item = SharedHandler>,
    {
        let name = name.into();
        let handlers: Vec<SharedHandler> = handlers.into_iter().collect();
        if name.is_empty() || handlers.is_empty() {
            return Err(Error::Registration(
                "method name and handler chain should not be empty".to_string(),
            ));
        }

        debug!(method = %name, handlers = handlers.len(), "registering method");
        let metadata = Metadata {
            handlers: HandlerChain::from(handlers),
            params,
            result,
        };
        self.methods.write().insert(name, metadata);
        Ok(())
    }

    /// Appends one middleware to the pipeline.
    pub fn use_middleware(&mut self, middleware: SharedMiddleware) {
        self.middlewares.push(middleware);
    }

    /// Appends several middleware, keeping their order.
    pub fn use_middlewares<I>(&mut self, middlewares: I)
    where
        I: IntoIterator<Item = SharedMiddleware>,
    {
        self.middlewares.extend(middlewares);
    }

    /// The middleware pipeline in registration order.
    pub fn middlewares(&self) -> &[SharedMiddleware] {
        &self.middlewares
    }

    /// Resolves the handler chain serving `request`.
    ///
    /// # Errors
    ///
    /// * `invalid-request` if the protocol version is not "2.0" or the method is empty
    /// * `method-not-found` if nothing is registered under the method name
    pub fn lookup(&self, request: &Request) -> std::result::Result<HandlerChain, JsonRpcError> {
        if request.method.is_empty() || request.jsonrpc != VERSION {
            return Err(JsonRpcError::invalid_request());
        }

        self.methods
            .read()
            .get(&request.method)
            .map(|metadata| metadata.handlers.clone())
            .ok_or_else(JsonRpcError::method_not_found)
    }

    /// Returns a copy of the whole name to metadata mapping.
    pub fn snapshot(&self) -> HashMap<String, Metadata> {
        self.methods
            .read()
            .iter()
            .map(|(name, metadata)| (name.clone(), metadata.clone()))
            .collect()
    }

    /// Describes every registered method, sorted by name.
    pub fn describe(&self) -> Vec<MethodDescription> {
        let mut methods: Vec<MethodDescription> = self
            .methods
            .read()
            .iter()
            .map(|(name, metadata)| MethodDescription {
                name: name.clone(),
                handlers: metadata.handlers.len(),
                params: metadata.params.clone(),
                result: metadata.result.clone(),
            })
            .collect();
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        methods
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.methods.read().len()
    }

    /// True when no method is registered.
    pub fn is_empty(&self) -> bool {
        self.methods.read().is_empty()
    }

    /// Number of middleware in the pipeline.
    pub fn middleware_count(&self) -> usize {
        self.middlewares.len()
    }
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.len())
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}
