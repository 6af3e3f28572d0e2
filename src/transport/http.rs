//! HTTP transport.
//!
//! Serves JSON-RPC over HTTP/1.1 with hyper. `POST <rpc_path>` carries the payload;
//! `GET <debug_path>` exports the registered methods when enabled. Each accepted
//! connection runs on its own task, and every request gets a child of the server's
//! shutdown token as its cancellation token.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::KapiliConfig;
use crate::error::transport::TransportError;
use crate::error::{get_error_reporting, ErrorContext, KapiliError};
use crate::protocol::jsonrpc::{Dispatcher, JsonRpcError, Response as RpcResponse};

const APPLICATION_JSON: &str = "application/json";

/// Settings of the HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Address to bind to
    pub address: SocketAddr,

    /// Path accepting JSON-RPC POST requests
    pub rpc_path: String,

    /// Path of the method export, `None` when disabled
    pub debug_path: Option<String>,

    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl HttpServerConfig {
    /// Extracts the transport settings from the server configuration.
    pub fn from_config(config: &KapiliConfig) -> Self {
        Self {
            address: config.server.address,
            rpc_path: config.server.rpc_path.clone(),
            debug_path: config
                .server
                .enable_debug
                .then(|| config.server.debug_path.clone()),
            max_body_size: config.limits.max_message_size,
        }
    }
}

/// HTTP front end of a [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct HttpServer {
    config: Arc<HttpServerConfig>,
    dispatcher: Dispatcher,
}

impl HttpServer {
    /// Creates a server that is not yet listening.
    pub fn new(config: HttpServerConfig, dispatcher: Dispatcher) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher,
        }
    }

    /// Binds the configured address.
    pub async fn bind(&self) -> Result<TcpListener, TransportError> {
        let addr = self.config.address;
        TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind { addr, source })
    }

    /// Binds the configured address and serves until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), TransportError> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }

    /// Serves connections from `listener` until `shutdown` is cancelled.
    ///
    /// Open connections are asked to finish their in-flight request and close.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<(), TransportError> {
        let local = listener.local_addr()?;
        info!(address = %local, rpc_path = %self.config.rpc_path, "HTTP transport listening");

        loop {
            let (stream, peer) = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        get_error_reporting().report(
                            ErrorContext::new(
                                KapiliError::Transport(TransportError::Accept(e)),
                                "http",
                            )
                            .with_details(format!("listener {local}")),
                        );
                        continue;
                    }
                },
            };
            debug!(%peer, "accepted connection");

            let server = self.clone();
            let connection_token = shutdown.child_token();
            tokio::spawn(async move {
                server.serve_connection(stream, peer, connection_token).await;
            });
        }

        info!(address = %local, "HTTP transport stopped");
        Ok(())
    }

    async fn serve_connection(
        self,
        stream: tokio::net::TcpStream,
        peer: SocketAddr,
        shutdown: CancellationToken,
    ) {
        let io = TokioIo::new(stream);
        let request_token = shutdown.clone();
        let service = service_fn(move |req| {
            let server = self.clone();
            let cancel = request_token.child_token();
            async move { Ok::<_, Infallible>(server.route(req, cancel).await) }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        let result = tokio::select! {
            result = conn.as_mut() => result,
            _ = shutdown.cancelled() => {
                conn.as_mut().graceful_shutdown();
                conn.as_mut().await
            }
        };
        if let Err(e) = result {
            let error = TransportError::Connection(e.to_string());
            debug!(%peer, error = %error, "connection closed with error");
        }
    }

    #[instrument(skip_all, fields(method = %req.method(), path = %req.uri().path()))]
    async fn route(&self, req: Request<Incoming>, cancel: CancellationToken) -> Response<Full<Bytes>> {
        let path = req.uri().path();

        if path == self.config.rpc_path {
            if req.method() != Method::POST {
                return plain(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
            }
            return self.handle_rpc(req, cancel).await;
        }

        if self.config.debug_path.as_deref() == Some(path) && req.method() == Method::GET {
            return self.handle_debug();
        }

        plain(StatusCode::NOT_FOUND, "Not Found")
    }

    async fn handle_rpc(&self, req: Request<Incoming>, cancel: CancellationToken) -> Response<Full<Bytes>> {
        if !is_json(&req) {
            debug!("rejecting request without JSON content type");
            return rpc_error(JsonRpcError::invalid_request());
        }

        let body = match Limited::new(req.into_body(), self.config.max_body_size)
            .collect()
            .await
        {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                let error = TransportError::PayloadTooLarge(self.config.max_body_size);
                warn!(error = %error, "request body too large");
                return plain(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large");
            }
            Err(e) => {
                let error = TransportError::Body(e.to_string());
                debug!(error = %error, "failed to read request body");
                return plain(StatusCode::BAD_REQUEST, "Bad Request");
            }
        };

        let reply = self.dispatcher.handle(body, cancel).await;
        let status = StatusCode::from_u16(reply.status.as_u16())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        json(status, reply.body)
    }

    fn handle_debug(&self) -> Response<Full<Bytes>> {
        let registry = self.dispatcher.registry();
        if registry.is_empty() {
            return plain(StatusCode::NOT_FOUND, "Not Found");
        }

        match serde_json::to_vec(&registry.describe()) {
            Ok(body) => json(StatusCode::OK, Bytes::from(body)),
            Err(e) => {
                get_error_reporting().report(
                    ErrorContext::new(KapiliError::Serialization(e), "http")
                        .with_details("method export")
                        .capture_span_trace(),
                );
                plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}

fn is_json(req: &Request<Incoming>) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map_or(false, |mime| mime.trim().eq_ignore_ascii_case(APPLICATION_JSON))
}

fn rpc_error(error: JsonRpcError) -> Response<Full<Bytes>> {
    match serde_json::to_vec(&RpcResponse::uncorrelated(error)) {
        Ok(mut body) => {
            body.push(b'\n');
            json(StatusCode::OK, Bytes::from(body))
        }
        Err(_) => plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
    }
}

fn json(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    response
}

fn plain(status: StatusCode, message: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(message.as_bytes())));
    *response.status_mut() = status;
    response
}
