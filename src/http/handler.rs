//! Per-request pipeline: decode, dispatch, negotiate, reply.
//!
//! # Responsibilities
//! - Log the request line and the response status
//! - Undo request-body encodings before any hook sees the body
//! - Dispatch on the exact method token to the injected hooks
//! - Negotiate and apply response compression
//! - Convert recoverable failures into structured JSON error replies
//!
//! # Design Decisions
//! - Hooks are a capability record (trait with 405 defaults), not a
//!   subclass hierarchy; an adapter overrides only what it supports
//! - A `Reply` is consumed exactly once when the response is assembled,
//!   so a terminated response cannot be written to again
//! - Request-level failures never cross the listener; lifecycle errors
//!   never pass through here

use std::io;
use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, Response, StatusCode};
use futures_util::TryStreamExt;
use serde_json::json;
use tokio_util::io::{ReaderStream, StreamReader};

use crate::compression::{compress, decompress, BoxRead, CompressionError, Encoding};
use crate::config::ServerIdentity;
use crate::http::headers;

/// State owned by a single in-flight request.
///
/// The body stream is already decompressed when a hook receives it.
pub struct RequestContext {
    pub method: Method,
    /// Path plus query string, exactly as requested.
    pub path: String,
    pub headers: HeaderMap,
    pub remote_addr: IpAddr,
    pub body: BoxRead,
}

/// Body of a [`Reply`].
pub enum ReplyBody {
    Empty,
    /// Sent verbatim as `text/plain`.
    Text(String),
    /// Serialized and sent as `application/json`.
    Json(serde_json::Value),
    /// Produced by a separate producer (e.g. a service process). Headers
    /// flush immediately; end of stream terminates the response.
    Stream(BoxRead),
}

/// A hook's answer, turned into exactly one HTTP response.
pub struct Reply {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: ReplyBody,
}

impl Reply {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: ReplyBody::Empty,
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = ReplyBody::Text(body.into());
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = ReplyBody::Json(body);
        self
    }

    pub fn stream(mut self, stream: BoxRead) -> Self {
        self.body = ReplyBody::Stream(stream);
        self
    }
}

/// Recoverable request-level failures, rendered as JSON error replies.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Compression(#[from] CompressionError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl HandlerError {
    fn status(&self) -> StatusCode {
        match self {
            HandlerError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Per-method request hooks.
///
/// The server injects one implementation and every method defaults to
/// 405, so an adapter overrides only the methods it actually serves.
#[async_trait]
pub trait MethodHooks: Send + Sync {
    async fn get(&self, _ctx: RequestContext) -> Result<Reply, HandlerError> {
        Ok(Reply::method_not_allowed())
    }

    async fn post(&self, _ctx: RequestContext) -> Result<Reply, HandlerError> {
        Ok(Reply::method_not_allowed())
    }

    async fn put(&self, _ctx: RequestContext) -> Result<Reply, HandlerError> {
        Ok(Reply::method_not_allowed())
    }

    async fn patch(&self, _ctx: RequestContext) -> Result<Reply, HandlerError> {
        Ok(Reply::method_not_allowed())
    }

    async fn delete(&self, _ctx: RequestContext) -> Result<Reply, HandlerError> {
        Ok(Reply::method_not_allowed())
    }

    async fn head(&self, _ctx: RequestContext) -> Result<Reply, HandlerError> {
        Ok(Reply::method_not_allowed())
    }
}

/// Run one request through the pipeline.
pub async fn handle(
    hooks: Arc<dyn MethodHooks>,
    identity: &ServerIdentity,
    remote_addr: IpAddr,
    request: Request<Body>,
) -> Response<Body> {
    let method = request.method().clone();
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let request_headers = request.headers().clone();

    tracing::info!(remote = %remote_addr, method = %method, path = %path, "request");

    let accept_encoding = header_value(&request_headers, "accept-encoding");
    let content_encoding = header_value(&request_headers, "content-encoding");

    let body = match decompress(body_reader(request.into_body()), content_encoding.as_deref()) {
        Ok(stream) => stream,
        // Decoding failed before dispatch; reply without attempting
        // response compression.
        Err(err) => {
            return error_response(identity, remote_addr, StatusCode::BAD_REQUEST, &err.to_string())
        }
    };

    let ctx = RequestContext {
        method: method.clone(),
        path,
        headers: request_headers,
        remote_addr,
        body,
    };

    let result = match method.as_str() {
        "GET" => hooks.get(ctx).await,
        "POST" => hooks.post(ctx).await,
        "PUT" => hooks.put(ctx).await,
        "PATCH" => hooks.patch(ctx).await,
        "DELETE" => hooks.delete(ctx).await,
        "HEAD" => hooks.head(ctx).await,
        _ => Ok(Reply::method_not_allowed()),
    };

    match result {
        Ok(reply) => write_reply(identity, remote_addr, reply, accept_encoding.as_deref()),
        Err(err) => error_response(identity, remote_addr, err.status(), &err.to_string()),
    }
}

/// Assemble a hook reply: normalize headers, negotiate compression,
/// write status, headers and body.
fn write_reply(
    identity: &ServerIdentity,
    remote_addr: IpAddr,
    reply: Reply,
    accept_encoding: Option<&str>,
) -> Response<Body> {
    let Reply {
        status,
        headers,
        body,
    } = reply;
    let mut headers = headers::normalize(headers, &identity.token());

    let stream: BoxRead = match body {
        ReplyBody::Empty => Box::pin(tokio::io::empty()),
        ReplyBody::Text(text) => {
            set_header(&mut headers, "Content-Type", "text/plain");
            Box::pin(io::Cursor::new(text.into_bytes()))
        }
        ReplyBody::Json(value) => {
            set_header(&mut headers, "Content-Type", "application/json");
            Box::pin(io::Cursor::new(value.to_string().into_bytes()))
        }
        ReplyBody::Stream(stream) => stream,
    };

    let (encoding, stream) = match compress(stream, accept_encoding) {
        Ok(negotiated) => negotiated,
        Err(err) => {
            return error_response(identity, remote_addr, StatusCode::BAD_REQUEST, &err.to_string())
        }
    };
    if encoding != Encoding::Identity {
        set_header(&mut headers, "Content-Encoding", encoding.name());
    }

    tracing::info!(remote = %remote_addr, status = status.as_u16(), "response");

    let mut builder = Response::builder().status(status);
    for (name, value) in &headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    assemble(builder.body(Body::from_stream(ReaderStream::new(stream))))
}

/// Write a structured error reply.
///
/// Skips header normalization and response compression entirely; this is
/// the one path that must not fail again.
fn error_response(
    identity: &ServerIdentity,
    remote_addr: IpAddr,
    status: StatusCode,
    message: &str,
) -> Response<Body> {
    tracing::warn!(remote = %remote_addr, status = status.as_u16(), error = message, "request failed");

    let body = json!({ "error": message }).to_string();
    let builder = Response::builder()
        .status(status)
        .header(headers::SERVER, identity.token())
        .header("Content-Type", "application/json");
    assemble(builder.body(Body::from(body)))
}

fn assemble(result: Result<Response<Body>, axum::http::Error>) -> Response<Body> {
    match result {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = %err, "failed to assemble response");
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: impl Into<String>) {
    headers.retain(|(key, _)| key != name);
    headers.push((name.to_string(), value.into()));
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn body_reader(body: Body) -> BoxRead {
    let stream = body
        .into_data_stream()
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err));
    Box::pin(StreamReader::new(stream))
}
