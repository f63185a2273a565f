//! Per-request context threaded through the middleware chain.
//!
//! # Responsibilities
//! - Carry the decoded request (method, uri, headers, body, route params)
//! - Accumulate errors reported by handlers and middleware, in order
//! - Hold the single response slot and the abort flag
//!
//! # Design Decisions
//! - Exclusively owned by one request; never shared across tasks
//! - First response written wins; later writes are logged and dropped
//! - Aborting is a flag, not an unwind: entered middleware still run their
//!   post-processing while `Next::run` refuses to descend further

use std::fmt;
use std::ops::BitOr;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::http::error::DispatchError;
use crate::http::state::AppState;
use crate::routing::Params;

/// Classification flags attached to a recorded error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorKind(u8);

impl ErrorKind {
    pub const BIND: Self = Self(1);
    pub const RENDER: Self = Self(1 << 1);
    pub const PRIVATE: Self = Self(1 << 2);
    pub const PUBLIC: Self = Self(1 << 3);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ErrorKind {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::BIND, "bind"),
            (Self::RENDER, "render"),
            (Self::PRIVATE, "private"),
            (Self::PUBLIC, "public"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}

/// An error recorded on the context during request handling.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextError {
    pub cause: String,
    pub kind: ErrorKind,
    pub meta: Option<String>,
}

impl ContextError {
    pub fn new(cause: impl fmt::Display, kind: ErrorKind) -> Self {
        Self {
            cause: cause.to_string(),
            kind,
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }
}

/// Mutable, request-scoped state for one dispatch.
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    params: Params,
    route: String,
    request_id: String,
    state: AppState,
    errors: Vec<ContextError>,
    response: Option<Response>,
    status: Option<StatusCode>,
    aborted: bool,
}

impl RequestContext {
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        state: AppState,
    ) -> Self {
        let request_id = headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            method,
            uri,
            headers,
            body,
            params: Params::default(),
            route: String::new(),
            request_id,
            state,
            errors: Vec::new(),
            response: None,
            status: None,
            aborted: false,
        }
    }

    /// Attach the outcome of route matching.
    pub fn set_route(&mut self, route: impl Into<String>, params: Params) {
        self.route = route.into();
        self.params = params;
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Route parameter bound by the matched pattern.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The pattern that matched this request, e.g. `/employee-template/:id`.
    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Errors recorded so far, in the order they were produced.
    pub fn errors(&self) -> &[ContextError] {
        &self.errors
    }

    pub fn push_error(&mut self, error: ContextError) {
        self.errors.push(error);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Status of the response written so far, or 200 if nothing was written.
    pub fn status(&self) -> StatusCode {
        match (&self.response, self.status) {
            (Some(response), _) => response.status(),
            (None, Some(status)) => status,
            (None, None) => StatusCode::OK,
        }
    }

    pub fn is_written(&self) -> bool {
        self.response.is_some()
    }

    /// Write the response. Only the first write takes effect.
    pub fn respond(&mut self, response: impl IntoResponse) {
        if self.response.is_some() {
            tracing::warn!(
                request_id = %self.request_id,
                path = %self.uri.path(),
                "Response already written, ignoring second write"
            );
            return;
        }
        self.response = Some(response.into_response());
    }

    /// Stop descending into the rest of the chain.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn abort_with_status(&mut self, status: StatusCode) {
        if self.response.is_none() && self.status.is_none() {
            self.status = Some(status);
        }
        self.abort();
    }

    pub fn abort_with_error(&mut self, status: StatusCode, error: ContextError) {
        self.push_error(error);
        self.abort_with_status(status);
    }

    /// Record `error`, write its response and abort.
    pub fn fail(&mut self, error: DispatchError) {
        self.push_error(ContextError::new(&error, error.kind()));
        self.respond(error);
        self.abort();
    }

    pub fn into_response(self) -> Response {
        match (self.response, self.status) {
            (Some(response), _) => response,
            (None, Some(status)) => {
                let mut response = Response::new(Body::empty());
                *response.status_mut() = status;
                response
            }
            (None, None) => StatusCode::OK.into_response(),
        }
    }
}
