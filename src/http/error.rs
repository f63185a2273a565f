//! Dispatch error taxonomy and its HTTP mapping.
//!
//! | Error              | Status | Body                         |
//! |--------------------|--------|------------------------------|
//! | RouteNotFound      | 404    | empty                        |
//! | MethodNotAllowed   | 405    | empty, `Allow` header        |
//! | Validation/decode  | 500    | `{"error": .., "errors": ..}`|
//! | Lookup (not found) | 404    | empty                        |
//! | Lookup (failure)   | 500    | empty                        |
//! | StreamIo/Template  | 500    | empty                        |
//!
//! Input errors answer 500, not 400; clients of this service already depend
//! on that status.

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::binding::ValidationErrors;
use crate::directory::LookupError;
use crate::http::templates::TemplateError;
use crate::pipeline::ErrorKind;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no route matches the request")]
    RouteNotFound,

    #[error("method not allowed")]
    MethodNotAllowed(Vec<Method>),

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid employee id: {0}")]
    InvalidId(String),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("stream failed: {0}")]
    StreamIo(#[from] std::io::Error),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::RouteNotFound => StatusCode::NOT_FOUND,
            DispatchError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            DispatchError::Validation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DispatchError::InvalidId(_) => StatusCode::NOT_FOUND,
            DispatchError::Lookup(LookupError::NotFound(_)) => StatusCode::NOT_FOUND,
            DispatchError::Lookup(LookupError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            DispatchError::StreamIo(_) | DispatchError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Classification recorded on the request context.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::RouteNotFound | DispatchError::MethodNotAllowed(_) => ErrorKind::PUBLIC,
            DispatchError::Validation(_) => ErrorKind::BIND | ErrorKind::PUBLIC,
            DispatchError::InvalidId(_) | DispatchError::Lookup(_) => ErrorKind::PRIVATE,
            DispatchError::StreamIo(_) => ErrorKind::PRIVATE,
            DispatchError::Template(_) => ErrorKind::RENDER | ErrorKind::PRIVATE,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            DispatchError::Validation(errors) => (
                status,
                Json(json!({
                    "error": errors.to_string(),
                    "errors": errors,
                })),
            )
                .into_response(),
            DispatchError::MethodNotAllowed(methods) => {
                let allow = methods
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut response = status.into_response();
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    response.headers_mut().insert(header::ALLOW, value);
                }
                response
            }
            _ => status.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Binder, ContentKind};
    use crate::http::payloads::TimeoffRequest;

    #[tokio::test]
    async fn test_validation_body_lists_every_violation() {
        let errors = Binder::default()
            .bind::<TimeoffRequest>(br#"{"amount": -5}"#, ContentKind::Json)
            .unwrap_err();
        let response = DispatchError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let errors = json["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["field"], "date");
        assert_eq!(errors[1]["rule"], "gt");
        assert!(json["error"].as_str().unwrap().contains("; "));
    }

    #[test]
    fn test_lookup_status_mapping() {
        assert_eq!(
            DispatchError::from(LookupError::NotFound(3)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DispatchError::from(LookupError::Unavailable("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DispatchError::InvalidId("abc".into()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let response = DispatchError::MethodNotAllowed(vec![Method::GET, Method::POST]).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, POST");
    }
}
