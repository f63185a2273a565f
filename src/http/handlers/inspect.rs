//! Handlers that reflect the request back: path params, query, headers,
//! and the intentional error endpoint.

use std::collections::BTreeMap;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Datelike, Utc};
use futures_util::future::BoxFuture;
use serde::Serialize;
use serde_json::json;

use crate::pipeline::{ContextError, ErrorKind, RequestContext};

/// `GET /employees/:username/*rest`
pub fn path_params(ctx: &mut RequestContext) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let body = json!({
            "username": ctx.param("username").unwrap_or_default(),
            "rest": ctx.param("rest").unwrap_or_default(),
        });
        ctx.respond(Json(body));
    })
}

#[derive(Debug, Serialize)]
struct QuerySummary {
    username: String,
    year: String,
    months: Vec<String>,
}

impl QuerySummary {
    /// `year` falls back to the current year only when the key is absent.
    fn parse(query: &str) -> Self {
        let mut username = None;
        let mut year = None;
        let mut months = Vec::new();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match &*key {
                "username" if username.is_none() => username = Some(value.into_owned()),
                "year" if year.is_none() => year = Some(value.into_owned()),
                "month" => months.push(value.into_owned()),
                _ => {}
            }
        }

        Self {
            username: username.unwrap_or_default(),
            year: year.unwrap_or_else(|| Utc::now().year().to_string()),
            months,
        }
    }
}

/// `GET /query/*rest`
pub fn query(ctx: &mut RequestContext) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let summary = QuerySummary::parse(ctx.uri().query().unwrap_or_default());
        ctx.respond(indented(&summary));
    })
}

#[derive(Debug, Serialize)]
struct Cookie {
    name: String,
    value: String,
}

fn cookies(ctx: &RequestContext) -> Vec<Cookie> {
    ctx.headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(name, value)| Cookie {
            name: name.trim().to_string(),
            value: value.trim().trim_matches('"').to_string(),
        })
        .collect()
}

/// `GET /request-object`
pub fn request_object(ctx: &mut RequestContext) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let response = {
            let mut headers: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
            for (name, value) in ctx.headers() {
                headers
                    .entry(name.as_str())
                    .or_default()
                    .push(value.to_str().unwrap_or("<binary>"));
            }

            indented(&json!({
                "url": ctx.uri().to_string(),
                "headers": headers,
                "cookies": cookies(ctx),
            }))
        };
        ctx.respond(response);
    })
}

/// `GET /errors`: records one classified error and answers 200.
pub fn errors(ctx: &mut RequestContext) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        ctx.push_error(
            ContextError::new("Something wrong", ErrorKind::RENDER | ErrorKind::PUBLIC)
                .with_meta("This error was intentional"),
        );
    })
}

/// Pretty-printed JSON body.
fn indented<T: Serialize>(value: &T) -> Response {
    match serde_json::to_vec_pretty(value) {
        Ok(body) => (
            [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
