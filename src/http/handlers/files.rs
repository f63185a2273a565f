//! File-backed responses: static page, whole-file, attachment and chunked.

use std::path::{Path, PathBuf};

use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use futures_util::future::BoxFuture;

use super::finish;
use crate::http::error::DispatchError;
use crate::pipeline::RequestContext;
use crate::streaming::StreamCursor;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// `GET /employees`: the time-off form page.
pub fn employee_form(ctx: &mut RequestContext) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let path = Path::new(&ctx.state().config.assets.public_dir).join("employee.html");
        let result = tokio::fs::read_to_string(path)
            .await
            .map(Html)
            .map_err(DispatchError::from);
        finish(ctx, result);
    })
}

/// `GET /arsenal`: the whole file in one body.
pub fn arsenal(ctx: &mut RequestContext) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let path = ctx.state().config.assets.arsenal_file.clone();
        let result = tokio::fs::read(path)
            .await
            .map(|bytes| ([(header::CONTENT_TYPE, TEXT_PLAIN)], bytes))
            .map_err(DispatchError::from);
        finish(ctx, result);
    })
}

/// `GET /teerapat`: download with a known length.
pub fn attachment(ctx: &mut RequestContext) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let config = &ctx.state().config;
        let path = PathBuf::from(&config.assets.attachment_file);
        let chunk_size = config.streaming.chunk_size;
        let result = send_attachment(path, chunk_size).await;
        finish(ctx, result);
    })
}

/// `GET /stream`: chunked transfer of the arsenal file.
pub fn stream(ctx: &mut RequestContext) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let config = &ctx.state().config;
        let path = PathBuf::from(&config.assets.arsenal_file);
        let chunk_size = config.streaming.chunk_size;
        let result = StreamCursor::open(path, chunk_size)
            .await
            .map(|cursor| ([(header::CONTENT_TYPE, TEXT_PLAIN)], cursor.into_body()))
            .map_err(DispatchError::from);
        finish(ctx, result);
    })
}

async fn send_attachment(path: PathBuf, chunk_size: usize) -> Result<Response, DispatchError> {
    let file = tokio::fs::File::open(&path).await?;
    let length = file.metadata().await?.len();
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("download");

    let headers = [
        (header::CONTENT_TYPE, TEXT_PLAIN.to_string()),
        (header::CONTENT_LENGTH, length.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment;filename={}", filename),
        ),
    ];
    Ok((headers, StreamCursor::from_file(file, chunk_size).into_body()).into_response())
}
