//! Time-off request submission.

use axum::Json;
use futures_util::future::BoxFuture;

use super::{bind_body, finish};
use crate::http::payloads::TimeoffRequest;
use crate::pipeline::RequestContext;

/// `POST /employees` and `POST /api/timeoff`: validate and echo the request.
pub fn submit(ctx: &mut RequestContext) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let result = bind_body::<TimeoffRequest>(ctx).map(|request| {
            tracing::debug!(
                request_id = %ctx.request_id(),
                date = %request.date,
                amount = request.amount,
                "Time-off request accepted"
            );
            Json(request)
        });
        finish(ctx, result);
    })
}
