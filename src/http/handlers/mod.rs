//! Route handlers.
//!
//! Each public handler has the shape `fn(&mut RequestContext) ->
//! BoxFuture<'_, ()>` so it can be registered directly on the route table.
//! The work itself lives in private async fns returning
//! `Result<_, DispatchError>`; [`finish`] writes either outcome to the
//! context.

pub mod employees;
pub mod files;
pub mod inspect;
pub mod timeoff;

use axum::response::IntoResponse;

use crate::binding::{Bind, ContentKind};
use crate::http::error::DispatchError;
use crate::pipeline::RequestContext;

fn finish<R: IntoResponse>(ctx: &mut RequestContext, result: Result<R, DispatchError>) {
    match result {
        Ok(response) => ctx.respond(response),
        Err(error) => ctx.fail(error),
    }
}

/// Bind the request body, choosing the decoder from `Content-Type`.
fn bind_body<T: Bind>(ctx: &RequestContext) -> Result<T, DispatchError> {
    let kind = ContentKind::from_content_type(ctx.content_type());
    bind_body_as(ctx, kind)
}

fn bind_body_as<T: Bind>(ctx: &RequestContext, kind: ContentKind) -> Result<T, DispatchError> {
    Ok(ctx.state().binder.bind(ctx.body(), kind)?)
}
