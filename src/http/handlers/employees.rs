//! Employee pages and the JSON employee API.

use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use futures_util::future::BoxFuture;

use super::{bind_body, bind_body_as, finish};
use crate::binding::ContentKind;
use crate::directory::{Employee, TimeOff};
use crate::http::error::DispatchError;
use crate::pipeline::RequestContext;

/// Route parameter naming the employee.
pub const ID_PARAM: &str = "id";

fn employee_id(ctx: &RequestContext) -> Result<u32, DispatchError> {
    let raw = ctx.param(ID_PARAM).unwrap_or_default();
    raw.parse()
        .map_err(|_| DispatchError::InvalidId(raw.to_string()))
}

fn lookup(ctx: &RequestContext) -> Result<Employee, DispatchError> {
    let id = employee_id(ctx)?;
    Ok(ctx.state().directory.get(id)?)
}

/// Bind a time-off entry and append it to the employee in the path.
fn append(ctx: &RequestContext, entry: TimeOff) -> Result<Employee, DispatchError> {
    let id = employee_id(ctx)?;
    let employee = ctx.state().directory.append_time_off(id, entry)?;
    tracing::info!(
        request_id = %ctx.request_id(),
        employee_id = id,
        entries = employee.time_off.len(),
        "Time off recorded"
    );
    Ok(employee)
}

/// `GET /employee-template`
pub fn list_page(ctx: &mut RequestContext) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let result = render_list(ctx);
        finish(ctx, result);
    })
}

fn render_list(ctx: &RequestContext) -> Result<Html<String>, DispatchError> {
    let state = ctx.state();
    let employees = state.directory.get_all()?;
    Ok(Html(state.templates.render_index(&employees)?))
}

/// `GET /employee-template/:id`
pub fn show_page(ctx: &mut RequestContext) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let result = render_one(ctx);
        finish(ctx, result);
    })
}

fn render_one(ctx: &RequestContext) -> Result<Html<String>, DispatchError> {
    let employee = lookup(ctx)?;
    Ok(Html(ctx.state().templates.render_employee(&employee)?))
}

/// `POST /employee-template/:id`: append, then send the browser back to the
/// employee page.
pub fn submit_page(ctx: &mut RequestContext) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let result = bind_body::<TimeOff>(ctx)
            .and_then(|entry| append(ctx, entry))
            .map(|employee| redirect(&format!("/employee-template/{}", employee.id)));
        finish(ctx, result);
    })
}

/// `GET /api/json-employees[/]`
pub fn list_json(ctx: &mut RequestContext) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let result = ctx.state().directory.get_all().map(Json);
        finish(ctx, result.map_err(DispatchError::from));
    })
}

/// `GET /api/json-employees/:id`
pub fn show_json(ctx: &mut RequestContext) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let result = lookup(ctx).map(Json);
        finish(ctx, result);
    })
}

/// `POST /api/json-employees/:id`: JSON body regardless of `Content-Type`.
pub fn submit_json(ctx: &mut RequestContext) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let result = bind_body_as::<TimeOff>(ctx, ContentKind::Json)
            .and_then(|entry| append(ctx, entry))
            .map(Json);
        finish(ctx, result);
    })
}

fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
