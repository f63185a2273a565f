//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router: static assets plus one dispatch fallback
//! - Wire up tower layers (tracing, request ID, timeout, body limit)
//! - Resolve each request against the route table and run its chain
//! - Serve until the shutdown signal fires
//!
//! # Design Decisions
//! - Static files are served by tower-http; every other path goes through
//!   the in-crate route table so matching rules stay in one place
//! - Bodies are buffered up to `security.max_body_size` before dispatch
//! - A path known under other methods answers 404 unless
//!   `routing.handle_method_not_allowed` is set

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::error::DispatchError;
use crate::http::routes::build_routes;
use crate::http::state::AppState;
use crate::http::templates::TemplateError;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::pipeline::RequestContext;
use crate::routing::{RouteError, RouteMatch, RouteTable};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("invalid route table: {0}")]
    Routes(#[from] RouteError),
}

/// State behind the dispatch fallback.
#[derive(Clone)]
struct Dispatcher {
    app: AppState,
    routes: Arc<RouteTable>,
}

/// HTTP server for the time-off service.
pub struct HttpServer {
    router: Router,
    config: Arc<ServerConfig>,
}

impl HttpServer {
    /// Build the server from configuration, loading templates from disk.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let state = AppState::from_config(config)?;
        Self::with_state(state)
    }

    /// Build the server around prepared state.
    pub fn with_state(state: AppState) -> Result<Self, ServerError> {
        let routes = Arc::new(build_routes(&state)?);
        tracing::debug!(routes = routes.len(), "Route table compiled");

        let config = Arc::clone(&state.config);
        let router = Self::build_router(
            &config,
            Dispatcher {
                app: state,
                routes,
            },
        );
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, dispatcher: Dispatcher) -> Router {
        let public = Path::new(&config.assets.public_dir);

        Router::new()
            .route_service("/", ServeFile::new(public.join("index.html")))
            .route_service("/download", ServeFile::new(public.join("download.html")))
            .nest_service("/public", ServeDir::new(public))
            .fallback(dispatch)
            .with_state(dispatcher)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for serving or driving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.signalled())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Fallback handler: route table lookup, then the matched chain.
async fn dispatch(State(dispatcher): State<Dispatcher>, request: Request) -> Response {
    let start = Instant::now();
    let (parts, body) = request.into_parts();
    let method = parts.method.to_string();
    let config = Arc::clone(&dispatcher.app.config);

    let body = match axum::body::to_bytes(body, config.security.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(method = %method, path = %parts.uri.path(), error = %e, "Failed to read request body");
            metrics::record_request(&method, "none", StatusCode::PAYLOAD_TOO_LARGE.as_u16(), start);
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    let mut ctx = RequestContext::new(
        parts.method,
        parts.uri,
        parts.headers,
        body,
        dispatcher.app.clone(),
    );

    let lookup = dispatcher.routes.find(ctx.method(), ctx.path());
    let error = match lookup {
        RouteMatch::Found(found) => {
            ctx.set_route(found.pattern, found.params);
            tracing::debug!(
                request_id = %ctx.request_id(),
                method = %method,
                path = %ctx.path(),
                route = %ctx.route(),
                "Dispatching request"
            );
            found.chain.run(&mut ctx).await;
            let route = ctx.route().to_string();
            let response = ctx.into_response();
            metrics::record_request(&method, &route, response.status().as_u16(), start);
            return response;
        }
        RouteMatch::MethodNotAllowed(allowed) if config.routing.handle_method_not_allowed => {
            DispatchError::MethodNotAllowed(allowed)
        }
        RouteMatch::MethodNotAllowed(_) | RouteMatch::NotFound => DispatchError::RouteNotFound,
    };

    let status = error.status();
    tracing::debug!(
        request_id = %ctx.request_id(),
        method = %method,
        path = %ctx.path(),
        status = status.as_u16(),
        "No route matched"
    );
    metrics::record_request(&method, "none", status.as_u16(), start);
    error.into_response()
}
