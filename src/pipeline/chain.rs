//! Middleware chain execution.
//!
//! A route owns a [`Chain`]: the middleware registered for it, in order,
//! followed by one terminal [`Handler`]. Running the chain hands the first
//! middleware a [`Next`] that resumes with the rest; whatever a middleware
//! does after awaiting `next.run(ctx)` happens while the stack unwinds, so
//! post-processing runs in reverse registration order.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::pipeline::context::RequestContext;

/// Terminal stage of a chain.
pub trait Handler: Send + Sync + 'static {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, ()>;
}

impl<F> Handler for F
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, ()> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, ()> {
        self(ctx)
    }
}

/// Interceptor wrapping the remainder of a chain.
///
/// Implementations decide whether to call `next.run(ctx)`; skipping it
/// short-circuits the chain.
pub trait Middleware: Send + Sync + 'static {
    fn handle<'a>(&'a self, ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, ()>;
}

impl<F> Middleware for F
where
    F: for<'a> Fn(&'a mut RequestContext, Next<'a>) -> BoxFuture<'a, ()>
        + Send
        + Sync
        + 'static,
{
    fn handle<'a>(&'a self, ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, ()> {
        self(ctx, next)
    }
}

/// Continuation handed to a middleware: the stages after it.
pub struct Next<'a> {
    middleware: &'a [Arc<dyn Middleware>],
    handler: &'a dyn Handler,
}

impl<'a> Next<'a> {
    /// Run the remainder of the chain. Does nothing once `ctx` is aborted.
    pub fn run<'b>(self, ctx: &'b mut RequestContext) -> BoxFuture<'b, ()>
    where
        'a: 'b,
    {
        if ctx.is_aborted() {
            return Box::pin(async {});
        }

        match self.middleware.split_first() {
            Some((first, rest)) => first.handle(
                ctx,
                Next {
                    middleware: rest,
                    handler: self.handler,
                },
            ),
            None => self.handler.call(ctx),
        }
    }
}

/// Ordered middleware plus terminal handler for a single route.
#[derive(Clone)]
pub struct Chain {
    middleware: Vec<Arc<dyn Middleware>>,
    handler: Arc<dyn Handler>,
}

impl Chain {
    pub fn new(middleware: Vec<Arc<dyn Middleware>>, handler: Arc<dyn Handler>) -> Self {
        Self {
            middleware,
            handler,
        }
    }

    pub fn len(&self) -> usize {
        self.middleware.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub async fn run(&self, ctx: &mut RequestContext) {
        Next {
            middleware: &self.middleware,
            handler: self.handler.as_ref(),
        }
        .run(ctx)
        .await
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("middleware", &self.middleware.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::state::AppState;
    use crate::pipeline::context::{ContextError, ErrorKind};
    use axum::body::Bytes;
    use axum::http::{HeaderMap, Method, StatusCode, Uri};
    use std::sync::Mutex;

    type Journal = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        journal: Journal,
        call_next: bool,
    }

    impl Middleware for Recorder {
        fn handle<'a>(&'a self, ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, ()> {
            Box::pin(async move {
                self.journal.lock().unwrap().push(format!("enter {}", self.name));
                if self.call_next {
                    next.run(ctx).await;
                } else {
                    ctx.abort_with_status(StatusCode::FORBIDDEN);
                }
                self.journal.lock().unwrap().push(format!("leave {}", self.name));
            })
        }
    }

    struct Terminal(Journal);

    impl Handler for Terminal {
        fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, ()> {
            Box::pin(async move {
                self.0.lock().unwrap().push("handler".to_string());
                ctx.push_error(ContextError::new("first", ErrorKind::PRIVATE));
                ctx.push_error(ContextError::new("second", ErrorKind::PRIVATE));
            })
        }
    }

    fn recorder(name: &'static str, journal: &Journal, call_next: bool) -> Arc<dyn Middleware> {
        Arc::new(Recorder {
            name,
            journal: journal.clone(),
            call_next,
        })
    }

    fn context() -> RequestContext {
        RequestContext::new(
            Method::GET,
            Uri::from_static("/"),
            HeaderMap::new(),
            Bytes::new(),
            AppState::for_tests(),
        )
    }

    #[tokio::test]
    async fn test_unwinds_in_reverse_order() {
        let journal = Journal::default();
        let chain = Chain::new(
            vec![recorder("outer", &journal, true), recorder("inner", &journal, true)],
            Arc::new(Terminal(journal.clone())),
        );

        let mut ctx = context();
        chain.run(&mut ctx).await;

        assert_eq!(
            *journal.lock().unwrap(),
            vec!["enter outer", "enter inner", "handler", "leave inner", "leave outer"]
        );
        let causes: Vec<_> = ctx.errors().iter().map(|e| e.cause.as_str()).collect();
        assert_eq!(causes, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_short_circuit_still_unwinds_entered_middleware() {
        let journal = Journal::default();
        let chain = Chain::new(
            vec![
                recorder("outer", &journal, true),
                recorder("gate", &journal, false),
                recorder("never", &journal, true),
            ],
            Arc::new(Terminal(journal.clone())),
        );

        let mut ctx = context();
        chain.run(&mut ctx).await;

        assert_eq!(
            *journal.lock().unwrap(),
            vec!["enter outer", "enter gate", "leave gate", "leave outer"]
        );
        assert_eq!(ctx.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_aborted_context_skips_handler() {
        let journal = Journal::default();
        let chain = Chain::new(
            vec![recorder("outer", &journal, true)],
            Arc::new(Terminal(journal.clone())),
        );

        let mut ctx = context();
        ctx.abort();
        chain.run(&mut ctx).await;

        assert!(journal.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_plain_functions_work_as_stages() {
        fn hello(ctx: &mut RequestContext) -> BoxFuture<'_, ()> {
            Box::pin(async move { ctx.respond("hello") })
        }

        fn teapot<'a>(ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, ()> {
            Box::pin(async move {
                next.run(ctx).await;
                ctx.respond(StatusCode::IM_A_TEAPOT);
            })
        }

        let teapot: Arc<dyn Middleware> = Arc::new(teapot);
        let chain = Chain::new(vec![teapot], Arc::new(hello));
        assert_eq!(chain.len(), 2);

        let mut ctx = context();
        chain.run(&mut ctx).await;
        assert_eq!(ctx.status(), StatusCode::OK);
    }
}
