//! Route table construction and lookup.
//!
//! # Responsibilities
//! - Collect routes, groups and middleware through [`RouterBuilder`]
//! - Compile and validate every pattern before serving starts
//! - Resolve (method, path) to a chain plus params, or an explicit miss
//!
//! # Design Decisions
//! - Immutable after `build()` (thread-safe without locks)
//! - Per-method route lists sorted once: more leading static segments first,
//!   then registration order; lookup takes the first match
//! - A miss distinguishes "no route" from "route exists for other methods"

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;
use thiserror::Error;

use crate::pipeline::{Chain, Handler, Middleware};
use crate::routing::pattern::{Params, Pattern};

/// Errors raised while building the route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("duplicate route {method} {pattern}")]
    Duplicate { method: Method, pattern: String },

    #[error("{} route errors: {}", .0.len(), join(.0))]
    Several(Vec<RouteError>),
}

fn join(errors: &[RouteError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A resolved route: the chain to run and the params it bound.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub chain: Arc<Chain>,
    pub params: Params,
    pub pattern: String,
}

/// Outcome of a lookup.
#[derive(Debug)]
pub enum RouteMatch {
    Found(MatchResult),
    /// The path matches routes registered only for these methods.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

#[derive(Debug)]
struct Route {
    pattern: Pattern,
    chain: Arc<Chain>,
}

/// Compiled, read-only routing table.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<Method, Vec<Route>>,
}

impl RouteTable {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Resolve a request. Identical input always yields the same route.
    pub fn find(&self, method: &Method, path: &str) -> RouteMatch {
        if let Some(found) = self.find_in(method, path) {
            return RouteMatch::Found(found);
        }

        let allowed = self.allowed_methods(path);
        if allowed.is_empty() {
            RouteMatch::NotFound
        } else {
            RouteMatch::MethodNotAllowed(allowed)
        }
    }

    /// Methods that have a route matching `path`, sorted by name.
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut allowed: Vec<Method> = self
            .routes
            .iter()
            .filter(|(_, routes)| routes.iter().any(|r| r.pattern.matches(path).is_some()))
            .map(|(method, _)| method.clone())
            .collect();
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        allowed
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find_in(&self, method: &Method, path: &str) -> Option<MatchResult> {
        self.routes.get(method)?.iter().find_map(|route| {
            route.pattern.matches(path).map(|params| MatchResult {
                chain: Arc::clone(&route.chain),
                params,
                pattern: route.pattern.as_str().to_string(),
            })
        })
    }
}

struct Entry {
    method: Method,
    pattern: String,
    middleware: Vec<Arc<dyn Middleware>>,
    handler: Arc<dyn Handler>,
}

/// Collects routes before compiling them into a [`RouteTable`].
///
/// Middleware added with [`layer`](Self::layer) wraps every route; a group's
/// own middleware runs after the global ones and only for the group's routes.
#[derive(Default)]
pub struct RouterBuilder {
    middleware: Vec<Arc<dyn Middleware>>,
    entries: Vec<Entry>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn route(mut self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        self.entries.push(Entry {
            method,
            pattern: pattern.to_string(),
            middleware: Vec::new(),
            handler: Arc::new(handler),
        });
        self
    }

    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::POST, pattern, handler)
    }

    /// Register routes under `prefix` sharing the group's middleware.
    pub fn group(mut self, prefix: &str, build: impl FnOnce(Group) -> Group) -> Self {
        let group = build(Group {
            prefix: prefix.to_string(),
            middleware: Vec::new(),
            entries: Vec::new(),
        });
        for mut entry in group.entries {
            let mut middleware = group.middleware.clone();
            middleware.append(&mut entry.middleware);
            entry.middleware = middleware;
            self.entries.push(entry);
        }
        self
    }

    /// Compile all patterns, reporting every problem found.
    pub fn build(self) -> Result<RouteTable, RouteError> {
        let mut errors = Vec::new();
        let mut routes: HashMap<Method, Vec<(usize, Route)>> = HashMap::new();

        for (order, entry) in self.entries.into_iter().enumerate() {
            let pattern = match Pattern::parse(&entry.pattern) {
                Ok(p) => p,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };

            let same_method = routes.entry(entry.method.clone()).or_default();
            if same_method.iter().any(|(_, r)| r.pattern == pattern) {
                errors.push(RouteError::Duplicate {
                    method: entry.method,
                    pattern: entry.pattern,
                });
                continue;
            }

            let mut middleware = self.middleware.clone();
            middleware.extend(entry.middleware);
            let chain = Arc::new(Chain::new(middleware, entry.handler));
            same_method.push((order, Route { pattern, chain }));
        }

        match errors.len() {
            0 => {}
            1 => return Err(errors.remove(0)),
            _ => return Err(RouteError::Several(errors)),
        }

        let routes = routes
            .into_iter()
            .map(|(method, mut list)| {
                list.sort_by_key(|(order, route)| (Reverse(route.pattern.specificity()), *order));
                (method, list.into_iter().map(|(_, route)| route).collect())
            })
            .collect();

        Ok(RouteTable { routes })
    }
}

/// Routes sharing a path prefix and middleware.
pub struct Group {
    prefix: String,
    middleware: Vec<Arc<dyn Middleware>>,
    entries: Vec<Entry>,
}

impl Group {
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn route(mut self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        self.entries.push(Entry {
            method,
            pattern: join_paths(&self.prefix, pattern),
            middleware: Vec::new(),
            handler: Arc::new(handler),
        });
        self
    }

    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::POST, pattern, handler)
    }
}

fn join_paths(prefix: &str, path: &str) -> String {
    if path.is_empty() {
        return prefix.to_string();
    }
    format!("{}{}", prefix.trim_end_matches('/'), path)
}
