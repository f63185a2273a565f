//! Middleware pipeline.
//!
//! # Data Flow
//! ```text
//! MatchResult (chain + params)
//!     → context.rs (RequestContext built per request)
//!     → chain.rs (middleware in registration order, then handler)
//!     → unwind (post-processing in reverse order)
//!     → middleware.rs (error logging, timing) observes the outcome
//!     → RequestContext::into_response
//! ```
//!
//! # Design Decisions
//! - Chains are immutable and shared; all mutable state is in the context
//! - Errors are appended to the context, never thrown through the stack
//! - Abort is an explicit flag so unwinding code always runs

pub mod chain;
pub mod context;
pub mod middleware;

pub use chain::{Chain, Handler, Middleware, Next};
pub use context::{ContextError, ErrorKind, RequestContext};
pub use middleware::{ErrorLogger, Timing};
