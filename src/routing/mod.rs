//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RouterBuilder (routes, groups, middleware)
//!     → pattern.rs (parse & validate segments)
//!     → Sort by specificity, then registration order
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (method, path)
//!     → router.rs (per-method route list)
//!     → pattern.rs (segment walk, param extraction)
//!     → Return: MatchResult, MethodNotAllowed or NotFound
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - First match wins after specificity ordering

pub mod pattern;
pub mod router;

pub use pattern::{Params, Pattern, Segment};
pub use router::{Group, MatchResult, RouteError, RouteMatch, RouteTable, RouterBuilder};
