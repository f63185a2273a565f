//! Declarative binding and validation of request bodies.
//!
//! # Data Flow
//! ```text
//! body bytes + Content-Type
//!     → decode.rs (JSON object or form pairs → RawFields)
//!     → binder.rs (per declared field: convert to kind)
//!     → rules.rs (evaluate each named rule from the declaration)
//!     → Bind::assemble (typed payload) or ValidationErrors (all violations)
//! ```
//!
//! # Design Decisions
//! - One error type for decode failures and rule violations
//! - Rules are looked up by name, so new ones register without touching
//!   decoding
//! - Never fail fast: callers can report every violation at once

pub mod binder;
pub mod decode;
pub mod error;
pub mod rules;

pub use binder::{Bind, Binder, BoundFields, FieldKind, FieldSpec, DATE_FORMAT};
pub use decode::{decode, ContentKind, RawFields};
pub use error::{ValidationError, ValidationErrors};
pub use rules::{Compare, FieldValue, FutureDate, Required, Rule, RuleSet};
