//! Employee directory collaborator.
//!
//! The HTTP layer only sees the [`EmployeeDirectory`] trait; the in-memory
//! implementation backs the running server and the tests.

pub mod employee;
pub mod store;

pub use employee::{Employee, TimeOff, TimeoffStatus, TimeoffType};
pub use store::{EmployeeDirectory, InMemoryDirectory, LookupError};
