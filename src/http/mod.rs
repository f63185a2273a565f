//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower layers, static assets)
//!     → server.rs dispatch (buffer body, route table lookup)
//!     → routes.rs (chain: error logger [+ timing] → handler)
//!     → handlers/ (bind payloads, consult the directory, render, stream)
//!     → error.rs (DispatchError → status and body)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod payloads;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;

pub use error::DispatchError;
pub use payloads::TimeoffRequest;
pub use routes::build_routes;
pub use server::{HttpServer, ServerError};
pub use state::AppState;
pub use templates::{TemplateError, Templates};
