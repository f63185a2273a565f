//! Employee time-off HTTP service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (axum + tower layers)
//!                        │
//!                        ├── static assets (tower-http ServeFile/ServeDir)
//!                        │
//!                        └── dispatch fallback
//!                              │
//!                              ▼
//!                        routing (pattern match → chain, params)
//!                              │
//!                              ▼
//!                        pipeline (middleware in order → handler → unwind)
//!                              │
//!                 ┌────────────┼─────────────┬──────────────┐
//!                 ▼            ▼             ▼              ▼
//!             binding      directory     streaming     templates
//!          (decode +      (employees,   (chunked file  (liquid HTML)
//!           validate)      time off)      transfer)
//!
//!     Cross-cutting: config, observability (tracing, metrics, sinks),
//!     lifecycle (signals, graceful shutdown)
//! ```

pub mod binding;
pub mod config;
pub mod directory;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod routing;
pub mod streaming;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
