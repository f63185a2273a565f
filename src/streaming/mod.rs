//! Chunked file streaming.

pub mod cursor;

pub use cursor::StreamCursor;

/// Bytes per transfer cycle.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;
