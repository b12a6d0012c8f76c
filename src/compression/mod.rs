//! Content-encoding subsystem.
//!
//! # Data Flow
//! ```text
//! Content-Encoding header
//!     → pipeline::decompress (chain every listed token, left to right)
//!     → request body handed to the method hook
//!
//! Accept-Encoding header
//!     → pipeline::compress (first registered token wins)
//!     → response body written to the client
//! ```
//!
//! # Design Decisions
//! - Token table is a fixed enum, shared read-only by every request
//! - Transforms are lazy AsyncRead wrappers; nothing is buffered
//! - An unknown token is a hard error, never a silent skip

pub mod encoding;
pub mod pipeline;

pub use encoding::{BoxRead, Encoding};
pub use pipeline::{compress, decompress, CompressionError};
