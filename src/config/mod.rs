//! Configuration management subsystem.
//!
//! # Design Decisions
//! - Config is assembled once in `main` (CLI flags over environment over
//!   defaults) and passed into constructors; no process-wide singleton
//! - The server identity is an explicit value, not a metadata lookup

pub mod schema;

pub use schema::{GatewayConfig, ServerIdentity, DEFAULT_PORT, REPOSITORIES_DIRECTORY_ENV};
