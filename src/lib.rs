//! Streaming Git Smart-HTTP gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                  GIT RELAY                    │
//!                    │                                               │
//!   Client Request   │  ┌─────────┐   ┌─────────────┐   ┌─────────┐ │
//!   ─────────────────┼─▶│  http   │──▶│ compression │──▶│   git   │ │
//!                    │  │ server  │   │  pipeline   │   │ gateway │ │
//!                    │  └─────────┘   └─────────────┘   └────┬────┘ │
//!                    │                                       │      │
//!                    │                                       ▼      │
//!   Client Response  │  ┌─────────┐   ┌─────────────┐   ┌─────────┐ │
//!   ◀────────────────┼──│  reply  │◀──│ compression │◀──│ service │─┼── git-upload-pack /
//!                    │  │ writer  │   │  pipeline   │   │ process │ │   git-receive-pack
//!                    │  └─────────┘   └─────────────┘   └─────────┘ │
//!                    └──────────────────────────────────────────────┘
//! ```
//!
//! The HTTP layer knows nothing about Git; the git gateway is one
//! implementation of its method hooks. Swapping the hooks yields a plain
//! content-negotiating HTTP server.

pub mod compression;
pub mod config;
pub mod git;
pub mod http;

pub use config::{GatewayConfig, ServerIdentity};
pub use git::GitGateway;
pub use http::{GatewayServer, LifecycleError};
