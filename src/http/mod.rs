//! HTTP pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (listener lifecycle, router, peer address)
//!     → handler.rs (decode body, dispatch by method to the hooks,
//!                   negotiate response compression, write the reply)
//!     → headers.rs (canonical key casing, Server header)
//! ```

pub mod handler;
pub mod headers;
pub mod server;

pub use handler::{HandlerError, MethodHooks, Reply, ReplyBody, RequestContext};
pub use server::{GatewayServer, LifecycleError};
