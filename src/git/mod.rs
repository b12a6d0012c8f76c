//! Git Smart-HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! request path
//!     → service.rs (classify into a GitService, or reject the shape)
//!     → path.rs (strip the protocol suffix, recover the repository path)
//!     → gateway.rs (verify the repository, spawn the service process,
//!                   pipe request body → stdin and stdout → response)
//! ```

pub mod gateway;
pub mod path;
pub mod service;

pub use gateway::GitGateway;
pub use path::parse_git_path;
pub use service::{negotiate, GitService, NegotiationError, ServiceKind};
