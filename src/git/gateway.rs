//! Git protocol adapter.
//!
//! # Responsibilities
//! - Resolve the requested repository under the configured root
//! - Spawn the negotiated service executable
//! - Pipe the request body into the process and its output back out
//!
//! # Design Decisions
//! - The repository root is validated once, at construction
//! - Negotiation precedes the filesystem check; the negotiator validates
//!   shape, the adapter validates presence
//! - The service process is fire-and-forget: its exit status is never
//!   inspected, end of stream terminates the response

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::compression::BoxRead;
use crate::git::path::parse_git_path;
use crate::git::service::negotiate;
use crate::http::handler::{HandlerError, MethodHooks, Reply, RequestContext};
use crate::http::server::LifecycleError;

/// Serves Git Smart-HTTP requests out of a repositories root.
pub struct GitGateway {
    repositories_root: PathBuf,
}

impl GitGateway {
    /// Fails fast when the root is missing or not a directory.
    pub fn new(repositories_root: impl Into<PathBuf>) -> Result<Self, LifecycleError> {
        let root = repositories_root.into();
        if !root.is_dir() {
            return Err(LifecycleError::InvalidDirectory(
                root.display().to_string(),
            ));
        }
        Ok(Self {
            repositories_root: root,
        })
    }

    pub fn repositories_root(&self) -> &Path {
        &self.repositories_root
    }

    /// One routine for every supported method: negotiate, resolve,
    /// spawn, pipe.
    async fn run_backend(&self, ctx: RequestContext) -> Result<Reply, HandlerError> {
        let service =
            negotiate(&ctx.path).map_err(|err| HandlerError::BadRequest(err.to_string()))?;

        let stripped = parse_git_path(&ctx.path);
        let repo_dir = self
            .repositories_root
            .join(stripped.trim_start_matches('/'));
        if !repo_dir.is_dir() {
            return Err(HandlerError::NotFound(format!(
                "Could not find repository {stripped}"
            )));
        }

        tracing::info!(
            remote = %ctx.remote_addr,
            repository = stripped,
            action = service.action(),
            command = service.command(),
            "git service"
        );

        let mut child = Command::new(service.command())
            .args(service.args())
            .arg(&repo_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let (Some(mut stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(HandlerError::BadRequest(
                "git service pipes unavailable".to_string(),
            ));
        };

        let mut body = ctx.body;
        tokio::spawn(async move {
            // A broken pipe just ends the feed; the process decides what
            // to make of a truncated request.
            let _ = tokio::io::copy(&mut body, &mut stdin).await;
            drop(stdin);
            let _ = child.wait().await;
        });

        let output: BoxRead = match service.advertisement_prelude() {
            Some(prelude) => Box::pin(std::io::Cursor::new(prelude).chain(stdout)),
            None => Box::pin(stdout),
        };

        Ok(Reply::ok()
            .header("Content-Type", service.content_type())
            .stream(output))
    }
}

#[async_trait]
impl MethodHooks for GitGateway {
    async fn get(&self, ctx: RequestContext) -> Result<Reply, HandlerError> {
        self.run_backend(ctx).await
    }

    async fn post(&self, ctx: RequestContext) -> Result<Reply, HandlerError> {
        self.run_backend(ctx).await
    }

    async fn put(&self, ctx: RequestContext) -> Result<Reply, HandlerError> {
        self.run_backend(ctx).await
    }

    async fn patch(&self, ctx: RequestContext) -> Result<Reply, HandlerError> {
        self.run_backend(ctx).await
    }

    // DELETE keeps the 405 default.

    async fn head(&self, ctx: RequestContext) -> Result<Reply, HandlerError> {
        self.run_backend(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_requires_an_existing_directory() {
        assert!(GitGateway::new(".").is_ok());
        assert!(GitGateway::new(std::env::temp_dir()).is_ok());

        let missing = GitGateway::new("/definitely/not/here");
        assert!(matches!(
            missing,
            Err(LifecycleError::InvalidDirectory(_))
        ));
    }

    #[test]
    fn construction_rejects_plain_files() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            GitGateway::new(file.path()),
            Err(LifecycleError::InvalidDirectory(_))
        ));
    }
}
