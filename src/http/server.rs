//! Gateway server lifecycle.
//!
//! # Responsibilities
//! - Own the single listening socket
//! - Enforce start/stop invariants (no double start, no stop when stopped)
//! - Build the Axum router and wire the request pipeline
//! - Hand every request to the injected method hooks with the peer address
//!
//! # Design Decisions
//! - Server state is `Option<Running>`: fully stopped or fully started,
//!   nothing partial is observable
//! - `&mut self` lifecycle receivers leave serialization to the owner
//! - Shutdown is a broadcast trigger; in-flight requests drain gracefully

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::config::ServerIdentity;
use crate::http::handler::{self, MethodHooks};

/// Fatal misuse of the server or adapter lifecycle.
///
/// These are precondition failures surfaced to the caller, never caught
/// per-request.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Server already started on port: {0}")]
    AlreadyStarted(u16),

    #[error("Server has not been started yet")]
    NotStarted,

    #[error("Could not find or invalid directory: {0}")]
    InvalidDirectory(String),

    #[error("Failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        source: std::io::Error,
    },
}

#[derive(Clone)]
struct AppState {
    hooks: Arc<dyn MethodHooks>,
    identity: ServerIdentity,
}

struct Running {
    port: u16,
    shutdown: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

/// HTTP server wrapper owning one listening socket.
///
/// Requests are handled by the hook implementation injected at
/// construction; the wrapper itself knows nothing about Git.
pub struct GatewayServer {
    identity: ServerIdentity,
    hooks: Arc<dyn MethodHooks>,
    running: Option<Running>,
}

impl GatewayServer {
    pub fn new(identity: ServerIdentity, hooks: Arc<dyn MethodHooks>) -> Self {
        Self {
            identity,
            hooks,
            running: None,
        }
    }

    /// Bind the listener and start serving.
    ///
    /// Port 0 binds an ephemeral port; [`GatewayServer::port`] reports the
    /// actual one.
    pub async fn start(&mut self, port: u16) -> Result<(), LifecycleError> {
        if let Some(running) = &self.running {
            return Err(LifecycleError::AlreadyStarted(running.port));
        }

        let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port)))
            .await
            .map_err(|source| LifecycleError::Bind { port, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| LifecycleError::Bind { port, source })?;

        let app = Self::router(AppState {
            hooks: self.hooks.clone(),
            identity: self.identity.clone(),
        });

        let (shutdown, mut shutdown_rx) = broadcast::channel(1);
        let task = tokio::spawn(async move {
            let service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(err) = axum::serve(listener, service)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                })
                .await
            {
                tracing::error!(error = %err, "gateway server terminated");
            }
        });

        tracing::info!(address = %local_addr, "gateway listening");
        self.running = Some(Running {
            port: local_addr.port(),
            shutdown,
            task,
        });
        Ok(())
    }

    /// Stop accepting connections and clear the server state.
    ///
    /// In-flight requests drain in the background.
    pub fn stop(&mut self) -> Result<(), LifecycleError> {
        match self.running.take() {
            Some(running) => {
                let _ = running.shutdown.send(());
                drop(running.task);
                tracing::info!(port = running.port, "gateway stopped");
                Ok(())
            }
            None => Err(LifecycleError::NotStarted),
        }
    }

    /// The bound port while running.
    pub fn port(&self) -> Option<u16> {
        self.running.as_ref().map(|running| running.port)
    }

    fn router(state: AppState) -> Router {
        Router::new()
            .route("/", any(dispatch))
            .route("/{*path}", any(dispatch))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }
}

async fn dispatch(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response<Body> {
    handler::handle(state.hooks.clone(), &state.identity, canonical_ip(addr), request).await
}

/// Peer IP with any IPv4-mapped IPv6 form unwrapped.
fn canonical_ip(addr: SocketAddr) -> IpAddr {
    addr.ip().to_canonical()
}
