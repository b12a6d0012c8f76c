//! Composition root: CLI, tracing, startup and shutdown ordering.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use git_relay::{GatewayConfig, GatewayServer, GitGateway};

#[derive(Parser, Debug)]
#[command(name = "git-relay", about = "Streaming Git Smart-HTTP gateway")]
struct Cli {
    /// Port to listen on.
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,

    /// Repositories root (defaults to $REPOSITORIES_DIRECTORY, then `.`).
    #[arg(short, long)]
    directory: Option<PathBuf>,
}

/// Parse arguments with the documented exit codes: 0 for help, 1 for a
/// missing option value, 2 for an unknown option, 3 for an invalid or
/// out-of-range port.
fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                ErrorKind::UnknownArgument => 2,
                ErrorKind::ValueValidation => 3,
                _ => 1,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "git_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = parse_cli();
    let mut config = GatewayConfig::default();
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(directory) = cli.directory {
        config.repositories_root = directory;
    }

    tracing::info!(
        port = config.port,
        repositories = %config.repositories_root.display(),
        "starting git-relay"
    );

    let gateway = match GitGateway::new(&config.repositories_root) {
        Ok(gateway) => gateway,
        Err(err) => {
            tracing::error!(error = %err, "startup failed");
            return ExitCode::FAILURE;
        }
    };

    let mut server = GatewayServer::new(config.identity.clone(), Arc::new(gateway));
    if let Err(err) = server.start(config.port).await {
        tracing::error!(error = %err, "startup failed");
        return ExitCode::FAILURE;
    }

    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to listen for shutdown signal");
        return ExitCode::FAILURE;
    }
    tracing::info!("shutdown signal received");

    match server.stop() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "shutdown failed");
            ExitCode::FAILURE
        }
    }
}
