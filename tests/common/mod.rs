//! Shared utilities for gateway integration tests.

use std::sync::Arc;

use git_relay::compression::{BoxRead, Encoding};
use git_relay::http::MethodHooks;
use git_relay::{GatewayServer, ServerIdentity};
use tokio::io::AsyncReadExt;

/// Start a gateway on an ephemeral port with the given hooks.
#[allow(dead_code)]
pub async fn start_gateway(hooks: Arc<dyn MethodHooks>) -> (GatewayServer, String) {
    let mut server = GatewayServer::new(ServerIdentity::from_crate(), hooks);
    server.start(0).await.expect("gateway should start");
    let port = server.port().expect("running gateway reports its port");
    (server, format!("http://127.0.0.1:{port}"))
}

#[allow(dead_code)]
pub fn reader(data: Vec<u8>) -> BoxRead {
    Box::pin(std::io::Cursor::new(data))
}

#[allow(dead_code)]
pub async fn read_all(mut stream: BoxRead) -> Vec<u8> {
    let mut output = Vec::new();
    stream
        .read_to_end(&mut output)
        .await
        .expect("stream should drain");
    output
}

/// Compress bytes with one registered encoding.
#[allow(dead_code)]
pub async fn encode(data: Vec<u8>, token: &str) -> Vec<u8> {
    let encoding = Encoding::lookup(token).expect("registered token");
    read_all(encoding.encoder(reader(data))).await
}

/// Decompress bytes with one registered encoding.
#[allow(dead_code)]
pub async fn decode(data: Vec<u8>, token: &str) -> Vec<u8> {
    let encoding = Encoding::lookup(token).expect("registered token");
    read_all(encoding.decoder(reader(data))).await
}
