//! Git adapter end-to-end tests over a live listener.

mod common;

use std::path::Path;
use std::sync::Arc;

use git_relay::GitGateway;
use tempfile::TempDir;

fn gateway_for(root: &Path) -> Arc<GitGateway> {
    Arc::new(GitGateway::new(root).expect("test root exists"))
}

/// The service executables ship with git; skip process-spawning tests on
/// hosts without it.
fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Lay out the minimal bare repository shape the service accepts.
fn create_bare_repository(path: &Path) {
    std::fs::create_dir_all(path.join("objects")).unwrap();
    std::fs::create_dir_all(path.join("refs")).unwrap();
    std::fs::write(path.join("HEAD"), "ref: refs/heads/main\n").unwrap();
}

#[tokio::test]
async fn missing_repository_is_404() {
    let root = TempDir::new().unwrap();
    let (mut server, url) = common::start_gateway(gateway_for(root.path())).await;

    let response = reqwest::get(format!("{url}/missing/HEAD")).await.unwrap();
    assert_eq!(response.status(), 404);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Could not find repository /missing");

    server.stop().unwrap();
}

#[tokio::test]
async fn refs_listing_without_service_is_400() {
    let root = TempDir::new().unwrap();
    create_bare_repository(&root.path().join("repo"));
    let (mut server, url) = common::start_gateway(gateway_for(root.path())).await;

    let response = reqwest::get(format!("{url}/repo/info/refs")).await.unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "service parameter required");

    server.stop().unwrap();
}

#[tokio::test]
async fn unknown_service_is_400() {
    let root = TempDir::new().unwrap();
    let (mut server, url) = common::start_gateway(gateway_for(root.path())).await;

    let response = reqwest::get(format!("{url}/repo/info/refs?service=git-evil-pack"))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "unsupported service: git-evil-pack");

    server.stop().unwrap();
}

#[tokio::test]
async fn delete_is_not_wired_to_the_backend() {
    let root = TempDir::new().unwrap();
    create_bare_repository(&root.path().join("repo"));
    let (mut server, url) = common::start_gateway(gateway_for(root.path())).await;

    let client = reqwest::Client::new();
    let response = client
        .delete(format!("{url}/repo/info/refs?service=git-upload-pack"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 405);

    server.stop().unwrap();
}

#[tokio::test]
async fn advertisement_streams_from_the_service_process() {
    if !git_available() {
        eprintln!("skipping: git is not installed");
        return;
    }

    let root = TempDir::new().unwrap();
    create_bare_repository(&root.path().join("repo"));
    let (mut server, url) = common::start_gateway(gateway_for(root.path())).await;

    let response = reqwest::get(format!("{url}/repo/info/refs?service=git-upload-pack"))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"],
        "application/x-git-upload-pack-advertisement"
    );

    let body = response.bytes().await.unwrap();
    assert!(
        body.starts_with(b"001e# service=git-upload-pack\n0000"),
        "advertisement should open with the service pkt-line"
    );

    server.stop().unwrap();
}
