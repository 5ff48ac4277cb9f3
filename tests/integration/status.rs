//! Status and lifecycle endpoint tests — /status, /clear, /ping.

use anyhow::Result;

use crate::start_server;

#[tokio::test]
async fn status_for_unknown_sessions_is_404() -> Result<()> {
    let server = start_server().await?;

    let resp = reqwest::get(server.url("/status/never-seen")).await?;
    assert_eq!(resp.status(), 404);

    // Asking did not create it.
    assert!(server.registry.is_empty());

    Ok(())
}

#[tokio::test]
async fn clear_removes_a_session_exactly_once() -> Result<()> {
    let server = start_server().await?;
    let client = reqwest::Client::new();

    reqwest::get(server.url("/download/short-lived?bytes=10"))
        .await?
        .bytes()
        .await?;
    assert_eq!(
        reqwest::get(server.url("/status/short-lived")).await?.status(),
        200
    );

    let resp = client.delete(server.url("/clear/short-lived")).send().await?;
    assert_eq!(resp.status(), 200);

    let resp = client.delete(server.url("/clear/short-lived")).send().await?;
    assert_eq!(resp.status(), 404);

    assert_eq!(
        reqwest::get(server.url("/status/short-lived")).await?.status(),
        404
    );

    Ok(())
}

#[tokio::test]
async fn cleared_sessions_restart_from_zero() -> Result<()> {
    let server = start_server().await?;
    let client = reqwest::Client::new();

    reqwest::get(server.url("/download/reborn?bytes=5000"))
        .await?
        .bytes()
        .await?;
    client.delete(server.url("/clear/reborn")).send().await?;

    reqwest::get(server.url("/download/reborn?bytes=100"))
        .await?
        .bytes()
        .await?;

    let status: serde_json::Value = reqwest::get(server.url("/status/reborn"))
        .await?
        .json()
        .await?;
    assert_eq!(status["downloadCount"], 100);

    Ok(())
}

#[tokio::test]
async fn status_reports_only_the_directions_that_moved() -> Result<()> {
    let server = start_server().await?;

    reqwest::get(server.url("/download/one-sided?bytes=1024"))
        .await?
        .bytes()
        .await?;

    let status: serde_json::Value = reqwest::get(server.url("/status/one-sided"))
        .await?
        .json()
        .await?;
    assert!(status.get("downloadCount").is_some());
    assert!(status.get("downloadStart").is_some());
    assert!(status.get("downloadEnd").is_some());
    assert!(status.get("uploadCount").is_none());
    assert!(status.get("uploadStart").is_none());
    assert!(status.get("uploadEnd").is_none());

    Ok(())
}

#[tokio::test]
async fn ping_answers_without_touching_the_registry() -> Result<()> {
    let server = start_server().await?;

    let resp = reqwest::get(server.url("/ping/latency-probe")).await?;
    assert_eq!(resp.status(), 200);
    assert!(server.registry.is_empty());

    Ok(())
}
