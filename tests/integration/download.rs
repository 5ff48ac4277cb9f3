//! Download endpoint tests — byte-exact streaming and request validation.

use anyhow::Result;
use spate_core::config::StreamConfig;

use crate::{start_server, start_server_with};

#[tokio::test]
async fn download_streams_exactly_the_requested_bytes() -> Result<()> {
    let server = start_server().await?;

    let resp = reqwest::get(server.url("/download/dl-basic?bytes=65536")).await?;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("no-cache, no-store, must-revalidate")
    );
    assert_eq!(
        resp.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/octet-stream")
    );

    let body = resp.bytes().await?;
    assert_eq!(body.len(), 65536);

    let status: serde_json::Value = reqwest::get(server.url("/status/dl-basic"))
        .await?
        .json()
        .await?;
    assert_eq!(status["downloadCount"], 65536);
    assert!(status["downloadStart"].as_u64().unwrap() > 0);
    assert!(status["downloadEnd"].as_u64().unwrap() >= status["downloadStart"].as_u64().unwrap());

    Ok(())
}

#[tokio::test]
async fn oversized_requests_are_capped_at_the_configured_limit() -> Result<()> {
    let server = start_server_with(StreamConfig {
        download_max_bytes: 4096,
        download_buffer_bytes: 1024,
        ..Default::default()
    })
    .await?;

    let resp = reqwest::get(server.url("/download/dl-capped?bytes=1000000")).await?;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.bytes().await?.len(), 4096);

    let status: serde_json::Value = reqwest::get(server.url("/status/dl-capped"))
        .await?
        .json()
        .await?;
    assert_eq!(status["downloadCount"], 4096);

    Ok(())
}

#[tokio::test]
async fn malformed_byte_counts_are_rejected_without_creating_a_session() -> Result<()> {
    let server = start_server().await?;

    let resp = reqwest::get(server.url("/download/dl-bad?bytes=abc")).await?;
    assert_eq!(resp.status(), 400);
    assert!(resp.bytes().await?.is_empty());

    let resp = reqwest::get(server.url("/download/dl-bad")).await?;
    assert_eq!(resp.status(), 400);

    // The failed requests must not have left a session behind.
    let resp = reqwest::get(server.url("/status/dl-bad")).await?;
    assert_eq!(resp.status(), 404);

    Ok(())
}

#[tokio::test]
async fn zero_byte_download_creates_an_idle_session() -> Result<()> {
    let server = start_server().await?;

    let resp = reqwest::get(server.url("/download/dl-zero?bytes=0")).await?;
    assert_eq!(resp.status(), 200);
    assert!(resp.bytes().await?.is_empty());

    // The session exists but has no activity at all.
    let status: serde_json::Value = reqwest::get(server.url("/status/dl-zero"))
        .await?
        .json()
        .await?;
    assert_eq!(status, serde_json::json!({}));

    Ok(())
}

#[tokio::test]
async fn negative_byte_counts_clamp_to_zero() -> Result<()> {
    let server = start_server().await?;

    let resp = reqwest::get(server.url("/download/dl-negative?bytes=-5")).await?;
    assert_eq!(resp.status(), 200);
    assert!(resp.bytes().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn repeated_downloads_accumulate_on_one_meter() -> Result<()> {
    let server = start_server().await?;

    for _ in 0..3 {
        let resp = reqwest::get(server.url("/download/dl-repeat?bytes=10000")).await?;
        assert_eq!(resp.bytes().await?.len(), 10000);
    }

    let status: serde_json::Value = reqwest::get(server.url("/status/dl-repeat"))
        .await?
        .json()
        .await?;
    assert_eq!(status["downloadCount"], 30000);

    Ok(())
}
