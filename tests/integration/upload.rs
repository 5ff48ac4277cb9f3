//! Upload endpoint tests — body draining, acks, and counter accumulation.

use anyhow::Result;

use crate::start_server;

#[tokio::test]
async fn upload_drains_the_body_and_acks_ok() -> Result<()> {
    let server = start_server().await?;
    let payload = vec![0xA5u8; 100_000];

    let resp = reqwest::Client::new()
        .put(server.url("/upload/ul-basic"))
        .body(payload)
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await?, "ok");

    let status: serde_json::Value = reqwest::get(server.url("/status/ul-basic"))
        .await?
        .json()
        .await?;
    assert_eq!(status["uploadCount"], 100_000);
    assert!(status["uploadStart"].as_u64().unwrap() > 0);
    assert!(status["uploadEnd"].as_u64().unwrap() >= status["uploadStart"].as_u64().unwrap());
    assert!(status.get("downloadCount").is_none());

    Ok(())
}

#[tokio::test]
async fn upload_accepts_post_as_well_as_put() -> Result<()> {
    let server = start_server().await?;

    let resp = reqwest::Client::new()
        .post(server.url("/upload/ul-post"))
        .body(vec![1u8; 2048])
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await?, "ok");

    let status: serde_json::Value = reqwest::get(server.url("/status/ul-post"))
        .await?
        .json()
        .await?;
    assert_eq!(status["uploadCount"], 2048);

    Ok(())
}

#[tokio::test]
async fn empty_upload_still_acks_and_creates_an_idle_session() -> Result<()> {
    let server = start_server().await?;

    let resp = reqwest::Client::new()
        .put(server.url("/upload/ul-empty"))
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await?, "ok");

    // Zero bytes moved: the session exists but its meter is untouched.
    let status: serde_json::Value = reqwest::get(server.url("/status/ul-empty"))
        .await?
        .json()
        .await?;
    assert_eq!(status, serde_json::json!({}));

    Ok(())
}

#[tokio::test]
async fn repeated_uploads_accumulate_on_one_meter() -> Result<()> {
    let server = start_server().await?;
    let client = reqwest::Client::new();

    client
        .put(server.url("/upload/ul-repeat"))
        .body(vec![0u8; 30_000])
        .send()
        .await?;
    client
        .put(server.url("/upload/ul-repeat"))
        .body(vec![0u8; 20_000])
        .send()
        .await?;

    let status: serde_json::Value = reqwest::get(server.url("/status/ul-repeat"))
        .await?
        .json()
        .await?;
    assert_eq!(status["uploadCount"], 50_000);

    Ok(())
}

#[tokio::test]
async fn upload_and_download_meter_independently() -> Result<()> {
    let server = start_server().await?;

    reqwest::get(server.url("/download/mixed?bytes=8192"))
        .await?
        .bytes()
        .await?;
    reqwest::Client::new()
        .put(server.url("/upload/mixed"))
        .body(vec![7u8; 4096])
        .send()
        .await?;

    let status: serde_json::Value = reqwest::get(server.url("/status/mixed"))
        .await?
        .json()
        .await?;
    assert_eq!(status["downloadCount"], 8192);
    assert_eq!(status["uploadCount"], 4096);

    Ok(())
}
