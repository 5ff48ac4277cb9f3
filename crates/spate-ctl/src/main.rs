//! spate-ctl — command-line client for the spate daemon.

use std::time::Instant;

use anyhow::{bail, Context, Result};
use rand::RngCore;
use serde::Deserialize;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DOWNLOAD_BYTES: u64 = 10_000_000;
const DEFAULT_UPLOAD_BYTES: u64 = 5_000_000;
const DEFAULT_PING_COUNT: u32 = 5;

// ── Response types ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct StatusResponse {
    upload_count: u64,
    upload_start: u64,
    upload_end: u64,
    download_count: u64,
    download_start: u64,
    download_end: u64,
}

// ── HTTP helpers ──────────────────────────────────────────────────────────────

fn base_url(host: &str, port: u16) -> String {
    format!("http://{}:{}", host, port)
}

async fn get_checked(url: &str) -> Result<reqwest::Response> {
    let resp = reqwest::get(url)
        .await
        .with_context(|| format!("failed to connect to spated at {} — is it running?", url))?;
    if !resp.status().is_success() {
        bail!("server answered {}", resp.status());
    }
    Ok(resp)
}

/// Format one direction's counters as a human-readable throughput line.
fn transfer_line(count: u64, start_ms: u64, end_ms: u64) -> String {
    if count == 0 {
        return "no activity".to_string();
    }
    let millis = end_ms.saturating_sub(start_ms);
    if millis == 0 {
        return format!("{} bytes", count);
    }
    let secs = millis as f64 / 1000.0;
    let rate = (count as f64 * 8.0) / secs / 1_000_000.0;
    format!("{} bytes in {:.2}s ({:.1} Mbit/s)", count, secs, rate)
}

fn client_rate(bytes: u64, secs: f64) -> String {
    format!(
        "{} bytes in {:.2}s ({:.1} Mbit/s)",
        bytes,
        secs,
        (bytes as f64 * 8.0) / secs / 1_000_000.0
    )
}

// ── Subcommand handlers ───────────────────────────────────────────────────────

async fn cmd_status(base: &str, session: &str) -> Result<()> {
    let resp = reqwest::get(format!("{}/status/{}", base, session))
        .await
        .with_context(|| format!("failed to connect to spated at {} — is it running?", base))?;

    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        println!("No such session: {}", session);
        return Ok(());
    }
    let status: StatusResponse = resp.json().await.context("failed to parse response")?;

    println!("═══════════════════════════════════════");
    println!("  Session {}", session);
    println!("═══════════════════════════════════════");
    println!(
        "  Download : {}",
        transfer_line(
            status.download_count,
            status.download_start,
            status.download_end
        )
    );
    println!(
        "  Upload   : {}",
        transfer_line(status.upload_count, status.upload_start, status.upload_end)
    );

    Ok(())
}

async fn cmd_clear(base: &str, session: &str) -> Result<()> {
    let resp = reqwest::Client::new()
        .delete(format!("{}/clear/{}", base, session))
        .send()
        .await
        .with_context(|| format!("failed to connect to spated at {} — is it running?", base))?;

    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        println!("No such session: {}", session);
    } else {
        println!("Session {} cleared.", session);
    }
    Ok(())
}

async fn cmd_ping(base: &str, session: &str, count: u32) -> Result<()> {
    let url = format!("{}/ping/{}", base, session);
    let mut samples: Vec<f64> = Vec::with_capacity(count as usize);

    for i in 0..count {
        let started = Instant::now();
        get_checked(&url).await?;
        let millis = started.elapsed().as_secs_f64() * 1000.0;
        println!("  probe {} : {:.1} ms", i + 1, millis);
        samples.push(millis);
    }

    let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = samples.iter().cloned().fold(0.0, f64::max);
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    println!("  min/avg/max : {:.1}/{:.1}/{:.1} ms", min, mean, max);

    Ok(())
}

async fn cmd_download(base: &str, session: &str, bytes: u64) -> Result<()> {
    let url = format!("{}/download/{}?bytes={}", base, session, bytes);

    let started = Instant::now();
    let mut resp = get_checked(&url).await?;
    let mut received: u64 = 0;
    while let Some(chunk) = resp.chunk().await.context("download stream failed")? {
        received += chunk.len() as u64;
    }
    let secs = started.elapsed().as_secs_f64();

    println!("  Download : {}", client_rate(received, secs));
    cmd_status(base, session).await
}

async fn cmd_upload(base: &str, session: &str, bytes: u64) -> Result<()> {
    let mut payload = vec![0u8; bytes as usize];
    rand::thread_rng().fill_bytes(&mut payload);

    let started = Instant::now();
    let resp = reqwest::Client::new()
        .put(format!("{}/upload/{}", base, session))
        .body(payload)
        .send()
        .await
        .with_context(|| format!("failed to connect to spated at {} — is it running?", base))?;
    let secs = started.elapsed().as_secs_f64();

    if !resp.status().is_success() {
        bail!("server answered {}", resp.status());
    }
    let ack = resp.text().await.context("failed to read upload ack")?;
    if ack != "ok" {
        bail!("unexpected upload ack: {:?}", ack);
    }

    println!("  Upload : {}", client_rate(bytes, secs));
    cmd_status(base, session).await
}

fn print_usage() {
    println!("Usage: spate-ctl [options] <command>");
    println!();
    println!("Commands:");
    println!("  status <session>     Show a session's transfer counters");
    println!("  clear <session>      Drop a session from the registry");
    println!("  ping <session>       Probe request latency");
    println!("  download <session>   Run a download measurement");
    println!("  upload <session>     Run an upload measurement");
    println!();
    println!("Options:");
    println!("  --host <addr>    Daemon address (default: {})", DEFAULT_HOST);
    println!("  --port <port>    Daemon port (default: {})", DEFAULT_PORT);
    println!(
        "  --bytes <n>      Bytes to move (defaults: download {}, upload {})",
        DEFAULT_DOWNLOAD_BYTES, DEFAULT_UPLOAD_BYTES
    );
    println!(
        "  --count <n>      Ping probes to send (default: {})",
        DEFAULT_PING_COUNT
    );
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Parse options
    let mut host = DEFAULT_HOST.to_string();
    let mut port = DEFAULT_PORT;
    let mut bytes: Option<u64> = None;
    let mut count = DEFAULT_PING_COUNT;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--host" => {
                i += 1;
                host = args.get(i).context("--host requires a value")?.clone();
            }
            "--port" => {
                i += 1;
                port = args
                    .get(i)
                    .context("--port requires a value")?
                    .parse()
                    .context("--port must be a number")?;
            }
            "--bytes" => {
                i += 1;
                bytes = Some(
                    args.get(i)
                        .context("--bytes requires a value")?
                        .parse()
                        .context("--bytes must be a number")?,
                );
            }
            "--count" => {
                i += 1;
                count = args
                    .get(i)
                    .context("--count requires a value")?
                    .parse()
                    .context("--count must be a number")?;
            }
            _ => remaining.push(&args[i]),
        }
        i += 1;
    }

    let base = base_url(&host, port);

    match remaining.as_slice() {
        ["status", session] => cmd_status(&base, session).await,
        ["clear", session] => cmd_clear(&base, session).await,
        ["ping", session] => cmd_ping(&base, session, count).await,
        ["download", session] => {
            cmd_download(&base, session, bytes.unwrap_or(DEFAULT_DOWNLOAD_BYTES)).await
        }
        ["upload", session] => {
            cmd_upload(&base, session, bytes.unwrap_or(DEFAULT_UPLOAD_BYTES)).await
        }
        ["help"] | ["--help"] | ["-h"] | [] => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
