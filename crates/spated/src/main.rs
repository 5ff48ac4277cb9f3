//! spated — network throughput measurement daemon.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};

use spate_core::config::SpateConfig;
use spate_services::reaper::{self, ReaperSettings};
use spate_services::SessionRegistry;

#[cfg(feature = "embed-ui")]
mod ui;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = SpateConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = SpateConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        SpateConfig::default()
    });

    let addr: SocketAddr = format!("{}:{}", config.network.listen_addr, config.network.port)
        .parse()
        .context("invalid [network] listen_addr/port")?;
    tracing::info!(%addr, "spated starting");

    // Shared state
    let registry = SessionRegistry::shared();

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── Spawn tasks ──────────────────────────────────────────────────────────

    let reaper_task = tokio::spawn(reaper::run(
        registry.clone(),
        ReaperSettings::from(&config.sessions),
        shutdown_tx.subscribe(),
    ));

    let registry_printer = {
        let registry = registry.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                tracing::debug!(sessions = registry.len(), "session registry snapshot");
            }
        })
    };

    let state = spate_api::ApiState {
        registry,
        stream: config.stream.clone(),
    };
    let app = spate_api::router(state);
    #[cfg(feature = "embed-ui")]
    let app = ui::attach(app);

    let api_server_task = tokio::spawn(async move {
        if let Err(e) = spate_api::serve(app, addr).await {
            tracing::error!(error = %e, "api server failed");
        }
    });

    // ── Wait for exit ────────────────────────────────────────────────────────

    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::select! {
        _ = shutdown_rx.recv()  => tracing::info!("shutting down"),
        r = reaper_task         => tracing::error!("session reaper exited: {:?}", r),
        r = registry_printer    => tracing::error!("registry printer exited: {:?}", r),
        r = api_server_task     => tracing::error!("api server exited: {:?}", r),
    }

    Ok(())
}
