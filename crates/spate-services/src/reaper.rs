//! Idle-session reaper — sweeps the registry and evicts sessions whose
//! meters have gone quiet.
//!
//! Idle time is measured from the per-direction last-activity clock, so a
//! long-running upload keeps its session alive no matter how stale the
//! download side looks, and a session that never moved a byte is never
//! evicted at all.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use spate_core::config::SessionsConfig;
use spate_core::meter::{now_millis, MeterSnapshot};

use crate::registry::SessionRegistry;

/// Sweep cadence and idle thresholds, lifted out of `[sessions]` config.
#[derive(Debug, Clone, Copy)]
pub struct ReaperSettings {
    pub sweep_interval: Duration,
    pub download_idle: Duration,
    pub upload_idle: Duration,
}

impl From<&SessionsConfig> for ReaperSettings {
    fn from(config: &SessionsConfig) -> Self {
        Self {
            sweep_interval: Duration::from_secs(config.sweep_interval_secs),
            download_idle: Duration::from_secs(config.download_idle_secs),
            upload_idle: Duration::from_secs(config.upload_idle_secs),
        }
    }
}

/// Sweep the registry on an interval until the shutdown channel closes.
pub async fn run(
    registry: Arc<SessionRegistry>,
    settings: ReaperSettings,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut interval = tokio::time::interval(settings.sweep_interval);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let removed = sweep(&registry, now_millis(), settings);
                if removed > 0 {
                    tracing::debug!(removed, "evicted idle sessions");
                }
            }
            _ = shutdown_rx.recv() => {
                tracing::debug!("session reaper stopping");
                return;
            }
        }
    }
}

/// One sweep pass: drop every expired session, returning how many went.
pub fn sweep(registry: &SessionRegistry, now_ms: u64, settings: ReaperSettings) -> usize {
    let before = registry.len();
    registry.retain(|_, meter| !expired(&meter.snapshot(), now_ms, settings));
    before.saturating_sub(registry.len())
}

/// A session expires once either direction has activity that stopped longer
/// ago than that direction's threshold. A zero end clock means the direction
/// never moved a byte and does not count against the session.
fn expired(snapshot: &MeterSnapshot, now_ms: u64, settings: ReaperSettings) -> bool {
    let download_stale = snapshot.download_end != 0
        && now_ms.saturating_sub(snapshot.download_end) > settings.download_idle.as_millis() as u64;
    let upload_stale = snapshot.upload_end != 0
        && now_ms.saturating_sub(snapshot.upload_end) > settings.upload_idle.as_millis() as u64;
    download_stale || upload_stale
}
