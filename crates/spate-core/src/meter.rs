//! Per-session transfer meter — lock-free byte counters and activity clocks.
//!
//! One `SessionMeter` is shared by every connection streaming under the same
//! session identifier. All cells are relaxed atomics: the registry lock covers
//! map membership only, never metering, so concurrent downloads and uploads
//! against one session stay wait-free.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Which half of a session a meter update applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Download,
    Upload,
}

/// Milliseconds since the Unix epoch. Timestamps of 0 mean "never".
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Byte counters and first/last activity clocks for one session.
///
/// Counters only ever grow; the start clock is written exactly once per
/// direction, the end clock on every counted chunk.
#[derive(Debug, Default)]
pub struct SessionMeter {
    upload_bytes: AtomicU64,
    upload_start_ms: AtomicU64,
    upload_end_ms: AtomicU64,
    download_bytes: AtomicU64,
    download_start_ms: AtomicU64,
    download_end_ms: AtomicU64,
}

impl SessionMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the first-activity clock for `direction`. First caller wins;
    /// later and concurrent calls leave the original timestamp in place.
    pub fn record_transfer_start(&self, direction: Direction) {
        let (start, _, _) = self.cells(direction);
        let _ = start.compare_exchange(0, now_millis(), Ordering::Relaxed, Ordering::Relaxed);
    }

    /// Count `bytes` moved in `direction` and refresh its last-activity clock.
    pub fn record_chunk(&self, direction: Direction, bytes: u64) {
        let (_, end, count) = self.cells(direction);
        count.fetch_add(bytes, Ordering::Relaxed);
        end.store(now_millis(), Ordering::Relaxed);
    }

    /// Point-in-time copy of all six cells.
    ///
    /// Cells are read independently, so a snapshot taken mid-transfer may be
    /// a few chunks ahead on one cell and behind on another. Totals are exact
    /// once the transfer loops have finished.
    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            upload_count: self.upload_bytes.load(Ordering::Relaxed),
            upload_start: self.upload_start_ms.load(Ordering::Relaxed),
            upload_end: self.upload_end_ms.load(Ordering::Relaxed),
            download_count: self.download_bytes.load(Ordering::Relaxed),
            download_start: self.download_start_ms.load(Ordering::Relaxed),
            download_end: self.download_end_ms.load(Ordering::Relaxed),
        }
    }

    fn cells(&self, direction: Direction) -> (&AtomicU64, &AtomicU64, &AtomicU64) {
        match direction {
            Direction::Download => (
                &self.download_start_ms,
                &self.download_end_ms,
                &self.download_bytes,
            ),
            Direction::Upload => (
                &self.upload_start_ms,
                &self.upload_end_ms,
                &self.upload_bytes,
            ),
        }
    }
}

/// Wire shape of a meter, as served by `/status/{id}` and the ws control
/// channel. Zero cells mean "no activity" and are omitted from JSON, so an
/// untouched session serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeterSnapshot {
    #[serde(skip_serializing_if = "is_zero")]
    pub upload_count: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub upload_start: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub upload_end: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub download_count: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub download_start: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub download_end: u64,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}
