//! HTTP API handlers — the measurement endpoints and the ws control channel.

pub mod control;
pub mod download;
pub mod status;
pub mod upload;

use std::sync::Arc;

use spate_core::config::StreamConfig;
use spate_services::SessionRegistry;

/// Shared state for every handler: the process-wide session registry plus
/// the streaming limits from `[stream]` config.
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<SessionRegistry>,
    pub stream: StreamConfig,
}

// Re-export handler functions for use in router setup.
pub use control::handle_control;
pub use download::handle_download;
pub use status::{handle_clear, handle_ping, handle_status};
pub use upload::handle_upload;
