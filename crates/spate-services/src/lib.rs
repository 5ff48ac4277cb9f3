//! spate-services — the session registry and its lifecycle tasks, shared by
//! the API layer and the daemon.

pub mod reaper;
pub mod registry;

pub use registry::SessionRegistry;
