//! Application state shared across handlers.

use std::sync::Arc;

use rollcall_core::{EventStore, RollcallConfig};

/// Shared application state.
///
/// The configuration is immutable once loaded; the store is interior-mutable
/// behind its own synchronization, so no outer lock is needed.
pub struct AppState {
    /// Loaded and validated configuration.
    pub config: RollcallConfig,

    /// The repository backing events, participants, and properties.
    pub store: Arc<dyn EventStore>,
}

/// Handle to the shared application state.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Build a shared state handle.
    pub fn shared(config: RollcallConfig, store: Arc<dyn EventStore>) -> SharedState {
        Arc::new(Self { config, store })
    }
}
