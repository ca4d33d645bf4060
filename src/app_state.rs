//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::persistence::EventStore;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Snapshot history and ongoing-event registry, shared with the poll
    /// driver. Handlers only read from it.
    pub store: Arc<dyn EventStore>,
}

impl AppState {
    /// Creates the state around `store`.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }
}
