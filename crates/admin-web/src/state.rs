//! Application state shared across handlers.

use std::sync::Arc;

use bot_store::StatsAccumulator;
use broadcaster::EventBroadcaster;
use message_listener::Controller;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Usage statistics.
    pub stats: Arc<StatsAccumulator>,
    /// Dashboard event fan-out.
    pub broadcaster: EventBroadcaster,
    /// Dashboard command handling (owns the config store).
    pub controller: Controller,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        stats: Arc<StatsAccumulator>,
        broadcaster: EventBroadcaster,
        controller: Controller,
    ) -> Self {
        Self {
            stats,
            broadcaster,
            controller,
        }
    }
}
