//! Dashboard JSON API.

use axum::extract::State;
use axum::Json;
use bot_store::StatsSnapshot;
use zap_core::BotConfig;

use crate::state::AppState;

/// Current statistics snapshot.
pub async fn stats_api(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.stats.snapshot())
}

/// Current bot configuration.
pub async fn config_api(State(state): State<AppState>) -> Json<BotConfig> {
    Json((*state.controller.config()).clone())
}
