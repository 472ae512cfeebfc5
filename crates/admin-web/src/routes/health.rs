//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use broadcaster::BotStatus;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: String,
    pub whatsapp: BotStatus,
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        whatsapp: state.broadcaster.current_status(),
    })
}
