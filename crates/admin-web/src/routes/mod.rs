//! Route handlers for the admin web interface.

pub mod dashboard;
pub mod health;
pub mod ws;

use std::path::Path;

use axum::routing::get;
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the router with all API routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Real-time channel
        .route("/ws", get(ws::ws_handler))
        // Health check
        .route("/health", get(health::health))
        // API endpoints
        .route("/api/stats", get(dashboard::stats_api))
        .route("/api/config", get(dashboard::config_api))
}

/// Full application: API routes plus the dashboard bundle from `static_dir`.
///
/// Unknown paths fall back to `index.html` so client-side routes resolve.
pub fn app(state: AppState, static_dir: &Path) -> Router {
    let bundle = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    router()
        .fallback_service(bundle)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use bot_store::{ConfigStore, StatsAccumulator};
    use broadcaster::{BotStatus, EventBroadcaster};
    use message_listener::{Controller, ResponseGenerator};
    use mock_brain::RecordingTransport;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;

    fn test_app() -> (TempDir, Router, EventBroadcaster, Arc<StatsAccumulator>) {
        let dir = tempfile::tempdir().unwrap();
        let dist = dir.path().join("dist");
        std::fs::create_dir_all(&dist).unwrap();
        std::fs::write(dist.join("index.html"), "<h1>ZapBot</h1>").unwrap();

        let config = Arc::new(ConfigStore::load(dir.path().join("bot_config.json")));
        let stats = Arc::new(StatsAccumulator::load(dir.path().join("bot_stats.json")));
        let broadcaster = EventBroadcaster::new();
        let controller = Controller::new(
            config,
            Arc::new(RecordingTransport::new()),
            ResponseGenerator::disabled(),
            broadcaster.clone(),
        );

        let state = AppState::new(stats.clone(), broadcaster.clone(), controller);
        (dir, app(state, &dist), broadcaster, stats)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_whatsapp_status() {
        let (_dir, app, broadcaster, _stats) = test_app();
        broadcaster.set_status(BotStatus::Connected);

        let (status, body) = get_json(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["whatsapp"], "CONNECTED");
    }

    #[tokio::test]
    async fn test_config_api_uses_camel_case() {
        let (_dir, app, _broadcaster, _stats) = test_app();

        let (status, body) = get_json(app, "/api/config").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isActive"], true);
        assert_eq!(body["onlyAllowed"], true);
        assert!(body["systemInstruction"].is_string());
        assert!(body["allowedNumbers"].is_array());
    }

    #[tokio::test]
    async fn test_stats_api_reflects_accumulator() {
        let (_dir, app, _broadcaster, stats) = test_app();
        stats.record_inbound("5511999998888", 14);
        stats.record_inbound("5511999998888", 14);

        let (status, body) = get_json(app, "/api/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["messagesToday"], 2);
        assert_eq!(body["activeUsers"], 1);
        assert!(body["hourlyTraffic"].is_array());
    }

    #[tokio::test]
    async fn test_unknown_paths_fall_back_to_index() {
        let (_dir, app, _broadcaster, _stats) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/settings/whitelist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"<h1>ZapBot</h1>");
    }
}
