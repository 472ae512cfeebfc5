//! ZapBot admin server.
//!
//! Runs the WhatsApp message pipeline and serves the dashboard: the static
//! bundle, a JSON API and the real-time WebSocket channel.

mod config;
mod routes;
mod state;

use std::sync::Arc;
use std::time::Duration;

use bot_store::{ConfigStore, DataDir, StatsAccumulator};
use broadcaster::EventBroadcaster;
use gemini_brain::GeminiClient;
use message_listener::{
    Controller, DeliveryQueue, MessageProcessor, PacingPolicy, ProcessorConfig, ResponseGenerator,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use wa_bridge::{BridgeClient, BridgeConfig};
use zap_core::Transport;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting ZapBot admin server");

    // Persistent state
    let data_dir = DataDir::create(&config.data_dir)?;
    let bot_config = Arc::new(ConfigStore::load(data_dir.config_path()));
    let stats = Arc::new(StatsAccumulator::load(data_dir.stats_path()));

    // Model
    let generator = match GeminiClient::from_env() {
        Ok(client) => {
            info!("Gemini client configured");
            ResponseGenerator::new(Arc::new(client))
        }
        Err(e) => {
            warn!("AI replies disabled: {}", e);
            ResponseGenerator::disabled()
        }
    };

    // WhatsApp bridge
    let bridge_config = match &config.bridge_session {
        Some(session) => BridgeConfig::with_session(&config.bridge_url, session),
        None => BridgeConfig::new(&config.bridge_url),
    };
    let bridge = BridgeClient::new(bridge_config)?;
    let transport: Arc<dyn Transport> = Arc::new(bridge.clone());

    // Pipeline
    let broadcaster = EventBroadcaster::new();
    let (queue, _worker) =
        DeliveryQueue::spawn(transport.clone(), broadcaster.clone(), PacingPolicy::default());

    let processor = MessageProcessor::new(
        bot_config.clone(),
        stats.clone(),
        generator.clone(),
        queue,
        broadcaster.clone(),
        ProcessorConfig {
            context_turns: config.context_turns,
        },
    );
    let controller = Controller::new(bot_config, transport.clone(), generator, broadcaster.clone());

    let events = wa_bridge::subscribe(&bridge)?;
    tokio::spawn(async move {
        if let Err(e) = processor.run(events).await {
            error!("Message processor stopped: {}", e);
        }
    });

    {
        let transport = transport.clone();
        let broadcaster = broadcaster.clone();
        tokio::spawn(async move {
            if let Err(e) = transport.initialize().await {
                error!("Failed to start WhatsApp session: {}", e);
                broadcaster.error(format!("Failed to start WhatsApp client: {}", e));
            }
        });
    }
    let _monitor = bridge.start_health_monitor(Duration::from_secs(30));

    // Build application
    let state = AppState::new(stats, broadcaster, controller);
    let app = routes::app(state, &config.static_dir);

    // Start server
    info!(addr = %config.addr, "Admin web server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

/// Resolves on ctrl-c. If the handler cannot be installed the server keeps
/// running until it is killed.
async fn shutdown_signal() {
    wait_for_signal(tokio::signal::ctrl_c()).await;
}

async fn wait_for_signal<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
