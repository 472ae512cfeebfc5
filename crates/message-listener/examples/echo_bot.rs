//! Echo bot example using MessageProcessor.
//!
//! Connects to a running WhatsApp bridge sidecar and echoes every
//! whitelisted direct message back with human-like pacing.
//!
//! Run with: cargo run -p message-listener --example echo_bot
//!
//! Configuration via .env file or environment variables:
//!   WA_BRIDGE_URL - Bridge sidecar (default: http://127.0.0.1:8080)
//!   ECHO_ALLOW    - Comma separated numbers to answer (default: answer everyone)

use std::env;
use std::sync::Arc;

use bot_store::{ConfigStore, DataDir, StatsAccumulator};
use broadcaster::EventBroadcaster;
use message_listener::{
    DeliveryQueue, MessageProcessor, PacingPolicy, ProcessorConfig, ResponseGenerator,
};
use mock_brain::EchoModel;
use wa_bridge::{BridgeClient, BridgeConfig};
use zap_core::{BotConfigPatch, Transport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let url = env::var("WA_BRIDGE_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
    println!("Connecting to {}...", url);
    let client = BridgeClient::connect(BridgeConfig::new(url)).await?;

    let dir = DataDir::create(".data/echo")?;
    let config = Arc::new(ConfigStore::load(dir.config_path()));
    let allow: Vec<String> = env::var("ECHO_ALLOW")
        .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();
    config.update(BotConfigPatch {
        only_allowed: Some(!allow.is_empty()),
        allowed_numbers: Some(allow),
        ..Default::default()
    });

    let broadcaster = EventBroadcaster::new();
    let transport: Arc<dyn Transport> = Arc::new(client.clone());
    let (queue, _worker) = DeliveryQueue::spawn(transport.clone(), broadcaster.clone(), PacingPolicy::default());

    let processor = MessageProcessor::new(
        config,
        Arc::new(StatsAccumulator::load(dir.stats_path())),
        ResponseGenerator::new(Arc::new(EchoModel::with_prefix("Echo: "))),
        queue,
        broadcaster,
        ProcessorConfig::default(),
    );

    let events = wa_bridge::subscribe(&client)?;
    transport.initialize().await?;

    println!("\nEcho bot is running!");
    println!("Scan the QR code in the bridge logs if this is a new session.");
    println!("Press Ctrl+C to stop.\n");

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    processor.run_with_shutdown(events, shutdown).await?;

    Ok(())
}
