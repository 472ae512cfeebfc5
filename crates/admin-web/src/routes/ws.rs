//! Real-time dashboard channel.
//!
//! Each connection gets the current config, stats and status on connect,
//! then every broadcast event. Commands from the dashboard arrive as
//! `{"event": ..., "data": ...}` frames.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use broadcaster::{BotEvent, PlaygroundReply};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use zap_core::{BotConfigPatch, ChatTurn};

use crate::state::AppState;

/// Commands the dashboard can send.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientCommand {
    UpdateConfig(BotConfigPatch),
    RestartClient,
    DisconnectSession,
    PlaygroundMessage {
        #[serde(default)]
        history: Vec<ChatTurn>,
        message: String,
    },
}

/// Upgrade to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.broadcaster.subscribe();
    let (direct_tx, mut direct_rx) = mpsc::unbounded_channel::<BotEvent>();

    info!("Dashboard connected");

    // Initial state goes to this connection only.
    let _ = direct_tx.send(BotEvent::ConfigInitial((*state.controller.config()).clone()));
    let _ = direct_tx.send(BotEvent::DashboardUpdate(state.stats.snapshot()));
    let _ = direct_tx.send(BotEvent::BotStatus(state.broadcaster.current_status()));

    let send_task = tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                direct = direct_rx.recv() => match direct {
                    Some(event) => event,
                    None => break,
                },
                broadcast = events.recv() => match broadcast {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Dashboard lagged, skipped {} events", skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };

            let json = match event.to_json() {
                Ok(json) => json,
                Err(e) => {
                    warn!("Failed to serialize {} event: {}", event.name(), e);
                    continue;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => handle_command(&text, &state, &direct_tx),
            Message::Close(_) => break,
            _ => {}
        }
    }

    send_task.abort();
    info!("Dashboard disconnected");
}

fn handle_command(text: &str, state: &AppState, direct_tx: &mpsc::UnboundedSender<BotEvent>) {
    let command = match serde_json::from_str::<ClientCommand>(text) {
        Ok(command) => command,
        Err(e) => {
            debug!("Ignoring dashboard frame: {}", e);
            return;
        }
    };

    match command {
        ClientCommand::UpdateConfig(patch) => {
            state.controller.update_config(patch);
        }
        ClientCommand::RestartClient => {
            let controller = state.controller.clone();
            tokio::spawn(async move {
                let _ = controller.restart_client().await;
            });
        }
        ClientCommand::DisconnectSession => {
            let controller = state.controller.clone();
            tokio::spawn(async move {
                controller.disconnect_session().await;
            });
        }
        ClientCommand::PlaygroundMessage { history, message } => {
            let controller = state.controller.clone();
            let tx = direct_tx.clone();
            tokio::spawn(async move {
                let reply: PlaygroundReply = controller.playground(&history, &message).await;
                let _ = tx.send(BotEvent::PlaygroundReply(reply));
            });
        }
    }
}
