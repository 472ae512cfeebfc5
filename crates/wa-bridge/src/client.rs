//! Bridge sidecar HTTP client.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use zap_core::{ReplyTarget, Transport, TransportError};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::types::{ChatStateParams, ReplyParams};

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Serialize)]
struct RpcRequest<'a, T: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<T>,
    id: u64,
}

/// JSON-RPC 2.0 response structure.
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    #[allow(dead_code)]
    jsonrpc: String,
    result: Option<T>,
    error: Option<RpcError>,
    #[allow(dead_code)]
    id: u64,
}

/// JSON-RPC 2.0 error.
#[derive(Debug, Deserialize)]
struct RpcError {
    code: i32,
    message: String,
}

/// Client for communicating with the bridge sidecar.
#[derive(Clone)]
pub struct BridgeClient {
    http: Client,
    config: BridgeConfig,
    request_id: Arc<AtomicU64>,
    connected: Arc<AtomicBool>,
}

impl BridgeClient {
    /// Connect to the bridge, verifying it with a health check.
    pub async fn connect(config: BridgeConfig) -> Result<Self, BridgeError> {
        let client = Self::new(config)?;

        if client.health_check().await? {
            info!(
                "Connected to WhatsApp bridge at {} (session {})",
                client.config.base_url(),
                client.config.session()
            );
        } else {
            return Err(BridgeError::HealthCheckFailed);
        }

        Ok(client)
    }

    /// Create a client without contacting the bridge.
    pub fn new(config: BridgeConfig) -> Result<Self, BridgeError> {
        let http = Client::builder()
            .timeout(config.rpc_timeout())
            .build()
            .map_err(BridgeError::Http)?;

        Ok(Self {
            http,
            config,
            request_id: Arc::new(AtomicU64::new(1)),
            connected: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Check if the last health check succeeded.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Perform a health check against the bridge.
    pub async fn health_check(&self) -> Result<bool, BridgeError> {
        let url = self.config.health_url();
        debug!("Health check: {}", url);

        match self.http.get(&url).send().await {
            Ok(resp) => {
                let ok = resp.status().is_success();
                self.connected.store(ok, Ordering::SeqCst);
                Ok(ok)
            }
            Err(e) => {
                self.connected.store(false, Ordering::SeqCst);
                Err(BridgeError::Http(e))
            }
        }
    }

    /// Start the WhatsApp session (QR pairing or restored login).
    pub async fn start_session(&self) -> Result<(), BridgeError> {
        self.session_call("initialize").await
    }

    /// Tear down the browser session, keeping the pairing.
    pub async fn destroy_session(&self) -> Result<(), BridgeError> {
        self.session_call("destroy").await
    }

    /// Log out and unpair the device.
    pub async fn logout_session(&self) -> Result<(), BridgeError> {
        self.session_call("logout").await
    }

    /// Show "composing..." in a chat.
    pub async fn send_state_typing(&self, chat_id: &str) -> Result<(), BridgeError> {
        self.chat_state_call("sendStateTyping", chat_id).await
    }

    /// Clear the presence state of a chat.
    pub async fn clear_chat_state(&self, chat_id: &str) -> Result<(), BridgeError> {
        self.chat_state_call("clearState", chat_id).await
    }

    /// Reply to a message, quoting it when a message id is known.
    pub async fn reply_to(&self, target: &ReplyTarget, text: &str) -> Result<(), BridgeError> {
        let params = ReplyParams {
            chat_id: target.chat_id.clone(),
            quoted_message_id: target.message_id.clone(),
            text: text.to_string(),
        };
        let _: serde_json::Value = self.rpc_call("reply", Some(params)).await?;
        Ok(())
    }

    /// Start a background health monitor that periodically checks the bridge.
    pub fn start_health_monitor(&self, interval: Duration) -> JoinHandle<()> {
        let client = self.clone();

        tokio::spawn(async move {
            let mut consecutive_failures = 0u32;

            loop {
                tokio::time::sleep(interval).await;

                match client.health_check().await {
                    Ok(true) => {
                        if consecutive_failures > 0 {
                            info!("Bridge connection restored");
                        }
                        consecutive_failures = 0;
                    }
                    Ok(false) => {
                        consecutive_failures += 1;
                        warn!(
                            "Health check returned not OK (failures: {})",
                            consecutive_failures
                        );
                    }
                    Err(e) => {
                        consecutive_failures += 1;
                        error!(
                            "Health check failed: {} (failures: {})",
                            e, consecutive_failures
                        );
                    }
                }
            }
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    async fn session_call(&self, method: &str) -> Result<(), BridgeError> {
        let _: serde_json::Value = self.rpc_call::<(), _>(method, None).await?;
        Ok(())
    }

    async fn chat_state_call(&self, method: &str, chat_id: &str) -> Result<(), BridgeError> {
        let params = ChatStateParams {
            chat_id: chat_id.to_string(),
        };
        let _: serde_json::Value = self.rpc_call(method, Some(params)).await?;
        Ok(())
    }

    /// Make a JSON-RPC call to the bridge.
    async fn rpc_call<P: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: Option<P>,
    ) -> Result<R, BridgeError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let url = self.config.rpc_url();

        let request = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        debug!("RPC call: {} (id={})", method, id);

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(BridgeError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Connection(format!("HTTP {}: {}", status, body)));
        }

        let rpc_response: RpcResponse<R> = response.json().await.map_err(BridgeError::Http)?;

        if let Some(error) = rpc_response.error {
            return Err(BridgeError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        rpc_response.result.ok_or_else(|| BridgeError::Rpc {
            code: -1,
            message: "No result in response".to_string(),
        })
    }
}

#[async_trait]
impl Transport for BridgeClient {
    async fn send_typing(&self, chat_id: &str) -> Result<(), TransportError> {
        self.send_state_typing(chat_id).await.map_err(Into::into)
    }

    async fn clear_state(&self, chat_id: &str) -> Result<(), TransportError> {
        self.clear_chat_state(chat_id).await.map_err(Into::into)
    }

    async fn reply(&self, target: &ReplyTarget, text: &str) -> Result<(), TransportError> {
        self.reply_to(target, text).await.map_err(Into::into)
    }

    async fn initialize(&self) -> Result<(), TransportError> {
        self.start_session().await.map_err(Into::into)
    }

    async fn destroy(&self) -> Result<(), TransportError> {
        self.destroy_session().await.map_err(Into::into)
    }

    async fn logout(&self) -> Result<(), TransportError> {
        self.logout_session().await.map_err(Into::into)
    }
}

impl std::fmt::Debug for BridgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeClient")
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}
