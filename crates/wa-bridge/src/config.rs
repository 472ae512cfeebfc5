//! Bridge connection settings and route layout.
//!
//! The sidecar hosts one or more WhatsApp sessions and scopes every call
//! under `/sessions/{name}`:
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET  /health` | sidecar liveness |
//! | `POST /sessions/{name}/rpc` | JSON-RPC 2.0 session and chat calls |
//! | `GET  /sessions/{name}/events` | SSE stream of session events |

use std::time::Duration;

/// Bridge URL used when none is configured.
pub const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:8080";

/// Session addressed when none is named.
pub const DEFAULT_SESSION: &str = "default";

/// Where the bridge lives and which of its sessions this client drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    base_url: String,
    session: String,
    rpc_timeout: Duration,
}

impl BridgeConfig {
    /// Address the default session of the bridge at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_session(base_url, DEFAULT_SESSION)
    }

    /// Address a named session. A blank name falls back to the default.
    pub fn with_session(base_url: impl Into<String>, session: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let session = session.into();
        let session = match session.trim() {
            "" => DEFAULT_SESSION.to_string(),
            name => name.to_string(),
        };

        Self {
            base_url,
            session,
            rpc_timeout: Duration::from_secs(30),
        }
    }

    /// Override the timeout of RPC and health requests.
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    /// Timeout of RPC and health requests. The event stream has none.
    pub fn rpc_timeout(&self) -> Duration {
        self.rpc_timeout
    }

    /// Sidecar liveness endpoint.
    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    /// JSON-RPC endpoint of the session.
    pub fn rpc_url(&self) -> String {
        format!("{}/rpc", self.session_url())
    }

    /// SSE endpoint of the session.
    pub fn events_url(&self) -> String {
        format!("{}/events", self.session_url())
    }

    fn session_url(&self) -> String {
        format!(
            "{}/sessions/{}",
            self.base_url,
            urlencoding::encode(&self.session)
        )
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BRIDGE_URL)
    }
}
