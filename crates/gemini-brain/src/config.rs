//! Configuration for GeminiClient.

use std::env;
use std::time::Duration;

use zap_core::AiError;

/// Default Gemini API base URL.
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Default HTTP request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for GeminiClient.
#[derive(Clone)]
pub struct GeminiConfig {
    /// Gemini API URL.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Optional cap on generated tokens.
    pub max_output_tokens: Option<u32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_output_tokens: None,
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

impl GeminiConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables (first one set wins):
    /// - `GEMINI_API_KEY` - API key for authentication
    /// - `API_KEY` - Legacy name for the same key
    ///
    /// Optional environment variables:
    /// - `GEMINI_API_URL` - API URL (default: https://generativelanguage.googleapis.com)
    /// - `GEMINI_TIMEOUT_SECS` - HTTP timeout (default: 60)
    /// - `GEMINI_MAX_OUTPUT_TOKENS` - Cap on generated tokens (default: unset)
    pub fn from_env() -> Result<Self, AiError> {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AiError::Unavailable("GEMINI_API_KEY not set".to_string()))?;

        let api_url = env::var("GEMINI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let max_output_tokens = env::var("GEMINI_MAX_OUTPUT_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok());

        Ok(Self {
            api_url,
            api_key,
            timeout,
            max_output_tokens,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> GeminiConfigBuilder {
        GeminiConfigBuilder::default()
    }

    /// URL of the generateContent endpoint for a model.
    pub fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            model
        )
    }
}

/// Builder for GeminiConfig.
#[derive(Debug, Default)]
pub struct GeminiConfigBuilder {
    config: GeminiConfig,
}

impl GeminiConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the output token cap.
    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.config.max_output_tokens = Some(tokens);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> GeminiConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeminiConfig::default();

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.api_key.is_empty());
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.max_output_tokens.is_none());
    }

    #[test]
    fn test_builder_all_options() {
        let config = GeminiConfig::builder()
            .api_key("my-key")
            .api_url("http://localhost:9999/")
            .timeout(Duration::from_secs(5))
            .max_output_tokens(256)
            .build();

        assert_eq!(config.api_key, "my-key");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_output_tokens, Some(256));
        assert_eq!(
            config.generate_url("gemini-2.5-flash"),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = GeminiConfig::builder().api_key("super-secret").build();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
    }

    // Environment-based tests are combined into a single test to avoid
    // race conditions when tests run in parallel (env vars are process-global).
    #[test]
    fn test_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        fn clear_all_gemini_vars() {
            std::env::remove_var("GEMINI_API_KEY");
            std::env::remove_var("API_KEY");
            std::env::remove_var("GEMINI_API_URL");
            std::env::remove_var("GEMINI_TIMEOUT_SECS");
            std::env::remove_var("GEMINI_MAX_OUTPUT_TOKENS");
        }

        // Scenario 1: Missing API key disables the client
        clear_all_gemini_vars();
        match GeminiConfig::from_env() {
            Err(AiError::Unavailable(msg)) => assert!(msg.contains("GEMINI_API_KEY")),
            other => panic!("Expected Unavailable error, got {:?}", other),
        }

        // Scenario 2: Legacy key name, defaults used
        clear_all_gemini_vars();
        std::env::set_var("API_KEY", "legacy-key");
        let config = GeminiConfig::from_env().unwrap();
        assert_eq!(config.api_key, "legacy-key");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(60));

        // Scenario 3: All vars set, GEMINI_API_KEY wins
        clear_all_gemini_vars();
        std::env::set_var("API_KEY", "legacy-key");
        std::env::set_var("GEMINI_API_KEY", "primary-key");
        std::env::set_var("GEMINI_API_URL", "http://localhost:1234");
        std::env::set_var("GEMINI_TIMEOUT_SECS", "15");
        std::env::set_var("GEMINI_MAX_OUTPUT_TOKENS", "512");
        let config = GeminiConfig::from_env().unwrap();
        assert_eq!(config.api_key, "primary-key");
        assert_eq!(config.api_url, "http://localhost:1234");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.max_output_tokens, Some(512));

        // Scenario 4: Blank key counts as missing
        clear_all_gemini_vars();
        std::env::set_var("GEMINI_API_KEY", "   ");
        assert!(GeminiConfig::from_env().is_err());

        clear_all_gemini_vars();
    }
}
