//! GeminiClient implementation using the Gemini REST API.

use reqwest::Client;
use tracing::{debug, info, warn};
use zap_core::{async_trait, AiError, GenerateRequest, ModelClient};

use crate::api_types::{
    ApiError, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};
use crate::config::GeminiConfig;

/// A [`ModelClient`] backed by Google's Gemini API.
///
/// The client is stateless: conversation context arrives with each
/// [`GenerateRequest`], so one instance can be shared across senders.
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new GeminiClient with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        info!("GeminiClient initialized against {}", config.api_url);

        Ok(Self { http, config })
    }

    /// Create a GeminiClient from environment variables.
    ///
    /// See [`GeminiConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, AiError> {
        Self::new(GeminiConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn build_request(&self, request: &GenerateRequest) -> GenerateContentRequest {
        let system_instruction = Some(request.system_instruction.trim())
            .filter(|s| !s.is_empty())
            .map(Content::instruction);

        GenerateContentRequest {
            contents: request.contents.iter().filter_map(Content::from_turn).collect(),
            system_instruction,
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }

    async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AiError> {
        let url = self.config.generate_url(model);
        debug!("Sending request to Gemini model {}", model);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AiError::TransportFailure(format!("Failed to send request: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                return Err(AiError::TransportFailure(format!(
                    "API error ({}): {}",
                    status.as_u16(),
                    api_error.error.message
                )));
            }

            return Err(AiError::TransportFailure(format!(
                "API error ({}): {}",
                status.as_u16(),
                error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AiError::TransportFailure(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String, AiError> {
        let model = request.model.as_str();
        let body = self.build_request(&request);

        let response = self.generate_content(model, &body).await?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                "Gemini usage: prompt={}, candidates={}, total={}",
                usage.prompt_token_count, usage.candidates_token_count, usage.total_token_count
            );
        }

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => {
                let reason = response
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.as_deref())
                    .unwrap_or("none");
                warn!("Gemini returned no text (finish reason: {})", reason);
                Err(AiError::EmptyResponse)
            }
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
