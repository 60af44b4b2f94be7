use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use voicebrief_common::{AppConfig, Result, VoiceBriefError};

use crate::llm_trait::CompletionClient;
use crate::types::{Content, GenerateContentRequest, GenerateContentResponse};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini generateContent client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl GeminiClient {
    /// Create a client from application configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_endpoint(
            config.gemini_endpoint(),
            config.gemini_model.clone(),
            config.gemini_api_key.clone(),
            Duration::from_secs(config.upstream_timeout_secs),
        )
    }

    /// Create a client for an explicit endpoint
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let endpoint = endpoint.into();
        let model = model.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VoiceBriefError::config(format!("Failed to create HTTP client: {}", e)))?;

        if api_key.is_none() {
            warn!("GEMINI_API_KEY is not set; LLM requests will fail until it is configured");
        }
        info!("Gemini client initialized: model={}, timeout={:?}", model, timeout);

        Ok(Self {
            endpoint,
            model,
            api_key,
            client,
        })
    }

    /// Model name requests are sent to
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Single generateContent call, no retries
    pub async fn generate_content(&self, contents: Vec<Content>) -> Result<GenerateContentResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| VoiceBriefError::config("GEMINI_API_KEY is not set on the server."))?;

        debug!(
            "Sending generateContent request - Model: {}, Turns: {}",
            self.model,
            contents.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, api_key)
            .json(&GenerateContentRequest { contents })
            .send()
            .await
            .map_err(|e| VoiceBriefError::upstream(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VoiceBriefError::upstream(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = upstream_error_message(&body);
            warn!("Gemini returned {}: {}", status, message);
            return Err(VoiceBriefError::UpstreamStatus {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Received Gemini response - Length: {}", body.len());
        parse_success_body(&body)
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, contents: Vec<Content>) -> Result<String> {
        self.generate_content(contents).await?.first_candidate_text()
    }
}

/// Error message from a non-success body: `error.message`, else the JSON, else the raw text
pub fn upstream_error_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("error")
            .and_then(|error| error.get("message"))
            .and_then(|message| message.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        Err(_) => body.to_string(),
    }
}

/// Parse a 2xx body
pub fn parse_success_body(body: &str) -> Result<GenerateContentResponse> {
    serde_json::from_str(body).map_err(|e| {
        VoiceBriefError::malformed_upstream(format!("Unexpected Gemini response format: {}", e))
    })
}
