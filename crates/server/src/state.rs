use std::sync::Arc;
use voicebrief_common::{AppConfig, Result};
use voicebrief_llm::{ChatRelay, CompletionClient, GeminiClient, Summarizer};
use voicebrief_stt::{build_transcriber, Transcriber};

use crate::pipeline::Pipeline;

/// Shared application state
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Chat relay
    pub relay: ChatRelay,

    /// Transcribe-summarize pipeline
    pub pipeline: Arc<Pipeline>,

    /// Transcription strategy, also checked by `/health`
    pub transcriber: Arc<dyn Transcriber>,
}

impl AppState {
    /// Create new application state with the configured Gemini client and transcriber
    pub fn new(config: AppConfig) -> Result<Self> {
        let client: Arc<dyn CompletionClient> = Arc::new(GeminiClient::new(&config)?);
        let transcriber = build_transcriber(&config)?;
        Ok(Self::with_components(config, client, transcriber))
    }

    /// Create state around explicit collaborators
    pub fn with_components(
        config: AppConfig,
        client: Arc<dyn CompletionClient>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        let relay = ChatRelay::new(client.clone());
        let summarizer = Summarizer::new(client, config.summary_max_chars);
        let pipeline = Arc::new(Pipeline::new(
            transcriber.clone(),
            summarizer,
            config.upload_dir.clone(),
            config.whisper_model.clone(),
        ));

        Self {
            config,
            relay,
            pipeline,
            transcriber,
        }
    }
}
