use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use voicebrief_common::{ModelManager, Result, TranscriberKind, VoiceBriefError};

use crate::audio;
use crate::transcriber::Transcriber;
use crate::types::{Availability, TranscriptionOptions};
use crate::whisper::WhisperEngine;

/// Runs whisper.cpp models inside the server process
///
/// Loaded models are kept per name for the life of the transcriber.
pub struct InProcessTranscriber {
    models: ModelManager,
    auto_download: bool,
    default_model: String,
    ffmpeg_path: String,
    engines: Mutex<HashMap<String, Arc<WhisperEngine>>>,
    /// Held while a model is downloaded and loaded
    loading: tokio::sync::Mutex<()>,
}

impl InProcessTranscriber {
    pub fn new(
        models_dir: PathBuf,
        auto_download: bool,
        default_model: impl Into<String>,
        ffmpeg_path: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            models: ModelManager::new(models_dir)?,
            auto_download,
            default_model: default_model.into(),
            ffmpeg_path: ffmpeg_path.into(),
            engines: Mutex::new(HashMap::new()),
            loading: tokio::sync::Mutex::new(()),
        })
    }

    fn cached(&self, model: &str) -> Option<Arc<WhisperEngine>> {
        self.engines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(model)
            .cloned()
    }

    async fn engine(&self, model: &str) -> Result<Arc<WhisperEngine>> {
        if let Some(engine) = self.cached(model) {
            debug!("Reusing loaded whisper model {}", model);
            return Ok(engine);
        }

        // One load at a time; a request that waited may find the model ready
        let _loading = self.loading.lock().await;
        if let Some(engine) = self.cached(model) {
            return Ok(engine);
        }

        let model_path = self
            .models
            .ensure_whisper_model(model, self.auto_download)
            .await?;

        let engine = tokio::task::spawn_blocking(move || WhisperEngine::new(model_path))
            .await
            .map_err(|e| VoiceBriefError::internal(format!("Model loading task failed: {}", e)))??;

        let engine = Arc::new(engine);
        self.engines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(model.to_string(), engine.clone());

        Ok(engine)
    }
}

#[async_trait]
impl Transcriber for InProcessTranscriber {
    async fn transcribe(&self, audio_path: &Path, model: &str) -> Result<String> {
        let engine = self.engine(model).await?;
        let path = audio_path.to_path_buf();
        let ffmpeg_path = self.ffmpeg_path.clone();
        let options = TranscriptionOptions::for_model(model);

        info!("Transcribing {} in-process with model {}", audio_path.display(), model);

        let transcription = tokio::task::spawn_blocking(move || {
            let samples = audio::load_audio(&path, &ffmpeg_path)?;
            engine.transcribe(&samples, &options)
        })
        .await
        .map_err(|e| VoiceBriefError::internal(format!("Transcription task failed: {}", e)))??;

        info!(
            "Transcribed {:.1}s of audio: {} segments, {} characters, language {}",
            transcription.duration(),
            transcription.segments.len(),
            transcription.text.len(),
            transcription.language
        );

        Ok(transcription.text)
    }

    async fn availability(&self) -> Availability {
        let model = self.default_model.as_str();
        let model_path = self.models.model_path(model);

        if self.cached(model).is_some() {
            return Availability::ready();
        }

        if tokio::fs::try_exists(&model_path).await.unwrap_or(false) {
            return Availability::ready_with(format!("model {} not loaded yet", model_path.display()));
        }

        if self.auto_download && ModelManager::find_model(model).is_some() {
            return Availability::ready_with(format!(
                "model {} will be downloaded on first use",
                model
            ));
        }

        let installed = self.models.list_installed_models().await.unwrap_or_default();
        Availability::unavailable(format!(
            "Whisper model '{}' is not installed at {} (installed: {})",
            model,
            model_path.display(),
            if installed.is_empty() {
                "none".to_string()
            } else {
                installed.join(", ")
            }
        ))
    }

    fn kind(&self) -> TranscriberKind {
        TranscriberKind::InProcess
    }
}
