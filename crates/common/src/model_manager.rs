//! Model Manager for automatic model downloading
//!
//! Resolves whisper.cpp model names to ggml files and downloads missing ones

use crate::{Result, VoiceBriefError};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

/// Whisper model information
#[derive(Debug, Clone)]
pub struct WhisperModel {
    /// Model name (e.g., "base.en", "small", "medium")
    pub name: String,

    /// Approximate file size in bytes
    pub size: u64,

    /// Download URL
    pub url: String,
}

impl WhisperModel {
    fn new(name: &str, size_mb: u64) -> Self {
        Self {
            name: name.to_string(),
            size: size_mb * 1024 * 1024,
            url: format!("{}/ggml-{}.bin", MODEL_BASE_URL, name),
        }
    }

    /// Get model filename
    pub fn filename(&self) -> String {
        model_filename(&self.name)
    }

    /// Get size in MB
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1024.0 / 1024.0
    }
}

const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// ggml file name for a model name
pub fn model_filename(name: &str) -> String {
    format!("ggml-{}.bin", name)
}

/// Available Whisper models
pub fn available_whisper_models() -> Vec<WhisperModel> {
    vec![
        WhisperModel::new("tiny", 75),
        WhisperModel::new("tiny.en", 75),
        WhisperModel::new("base", 142),
        WhisperModel::new("base.en", 142),
        WhisperModel::new("small", 466),
        WhisperModel::new("small.en", 466),
        WhisperModel::new("medium", 1500),
        WhisperModel::new("medium.en", 1500),
        WhisperModel::new("large-v3", 3100),
        WhisperModel::new("large-v3-turbo", 1620),
    ]
}

/// Model Manager
pub struct ModelManager {
    models_dir: PathBuf,
    client: Client,
}

impl ModelManager {
    /// Create new model manager
    pub fn new(models_dir: PathBuf) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(3600)) // 1 hour for large downloads
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { models_dir, client })
    }

    /// Get default models directory
    pub fn default_models_dir() -> PathBuf {
        #[cfg(target_os = "linux")]
        {
            if let Some(home) = std::env::var_os("HOME") {
                return PathBuf::from(home).join(".cache/voicebrief/models");
            }
        }

        #[cfg(target_os = "macos")]
        {
            if let Some(home) = std::env::var_os("HOME") {
                return PathBuf::from(home).join("Library/Caches/voicebrief/models");
            }
        }

        #[cfg(target_os = "windows")]
        {
            if let Some(local_app_data) = std::env::var_os("LOCALAPPDATA") {
                return PathBuf::from(local_app_data).join("voicebrief\\models");
            }
        }

        PathBuf::from("models")
    }

    /// Local path a model would live at
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.models_dir.join(model_filename(model_name))
    }

    /// Catalog entry for a model name
    pub fn find_model(model_name: &str) -> Option<WhisperModel> {
        available_whisper_models()
            .into_iter()
            .find(|m| m.name == model_name)
    }

    /// Ensure Whisper model exists, download if missing and allowed
    pub async fn ensure_whisper_model(&self, model_name: &str, allow_download: bool) -> Result<PathBuf> {
        let model_path = self.model_path(model_name);

        if model_path.exists() {
            info!("Model already exists: {}", model_path.display());
            return Ok(model_path);
        }

        if !allow_download {
            return Err(VoiceBriefError::stt_unavailable(format!(
                "Whisper model '{}' is not installed at {}. Download it or enable AUTO_DOWNLOAD_MODELS.",
                model_name,
                model_path.display()
            )));
        }

        let model_info = Self::find_model(model_name).ok_or_else(|| {
            VoiceBriefError::stt_unavailable(format!(
                "Unknown whisper model '{}'. Place {} in {} or pick one of: {}",
                model_name,
                model_filename(model_name),
                self.models_dir.display(),
                available_whisper_models()
                    .iter()
                    .map(|m| m.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;

        info!("Model not found, downloading: {}", model_name);
        self.download_model(&model_info, &model_path).await?;

        Ok(model_path)
    }

    /// Download model from URL
    pub async fn download_model(&self, model: &WhisperModel, dest: &Path) -> Result<()> {
        info!(
            "Downloading {} ({:.1} MB) from {}",
            model.filename(),
            model.size_mb(),
            model.url
        );

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }

        let pb = ProgressBar::new(model.size);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        let response = self
            .client
            .get(&model.url)
            .send()
            .await
            .map_err(|e| VoiceBriefError::stt_unavailable(format!("Failed to download {}: {}", model.name, e)))?;

        if !response.status().is_success() {
            return Err(VoiceBriefError::stt_unavailable(format!(
                "Download of {} failed with status: {}",
                model.name,
                response.status()
            )));
        }

        // Unique temp name per download: two requests may fetch the same model at once
        let temp_path = temp_download_path(dest);
        if let Err(e) = write_download(response, &temp_path, &pb).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }
        pb.finish_with_message("Download complete");

        let downloaded = fs::metadata(&temp_path).await?.len();
        if downloaded < model.size / 2 {
            fs::remove_file(&temp_path).await?;
            return Err(VoiceBriefError::stt_unavailable(format!(
                "Downloaded file is too small ({} bytes, expected ~{} bytes)",
                downloaded, model.size
            )));
        }

        if let Err(e) = fs::rename(&temp_path, dest).await {
            let _ = fs::remove_file(&temp_path).await;
            if !fs::try_exists(dest).await.unwrap_or(false) {
                return Err(e.into());
            }
            // Another download of the same model finished first
            info!("{} was installed concurrently, keeping it", dest.display());
            return Ok(());
        }

        info!("Download successful: {}", dest.display());

        Ok(())
    }

    /// List installed models
    pub async fn list_installed_models(&self) -> Result<Vec<String>> {
        if !self.models_dir.exists() {
            return Ok(Vec::new());
        }

        let mut models = Vec::new();
        let mut entries = fs::read_dir(&self.models_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("bin") {
                if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                    if let Some(model) = name.strip_prefix("ggml-") {
                        models.push(model.to_string());
                    }
                }
            }
        }

        models.sort();
        if models.is_empty() {
            warn!("No whisper models installed in {}", self.models_dir.display());
        }

        Ok(models)
    }
}

fn temp_download_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    dest.with_file_name(format!("{}.{}.tmp", name, Uuid::new_v4()))
}

async fn write_download(response: reqwest::Response, temp_path: &Path, pb: &ProgressBar) -> Result<()> {
    let mut file = fs::File::create(temp_path).await?;
    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|e| VoiceBriefError::stt_unavailable(format!("Download error: {}", e)))?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.sync_all().await?;
    Ok(())
}
