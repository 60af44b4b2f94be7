use crate::error::VoiceBriefError;
use crate::model_manager::ModelManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which transcription strategy the pipeline uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriberKind {
    /// Run the `whisper` command-line tool as a child process
    Cli,
    /// Load a whisper.cpp model in this process
    InProcess,
}

impl FromStr for TranscriberKind {
    type Err = VoiceBriefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cli" | "whisper-cli" => Ok(Self::Cli),
            "in-process" | "inprocess" | "whisper-rs" => Ok(Self::InProcess),
            other => Err(VoiceBriefError::config(format!(
                "Unknown transcriber '{}', expected 'cli' or 'in-process'",
                other
            ))),
        }
    }
}

impl fmt::Display for TranscriberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cli => write!(f, "cli"),
            Self::InProcess => write!(f, "in-process"),
        }
    }
}

/// VoiceBrief application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key (never serialized)
    #[serde(skip_serializing, default)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name
    pub gemini_model: String,

    /// Gemini API base URL (up to and including the version segment)
    pub gemini_base_url: String,

    /// Timeout for every LLM API call, in seconds
    pub upstream_timeout_secs: u64,

    /// Maximum transcript characters sent for summarization
    pub summary_max_chars: usize,

    /// Whisper model used when a request does not name one
    pub whisper_model: String,

    /// Transcription strategy
    pub transcriber: TranscriberKind,

    /// Path or name of the whisper CLI binary
    pub whisper_cli_path: String,

    /// Directory holding ggml whisper models
    pub models_dir: PathBuf,

    /// Download missing whisper models on first use
    pub auto_download_models: bool,

    /// Path or name of the ffmpeg binary
    pub ffmpeg_path: String,

    /// Directory for temporary uploads
    pub upload_dir: PathBuf,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: "gemini-2.5-flash".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            upstream_timeout_secs: 60,
            summary_max_chars: 16_000,
            whisper_model: "base.en".to_string(),
            transcriber: TranscriberKind::InProcess,
            whisper_cli_path: "whisper".to_string(),
            models_dir: ModelManager::default_models_dir(),
            auto_download_models: true,
            ffmpeg_path: "ffmpeg".to_string(),
            upload_dir: std::env::temp_dir().join("voicebrief"),
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            log_dir: PathBuf::from("./logs"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, VoiceBriefError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();

        let transcriber = match std::env::var("TRANSCRIBER") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.transcriber,
        };

        let config = Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            gemini_model: std::env::var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.gemini_base_url),
            upstream_timeout_secs: Self::get_env_parsed("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or(defaults.upstream_timeout_secs),
            summary_max_chars: Self::get_env_parsed("SUMMARY_MAX_CHARS")
                .unwrap_or(defaults.summary_max_chars),
            whisper_model: std::env::var("WHISPER_MODEL").unwrap_or(defaults.whisper_model),
            transcriber,
            whisper_cli_path: std::env::var("WHISPER_CLI_PATH")
                .unwrap_or(defaults.whisper_cli_path),
            models_dir: Self::get_env_path("WHISPER_MODELS_DIR").unwrap_or(defaults.models_dir),
            auto_download_models: Self::get_env_bool("AUTO_DOWNLOAD_MODELS")
                .unwrap_or(defaults.auto_download_models),
            ffmpeg_path: std::env::var("FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            upload_dir: Self::get_env_path("UPLOAD_DIR").unwrap_or(defaults.upload_dir),
            server_host: std::env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: Self::get_env_parsed("SERVER_PORT").unwrap_or(defaults.server_port),
            log_dir: Self::get_env_path("LOG_DIR").unwrap_or(defaults.log_dir),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        };

        config.validate()?;
        config.ensure_directories()?;

        Ok(config)
    }

    /// Get PathBuf from environment variable
    fn get_env_path(key: &str) -> Option<PathBuf> {
        std::env::var(key).ok().map(PathBuf::from)
    }

    fn get_env_parsed<T: FromStr>(key: &str) -> Option<T> {
        std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
    }

    fn get_env_bool(key: &str) -> Option<bool> {
        std::env::var(key).ok().and_then(|s| parse_bool(&s))
    }

    /// Ensure required directories exist, create if not
    pub fn ensure_directories(&self) -> Result<(), VoiceBriefError> {
        for dir in [&self.upload_dir, &self.log_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    VoiceBriefError::config(format!(
                        "Failed to create directory {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(())
    }

    /// Whether an API key for the LLM is configured
    pub fn has_api_key(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    /// Full `generateContent` endpoint for the configured model
    pub fn gemini_endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.gemini_base_url, self.gemini_model
        )
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), VoiceBriefError> {
        if self.whisper_model.trim().is_empty() {
            return Err(VoiceBriefError::config("Whisper model name cannot be empty"));
        }

        if self.gemini_model.trim().is_empty() {
            return Err(VoiceBriefError::config("Gemini model name cannot be empty"));
        }

        if !self.gemini_base_url.starts_with("http://")
            && !self.gemini_base_url.starts_with("https://")
        {
            return Err(VoiceBriefError::config(
                "Gemini base URL must start with http:// or https://",
            ));
        }

        if self.server_port == 0 {
            return Err(VoiceBriefError::config("Server port cannot be 0"));
        }

        if self.upstream_timeout_secs == 0 {
            return Err(VoiceBriefError::config("Upstream timeout cannot be 0"));
        }

        if self.summary_max_chars == 0 {
            return Err(VoiceBriefError::config("Summary character budget cannot be 0"));
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
