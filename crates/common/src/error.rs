use std::path::PathBuf;

/// VoiceBrief error types
#[derive(Debug, thiserror::Error)]
pub enum VoiceBriefError {
    /// Configuration error (missing credential, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid client input
    #[error("{0}")]
    InvalidInput(String),

    /// Transport failure while talking to the LLM API
    #[error("Error calling Gemini API: {0}")]
    Upstream(String),

    /// LLM API answered with a non-success status
    #[error("Gemini API error: {message}")]
    UpstreamStatus { status: u16, message: String },

    /// LLM API answered 2xx with a body we could not use
    #[error("{0}")]
    MalformedUpstream(String),

    /// Transcription collaborator failed
    #[error("{0}")]
    Stt(String),

    /// Transcription collaborator is not installed or cannot be loaded
    #[error("{0}")]
    SttUnavailable(String),

    /// Transcription finished but left no transcript behind
    #[error("Expected whisper transcript {} not found.", .0.display())]
    TranscriptMissing(PathBuf),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VoiceBriefError {
    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create upstream transport error
    pub fn upstream<S: Into<String>>(msg: S) -> Self {
        Self::Upstream(msg.into())
    }

    /// Create malformed upstream response error
    pub fn malformed_upstream<S: Into<String>>(msg: S) -> Self {
        Self::MalformedUpstream(msg.into())
    }

    /// Create STT error
    pub fn stt<S: Into<String>>(msg: S) -> Self {
        Self::Stt(msg.into())
    }

    /// Create STT unavailable error
    pub fn stt_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::SttUnavailable(msg.into())
    }

    /// Create internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

// HTTP response conversion
impl VoiceBriefError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::Config(_) => 500,
            Self::Upstream(_) => 502,
            Self::UpstreamStatus { .. } => 502,
            Self::MalformedUpstream(_) => 502,
            Self::Stt(_) => 500,
            Self::SttUnavailable(_) => 500,
            Self::TranscriptMissing(_) => 500,
            Self::Internal(_) => 500,
            Self::Io(_) => 500,
            Self::Other(_) => 500,
        }
    }
}
