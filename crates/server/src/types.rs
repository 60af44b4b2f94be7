use serde::{Deserialize, Serialize};

/// Query string of `POST /transcribe_summarize`
#[derive(Debug, Default, Deserialize)]
pub struct TranscribeQuery {
    pub whisper_model: Option<String>,
}

/// Result of a successful transcribe-and-summarize run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSummaryResult {
    /// Original upload filename
    pub filename: String,

    pub transcript: String,

    pub summary: String,

    /// Always "success"
    pub status: String,

    /// Present only when the transcript was cut before summarizing
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

/// `GET /`
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
    pub message: String,
}

/// `GET /health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub gemini_api_key_set: bool,
    pub gemini_model: String,
    pub transcriber: String,
    pub whisper_model: String,
    pub transcriber_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcriber_detail: Option<String>,
}

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
