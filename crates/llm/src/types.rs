use serde::{Deserialize, Serialize};
use voicebrief_common::{Result, VoiceBriefError};

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One chat message as received from the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

/// Chat relay request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation so far, oldest first
    pub messages: Vec<ChatMessage>,

    /// Instruction injected ahead of the conversation
    #[serde(default)]
    pub system_prompt: Option<String>,
}

/// Chat relay response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Gemini turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    /// Single-part turn
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::text(text)],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    /// Concatenated text of all parts
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(|p| p.text.as_deref()).collect()
    }
}

/// Gemini content part (only text parts are produced or read)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Gemini generateContent request
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

/// Gemini generateContent response
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Option<Vec<Part>>,
}

impl GenerateContentResponse {
    /// Trimmed text of the first candidate, possibly empty
    pub fn first_candidate_text(&self) -> Result<String> {
        let candidate = self
            .candidates
            .as_deref()
            .and_then(|candidates| candidates.first())
            .ok_or_else(|| VoiceBriefError::malformed_upstream("No candidates in Gemini response"))?;

        let parts = candidate
            .content
            .as_ref()
            .and_then(|content| content.parts.as_ref())
            .ok_or_else(|| {
                VoiceBriefError::malformed_upstream(
                    "Unexpected Gemini response format: candidate is missing content.parts",
                )
            })?;

        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        Ok(text.trim().to_string())
    }
}

/// Summarization result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Summary text
    pub text: String,

    /// Whether the input was cut to the character budget
    pub truncated: bool,
}

impl Summary {
    pub fn new(text: String, truncated: bool) -> Self {
        Self { text, truncated }
    }
}
