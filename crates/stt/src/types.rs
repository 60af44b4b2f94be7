use serde::{Deserialize, Serialize};

/// Single transcription segment with timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds
    pub start: f32,

    /// End time in seconds
    pub end: f32,

    /// Transcribed text
    pub text: String,
}

impl Segment {
    /// Create a new segment
    pub fn new(start: f32, end: f32, text: String) -> Self {
        Self { start, end, text }
    }
}

/// Complete transcription result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    /// Full transcribed text
    pub text: String,

    /// Individual segments with timestamps
    pub segments: Vec<Segment>,

    /// Language the model was pinned to, or "auto"
    pub language: String,
}

impl Transcription {
    /// Build from segments, joining their text with single spaces
    pub fn from_segments(segments: Vec<Segment>, language: String) -> Self {
        let text = segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            text,
            segments,
            language,
        }
    }

    /// End of the last segment, in seconds
    pub fn duration(&self) -> f32 {
        self.segments.last().map(|seg| seg.end).unwrap_or(0.0)
    }
}

/// Decoding options for the in-process engine
#[derive(Debug, Clone)]
pub struct TranscriptionOptions {
    /// Language hint (e.g., "en"); `None` lets whisper detect it
    pub language: Option<String>,

    /// Temperature for sampling (0.0 = greedy)
    pub temperature: f32,

    /// No speech threshold
    pub no_speech_threshold: f32,

    /// Worker threads for inference
    pub threads: i32,
}

impl Default for TranscriptionOptions {
    fn default() -> Self {
        Self {
            language: None,
            temperature: 0.0,
            no_speech_threshold: 0.6,
            threads: std::thread::available_parallelism()
                .map(|n| n.get().min(8) as i32)
                .unwrap_or(4),
        }
    }
}

impl TranscriptionOptions {
    /// Options suited to a model name; English-only models are pinned to "en"
    pub fn for_model(model: &str) -> Self {
        let mut options = Self::default();
        if model.ends_with(".en") {
            options.language = Some("en".to_string());
        }
        options
    }
}

/// Whether a transcription strategy can serve requests right now
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub available: bool,

    /// Diagnostic text, mostly set when unavailable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Availability {
    pub fn ready() -> Self {
        Self {
            available: true,
            detail: None,
        }
    }

    pub fn ready_with(detail: impl Into<String>) -> Self {
        Self {
            available: true,
            detail: Some(detail.into()),
        }
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self {
            available: false,
            detail: Some(detail.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcription_from_segments() {
        let segments = vec![
            Segment::new(0.0, 2.0, " First segment ".to_string()),
            Segment::new(2.0, 3.0, "   ".to_string()),
            Segment::new(3.0, 5.0, "Second segment".to_string()),
        ];

        let transcription = Transcription::from_segments(segments, "en".to_string());
        assert_eq!(transcription.text, "First segment Second segment");
        assert_eq!(transcription.duration(), 5.0);
    }

    #[test]
    fn test_empty_transcription() {
        let transcription = Transcription::from_segments(Vec::new(), "auto".to_string());
        assert_eq!(transcription.text, "");
        assert_eq!(transcription.duration(), 0.0);
    }

    #[test]
    fn test_options_for_english_model() {
        assert_eq!(TranscriptionOptions::for_model("base.en").language.as_deref(), Some("en"));
        assert_eq!(TranscriptionOptions::for_model("small").language, None);
        assert!(TranscriptionOptions::default().threads >= 1);
    }
}
