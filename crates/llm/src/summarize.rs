use std::sync::Arc;
use tracing::{debug, info};
use voicebrief_common::Result;

use crate::llm_trait::CompletionClient;
use crate::prompts::summary_prompt;
use crate::types::{Content, Summary};

/// Default transcript budget, in characters
pub const DEFAULT_MAX_CHARS: usize = 16_000;

/// Summarizes transcripts with a fixed instruction prompt
#[derive(Clone)]
pub struct Summarizer {
    client: Arc<dyn CompletionClient>,
    max_chars: usize,
}

impl Summarizer {
    /// Create new summarizer
    pub fn new(client: Arc<dyn CompletionClient>, max_chars: usize) -> Self {
        Self { client, max_chars }
    }

    /// Summarize text, cutting it to the character budget first
    pub async fn summarize(&self, text: &str) -> Result<Summary> {
        let (input, truncated) = truncate_chars(text, self.max_chars);
        if truncated {
            info!(
                "Transcript is long ({} chars). Truncating to {} chars before summarizing.",
                text.chars().count(),
                self.max_chars
            );
        }

        debug!("Starting summarization - Input length: {} bytes", input.len());
        let summary = self
            .client
            .complete(vec![Content::user(summary_prompt(input))])
            .await?;

        Ok(Summary::new(summary.trim().to_string(), truncated))
    }
}

/// First `max_chars` characters of `text`, and whether anything was cut
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}
