use crate::types::Content;
use async_trait::async_trait;
use voicebrief_common::Result;

/// Common trait for completion backends
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send a conversation and return the trimmed text of the first candidate
    ///
    /// The returned text may be empty; callers decide on a fallback.
    async fn complete(&self, contents: Vec<Content>) -> Result<String>;
}
