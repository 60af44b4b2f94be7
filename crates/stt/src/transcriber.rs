use async_trait::async_trait;
use std::path::Path;
use voicebrief_common::{Result, TranscriberKind};

use crate::types::Availability;

/// Audio file to text, independent of how the model is run
///
/// Implementations must not block the async runtime: child processes are
/// awaited and CPU-bound inference runs on the blocking pool.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the file at `audio_path` with the named whisper model
    async fn transcribe(&self, audio_path: &Path, model: &str) -> Result<String>;

    /// Whether the strategy is installed and usable
    async fn availability(&self) -> Availability;

    /// Which strategy this is
    fn kind(&self) -> TranscriberKind;
}
