use futures_util::{Stream, StreamExt};
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use voicebrief_common::{Result, VoiceBriefError};
use voicebrief_llm::Summarizer;
use voicebrief_stt::Transcriber;

use crate::artifact::UploadArtifact;
use crate::types::TranscriptSummaryResult;

/// Upload -> transcribe -> summarize, with guaranteed cleanup
pub struct Pipeline {
    transcriber: Arc<dyn Transcriber>,
    summarizer: Summarizer,
    upload_dir: PathBuf,
    default_model: String,
}

impl Pipeline {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        summarizer: Summarizer,
        upload_dir: PathBuf,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            transcriber,
            summarizer,
            upload_dir,
            default_model: default_model.into(),
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Stream an upload to a fresh temporary file
    ///
    /// A missing filename is rejected before anything touches the disk.
    pub async fn persist<S, B, E>(&self, filename: Option<&str>, mut stream: S) -> Result<UploadArtifact>
    where
        S: Stream<Item = std::result::Result<B, E>> + Unpin,
        B: AsRef<[u8]>,
        E: Display,
    {
        let filename = filename
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| VoiceBriefError::invalid_input("No filename provided"))?;

        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let artifact = UploadArtifact::new(&self.upload_dir, filename);

        match write_stream(&artifact, &mut stream).await {
            Ok(bytes) => {
                info!(
                    "Saved upload {} ({} bytes) to {}",
                    filename,
                    bytes,
                    artifact.path().display()
                );
                Ok(artifact)
            }
            Err(e) => {
                let removed = release(artifact).await;
                warn!("Upload of {} failed, removed {} partial file(s)", filename, removed);
                Err(e)
            }
        }
    }

    /// [`Pipeline::process`] on its own task
    ///
    /// Dropping the returned future (a client that disconnected) does not
    /// interrupt transcription or the cleanup that follows it.
    pub async fn process_detached(
        self: &Arc<Self>,
        artifact: UploadArtifact,
        filename: String,
        model: Option<String>,
    ) -> Result<TranscriptSummaryResult> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            pipeline
                .process(artifact, &filename, model.as_deref())
                .await
        })
        .await
        .map_err(|e| VoiceBriefError::internal(format!("Processing task failed: {}", e)))?
    }

    /// Transcribe and summarize a persisted upload, then release it
    ///
    /// Cleanup runs whatever the outcome and never replaces the primary error.
    pub async fn process(
        &self,
        artifact: UploadArtifact,
        filename: &str,
        model: Option<&str>,
    ) -> Result<TranscriptSummaryResult> {
        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.default_model.as_str());

        let result = self.run(&artifact, filename, model).await;

        let removed = release(artifact).await;
        debug!("Cleanup for {} removed {} file(s)", filename, removed);

        result
    }

    async fn run(
        &self,
        artifact: &UploadArtifact,
        filename: &str,
        model: &str,
    ) -> Result<TranscriptSummaryResult> {
        info!(
            "Transcribing {} with {} (model {})",
            filename,
            self.transcriber.kind(),
            model
        );
        let transcript = self.transcriber.transcribe(artifact.path(), model).await?;
        info!("Transcript ready: {} characters", transcript.chars().count());

        let summary = self.summarizer.summarize(&transcript).await?;
        info!("Summary ready for {}", filename);

        Ok(TranscriptSummaryResult {
            filename: filename.to_string(),
            transcript,
            summary: summary.text,
            status: "success".to_string(),
            truncated: summary.truncated,
        })
    }
}

/// Delete the artifact's files on the blocking pool
async fn release(mut artifact: UploadArtifact) -> usize {
    match tokio::task::spawn_blocking(move || artifact.release()).await {
        Ok(removed) => removed,
        Err(e) => {
            warn!("Cleanup task failed: {}", e);
            0
        }
    }
}

async fn write_stream<S, B, E>(artifact: &UploadArtifact, stream: &mut S) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut file = tokio::fs::File::create(artifact.path()).await?;
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|e| VoiceBriefError::invalid_input(format!("Failed to read upload: {}", e)))?;
        let data = chunk.as_ref();
        file.write_all(data).await?;
        written += data.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}
