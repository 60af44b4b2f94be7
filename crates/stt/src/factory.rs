use std::sync::Arc;
use tracing::info;
use voicebrief_common::{AppConfig, Result, TranscriberKind};

use crate::cli::WhisperCliTranscriber;
use crate::in_process::InProcessTranscriber;
use crate::transcriber::Transcriber;

/// Build the transcription strategy named by the configuration
pub fn build_transcriber(config: &AppConfig) -> Result<Arc<dyn Transcriber>> {
    info!("Transcription strategy: {}", config.transcriber);

    let transcriber: Arc<dyn Transcriber> = match config.transcriber {
        TranscriberKind::Cli => Arc::new(WhisperCliTranscriber::new(&config.whisper_cli_path)),
        TranscriberKind::InProcess => Arc::new(InProcessTranscriber::new(
            config.models_dir.clone(),
            config.auto_download_models,
            config.whisper_model.clone(),
            config.ffmpeg_path.clone(),
        )?),
    };

    Ok(transcriber)
}
