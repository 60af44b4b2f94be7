use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};
use voicebrief_common::{Result, TranscriberKind, VoiceBriefError};

use crate::transcriber::Transcriber;
use crate::types::Availability;

/// Suffixes the whisper CLI may leave next to `<stem>` (the empty one is `<stem>` itself)
pub const WHISPER_OUTPUT_EXTENSIONS: &[&str] = &["", ".txt", ".srt", ".vtt", ".json", ".tsv"];

/// Keep this much stderr in error messages
const STDERR_TAIL_CHARS: usize = 2000;

/// Runs the `whisper` command-line tool
#[derive(Debug, Clone)]
pub struct WhisperCliTranscriber {
    program: String,
    prefix_args: Vec<String>,
}

impl WhisperCliTranscriber {
    /// Program plus leading arguments, e.g. `whisper` or `python -m whisper`
    pub fn new(command: &str) -> Self {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next().unwrap_or_else(|| "whisper".to_string());

        Self {
            program,
            prefix_args: words.collect(),
        }
    }

    /// Explicit program and leading arguments
    pub fn with_args(program: impl Into<String>, prefix_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            prefix_args,
        }
    }

    /// Children are killed when the future awaiting them is dropped
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.prefix_args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    fn display_command(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.prefix_args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn not_installed_message(&self) -> String {
        format!(
            "whisper CLI '{}' was not found. Install it with `pip install -U openai-whisper` \
             or point WHISPER_CLI_PATH at the executable.",
            self.display_command()
        )
    }

    fn spawn_error(&self, e: std::io::Error) -> VoiceBriefError {
        if e.kind() == ErrorKind::NotFound {
            VoiceBriefError::stt_unavailable(self.not_installed_message())
        } else {
            VoiceBriefError::stt(format!("Failed to run {}: {}", self.display_command(), e))
        }
    }
}

/// Transcript file the CLI writes for an input: `<dir>/<stem>.txt`
pub fn transcript_path_for(audio_path: &Path) -> PathBuf {
    let stem = audio_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    output_dir_for(audio_path).join(format!("{}.txt", stem))
}

fn output_dir_for(audio_path: &Path) -> PathBuf {
    match audio_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let count = text.chars().count();
    if count <= STDERR_TAIL_CHARS {
        return text.to_string();
    }
    text.chars().skip(count - STDERR_TAIL_CHARS).collect()
}

#[async_trait]
impl Transcriber for WhisperCliTranscriber {
    async fn transcribe(&self, audio_path: &Path, model: &str) -> Result<String> {
        let output_dir = output_dir_for(audio_path);
        info!(
            "Running {} on {} with model {}",
            self.display_command(),
            audio_path.display(),
            model
        );

        let output = self
            .command()
            .arg(audio_path)
            .arg("--model")
            .arg(model)
            .arg("--output_dir")
            .arg(&output_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let tail = stderr_tail(&output.stderr);
            warn!("whisper failed with {}: {}", output.status, tail);
            return Err(VoiceBriefError::stt(format!(
                "whisper exited with {}: {}",
                output.status, tail
            )));
        }

        let transcript_path = transcript_path_for(audio_path);
        if !tokio::fs::try_exists(&transcript_path).await.unwrap_or(false) {
            return Err(VoiceBriefError::TranscriptMissing(transcript_path));
        }

        let transcript = tokio::fs::read_to_string(&transcript_path).await?;
        debug!(
            "Read transcript {} ({} chars)",
            transcript_path.display(),
            transcript.len()
        );

        Ok(transcript.trim().to_string())
    }

    async fn availability(&self) -> Availability {
        let status = self
            .command()
            .arg("--help")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Availability::ready(),
            Ok(status) => Availability::unavailable(format!(
                "{} --help exited with {}",
                self.display_command(),
                status
            )),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Availability::unavailable(self.not_installed_message())
            }
            Err(e) => Availability::unavailable(format!(
                "Failed to run {}: {}",
                self.display_command(),
                e
            )),
        }
    }

    fn kind(&self) -> TranscriberKind {
        TranscriberKind::Cli
    }
}
