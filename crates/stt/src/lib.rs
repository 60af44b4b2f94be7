//! VoiceBrief STT (Speech-to-Text)
//!
//! Whisper transcription behind one trait: the `whisper` CLI or whisper.cpp in-process

pub mod audio;
pub mod cli;
pub mod factory;
pub mod in_process;
pub mod transcriber;
pub mod types;
pub mod whisper;

// Re-export main types
pub use cli::{transcript_path_for, WhisperCliTranscriber, WHISPER_OUTPUT_EXTENSIONS};
pub use factory::build_transcriber;
pub use in_process::InProcessTranscriber;
pub use transcriber::Transcriber;
pub use types::{Availability, Segment, Transcription, TranscriptionOptions};
pub use whisper::{GpuDevice, WhisperEngine};
