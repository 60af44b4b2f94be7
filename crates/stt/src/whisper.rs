use std::path::Path;
use tracing::{debug, info};
use voicebrief_common::{Result, VoiceBriefError};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::types::{Segment, Transcription, TranscriptionOptions};

/// GPU backend whisper.cpp was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuDevice {
    /// CUDA (NVIDIA GPU)
    Cuda,
    /// Metal (Apple GPU)
    Metal,
    /// CPU only
    Cpu,
}

/// whisper.cpp model loaded in this process
pub struct WhisperEngine {
    ctx: WhisperContext,
}

impl WhisperEngine {
    /// GPU backend selected at build time through feature flags
    fn detect_gpu_device() -> GpuDevice {
        if cfg!(feature = "cuda") {
            GpuDevice::Cuda
        } else if cfg!(feature = "metal") || cfg!(target_os = "macos") {
            GpuDevice::Metal
        } else {
            GpuDevice::Cpu
        }
    }

    /// Load a ggml model file
    ///
    /// Blocking and slow; call from a blocking thread.
    pub fn new(model_path: impl AsRef<Path>) -> Result<Self> {
        let path = model_path.as_ref();

        if !path.exists() {
            return Err(VoiceBriefError::stt_unavailable(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let path_str = path.to_str().ok_or_else(|| {
            VoiceBriefError::stt(format!("Model path is not valid UTF-8: {}", path.display()))
        })?;

        let gpu_device = Self::detect_gpu_device();
        info!("Loading Whisper model from {} on {:?}", path.display(), gpu_device);

        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| {
                VoiceBriefError::stt(format!(
                    "Failed to load Whisper model {} on {:?}: {}",
                    path.display(),
                    gpu_device,
                    e
                ))
            })?;

        info!("Whisper model loaded successfully");

        Ok(Self { ctx })
    }

    /// Transcribe 16kHz mono samples
    pub fn transcribe(&self, samples: &[f32], options: &TranscriptionOptions) -> Result<Transcription> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(options.language.as_deref().unwrap_or("auto")));
        params.set_n_threads(options.threads);
        params.set_temperature(options.temperature);
        params.set_no_speech_thold(options.no_speech_threshold);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| VoiceBriefError::stt(format!("Failed to create Whisper state: {}", e)))?;

        debug!("Starting Whisper inference on {} samples", samples.len());
        state
            .full(params, samples)
            .map_err(|e| VoiceBriefError::stt(format!("Transcription failed: {}", e)))?;

        let num_segments = state
            .full_n_segments()
            .map_err(|e| VoiceBriefError::stt(format!("Failed to get segment count: {}", e)))?;

        let mut segments = Vec::with_capacity(num_segments.max(0) as usize);
        for i in 0..num_segments {
            let text = state
                .full_get_segment_text(i)
                .map_err(|e| VoiceBriefError::stt(format!("Failed to get segment text: {}", e)))?;
            let start = state
                .full_get_segment_t0(i)
                .map_err(|e| VoiceBriefError::stt(format!("Failed to get segment start time: {}", e)))?;
            let end = state
                .full_get_segment_t1(i)
                .map_err(|e| VoiceBriefError::stt(format!("Failed to get segment end time: {}", e)))?;

            // centiseconds
            segments.push(Segment::new(start as f32 / 100.0, end as f32 / 100.0, text));
        }

        let language = options.language.clone().unwrap_or_else(|| "auto".to_string());
        Ok(Transcription::from_segments(segments, language))
    }
}
