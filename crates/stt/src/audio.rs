//! Audio decoding and conversion
//!
//! Produces the 16kHz mono f32 samples whisper.cpp expects

use std::fs::File;
use std::path::Path;
use std::process::Command;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info, warn};
use voicebrief_common::{Result, VoiceBriefError};

/// Sample rate whisper models are trained on
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Audio buffer (interleaved f32 samples)
pub struct AudioBuffer {
    /// Audio samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels
    pub channels: u16,
}

impl AudioBuffer {
    /// Create a new audio buffer
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Get duration in seconds
    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.channels as f32 / self.sample_rate as f32
    }

    /// Convert to mono by averaging channels
    pub fn to_mono(mut self) -> Self {
        if self.channels <= 1 {
            return self;
        }

        debug!("Converting {} channel audio to mono", self.channels);

        let channels = self.channels as usize;
        self.samples = self
            .samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        self.channels = 1;
        self
    }

    /// Resample to target sample rate (linear interpolation)
    pub fn resample(mut self, target_rate: u32) -> Self {
        if self.sample_rate == target_rate || self.samples.is_empty() {
            self.sample_rate = target_rate;
            return self;
        }

        debug!("Resampling from {}Hz to {}Hz", self.sample_rate, target_rate);

        let ratio = self.sample_rate as f64 / target_rate as f64;
        let new_length = (self.samples.len() as f64 / ratio) as usize;
        let last = self.samples.len() - 1;
        let mut resampled = Vec::with_capacity(new_length);

        for i in 0..new_length {
            let src_index = i as f64 * ratio;
            let floor = (src_index.floor() as usize).min(last);
            let ceil = (floor + 1).min(last);
            let fraction = (src_index - floor as f64) as f32;

            resampled.push(self.samples[floor] * (1.0 - fraction) + self.samples[ceil] * fraction);
        }

        self.samples = resampled;
        self.sample_rate = target_rate;
        self
    }
}

/// Load any supported file as 16kHz mono samples
///
/// Formats symphonia cannot read go through FFmpeg first.
pub fn load_audio(path: &Path, ffmpeg_path: &str) -> Result<Vec<f32>> {
    let buffer = match decode_file(path) {
        Ok(buffer) => buffer,
        Err(e) => {
            warn!("Could not decode {} directly ({}), converting with FFmpeg", path.display(), e);
            let converted = path.with_extension("ffmpeg.wav");
            let result = convert_to_wav_ffmpeg(ffmpeg_path, path, &converted)
                .and_then(|_| decode_file(&converted));
            if let Err(e) = std::fs::remove_file(&converted) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove temporary WAV file {}: {}", converted.display(), e);
                }
            }
            result?
        }
    };

    let buffer = buffer.to_mono().resample(WHISPER_SAMPLE_RATE);
    info!(
        "Loaded {} audio samples ({:.1}s)",
        buffer.samples.len(),
        buffer.duration()
    );

    Ok(buffer.samples)
}

/// Decode the first audio track of a file with symphonia
pub fn decode_file(path: &Path) -> Result<AudioBuffer> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| VoiceBriefError::stt(format!("Unsupported audio format: {}", e)))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| VoiceBriefError::stt("No audio track found"))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| VoiceBriefError::stt(format!("Unsupported audio codec: {}", e)))?;

    let mut sample_rate = codec_params.sample_rate.unwrap_or(WHISPER_SAMPLE_RATE);
    let mut channels = codec_params.channels.map(|c| c.count() as u16).unwrap_or(1);
    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(VoiceBriefError::stt(format!("Failed to read audio: {}", e))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count() as u16;

                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buf.samples());
            }
            // Corrupt packets are skipped
            Err(SymphoniaError::DecodeError(e)) => warn!("Skipping undecodable packet: {}", e),
            Err(e) => return Err(VoiceBriefError::stt(format!("Failed to decode audio: {}", e))),
        }
    }

    debug!(
        "Decoded {}: {}Hz, {} channels, {} samples",
        path.display(),
        sample_rate,
        channels,
        samples.len()
    );

    Ok(AudioBuffer::new(samples, sample_rate, channels))
}

/// Convert audio file to 16kHz mono WAV using FFmpeg
pub fn convert_to_wav_ffmpeg(ffmpeg_path: &str, input_path: &Path, output_path: &Path) -> Result<()> {
    info!("Converting {} to WAV using FFmpeg", input_path.display());

    let output = Command::new(ffmpeg_path)
        .arg("-i")
        .arg(input_path)
        .args(["-ar", "16000", "-ac", "1", "-c:a", "pcm_s16le", "-y"])
        .arg(output_path)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VoiceBriefError::stt_unavailable(format!(
                    "FFmpeg '{}' was not found; it is needed to read this audio format. Install FFmpeg or set FFMPEG_PATH.",
                    ffmpeg_path
                ))
            } else {
                VoiceBriefError::stt(format!("Failed to run FFmpeg: {}", e))
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VoiceBriefError::stt(format!(
            "FFmpeg conversion failed: {}",
            stderr.trim()
        )));
    }

    Ok(())
}
