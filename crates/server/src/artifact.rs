use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;
use voicebrief_stt::WHISPER_OUTPUT_EXTENSIONS;

const ARTIFACT_PREFIX: &str = "voicebrief-";
const DEFAULT_SUFFIX: &str = ".wav";

/// Temporary upload plus every transcript file whisper may write next to it
///
/// Files are removed by [`UploadArtifact::release`], or on drop if release
/// was never called.
#[derive(Debug)]
pub struct UploadArtifact {
    path: PathBuf,
    released: bool,
}

impl UploadArtifact {
    /// Reserve a unique path in `upload_dir` keeping the upload's extension
    pub fn new(upload_dir: &Path, original_filename: &str) -> Self {
        let suffix = Path::new(original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_else(|| DEFAULT_SUFFIX.to_string());

        let name = format!("{}{}{}", ARTIFACT_PREFIX, Uuid::new_v4(), suffix);

        Self {
            path: upload_dir.join(name),
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The upload itself and `<stem><ext>` for each whisper output extension
    pub fn tracked_paths(&self) -> Vec<PathBuf> {
        let stem = self.path.with_extension("");
        let mut paths = vec![self.path.clone()];

        for ext in WHISPER_OUTPUT_EXTENSIONS {
            let mut name = OsString::from(stem.as_os_str());
            name.push(ext);
            let candidate = PathBuf::from(name);
            if !paths.contains(&candidate) {
                paths.push(candidate);
            }
        }

        paths
    }

    /// Delete every tracked file that exists, returning how many were removed
    ///
    /// Failures are logged and skipped.
    pub fn release(&mut self) -> usize {
        if self.released {
            return 0;
        }
        self.released = true;

        let mut removed = 0;
        for path in self.tracked_paths() {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Removed temporary file {}", path.display());
                    removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove temporary file {}: {}", path.display(), e),
            }
        }

        removed
    }
}

impl Drop for UploadArtifact {
    fn drop(&mut self) {
        if !self.released {
            let removed = self.release();
            if removed > 0 {
                debug!("Released {} leftover file(s) for {}", removed, self.path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_from_original_filename() {
        let dir = Path::new("/tmp/uploads");

        let artifact = UploadArtifact::new(dir, "meeting.m4a");
        let name = artifact.path().file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(ARTIFACT_PREFIX));
        assert!(name.ends_with(".m4a"));
        assert_eq!(artifact.path().parent(), Some(dir));

        let artifact = UploadArtifact::new(dir, "recording");
        assert!(artifact.path().to_str().unwrap().ends_with(".wav"));
    }

    #[test]
    fn test_tracked_paths_cover_whisper_outputs() {
        let artifact = UploadArtifact::new(Path::new("/tmp/uploads"), "clip.mp3");
        let stem = artifact.path().with_extension("");
        let tracked = artifact.tracked_paths();

        assert_eq!(tracked[0], artifact.path());
        assert!(tracked.contains(&stem));
        for ext in ["txt", "srt", "vtt", "json", "tsv"] {
            assert!(tracked.contains(&stem.with_extension(ext)));
        }
        assert_eq!(tracked.len(), 7);
    }

    #[test]
    fn test_json_upload_is_tracked_once() {
        let artifact = UploadArtifact::new(Path::new("/tmp/uploads"), "odd.json");
        assert_eq!(artifact.tracked_paths().len(), 6);
    }

    #[test]
    fn test_release_removes_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifact = UploadArtifact::new(dir.path(), "talk.wav");
        std::fs::write(artifact.path(), b"audio").unwrap();
        std::fs::write(artifact.path().with_extension("txt"), b"text").unwrap();
        std::fs::write(artifact.path().with_extension("srt"), b"subs").unwrap();

        assert_eq!(artifact.release(), 3);
        assert_eq!(artifact.release(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_drop_releases() {
        let dir = tempfile::tempdir().unwrap();
        {
            let artifact = UploadArtifact::new(dir.path(), "talk.wav");
            std::fs::write(artifact.path(), b"audio").unwrap();
            std::fs::write(artifact.path().with_extension("vtt"), b"subs").unwrap();
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
