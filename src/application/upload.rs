//! Upload steward: on-disk lifetime of one uploaded image.
//!
//! Staging writes the full payload under a collision-resistant random name;
//! disposal is owned by the request and backstopped by `Drop`, so no staged
//! file outlives its request on any exit path, including panics and
//! client disconnects.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::io::Reader as ImageReader;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::domain::ImageTensor;

/// Failure to interpret a staged payload as a model input image.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is not a decodable image: {0}")]
    Malformed(String),

    #[error("expected a {expected}-channel image, got {got}")]
    ChannelCount { expected: u8, got: u8 },
}

/// Stages uploads under a dedicated directory.
pub struct UploadSteward {
    dir: PathBuf,
}

impl UploadSteward {
    /// Use `dir` for staged files, creating it if needed.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist an upload to disk under a fresh random name.
    ///
    /// The name is derived from a CSPRNG identifier, never from the original
    /// filename, so client input can neither collide with another staged
    /// file nor traverse out of the staging directory.
    ///
    /// # Errors
    /// Returns error if the payload cannot be written.
    pub async fn stage(
        &self,
        bytes: &[u8],
        original_filename: &str,
    ) -> std::io::Result<StagedUpload> {
        let path = self.dir.join(random_name());
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(
            staged = %path.display(),
            original = original_filename,
            len = bytes.len(),
            "staged upload"
        );
        Ok(StagedUpload {
            path,
            disposed: false,
        })
    }
}

/// A staged file owned by exactly one request.
///
/// Dropping the value removes the file; `dispose` does the same eagerly.
/// Either way, removal happens exactly once.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    disposed: bool,
}

impl StagedUpload {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the staged file into a normalized square RGB tensor.
    ///
    /// # Errors
    /// Returns `DecodeError` if the payload is not an image or does not
    /// carry exactly three color channels.
    pub fn materialize(&self, target_size: u32) -> Result<ImageTensor, DecodeError> {
        let reader = ImageReader::open(&self.path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;
        let img = reader
            .decode()
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;

        let channels = img.color().channel_count();
        if usize::from(channels) != ImageTensor::CHANNELS {
            return Err(DecodeError::ChannelCount {
                expected: ImageTensor::CHANNELS as u8,
                got: channels,
            });
        }

        let resized = img
            .resize_exact(target_size, target_size, FilterType::Triangle)
            .to_rgb8();
        let data = resized.as_raw().iter().map(|&v| f32::from(v) / 255.0).collect();
        ImageTensor::new(target_size, data).map_err(DecodeError::Malformed)
    }

    /// Remove the staged file.
    ///
    /// Removal failures are logged, never retried, and never surface into
    /// the request outcome.
    pub fn dispose(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(staged = %self.path.display(), "disposed staged upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(staged = %self.path.display(), error = %e, "failed to remove staged upload");
            }
        }
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        self.remove();
    }
}

/// 128-bit CSPRNG identifier, hex-encoded.
fn random_name() -> String {
    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
