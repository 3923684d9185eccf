//! Predictor ports: traits for opaque trained models.
//!
//! These traits abstract the model backends (exported linear parameters,
//! ONNX runtimes) from the application logic. A predictor takes a numeric
//! input of its declared shape and returns one raw score; interpreting that
//! score is the domain layer's job.

use crate::domain::{FeatureVector, ImageTensor};

/// Error raised by a predictor backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PredictError {
    /// Input does not match the model's declared width.
    #[error("input width {got} does not match model width {expected}")]
    Shape { expected: usize, got: usize },

    /// The backend rejected the invocation.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Trait for tabular models.
///
/// Implementations are deterministic and side-effect-free; the dispatcher
/// relies on this and never retries a failed invocation.
pub trait TabularPredictor: Send + Sync {
    /// Run the model on a single-row batch.
    ///
    /// # Errors
    /// Returns `PredictError` if the input shape is wrong or the backend fails.
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictError>;

    /// Number of input features the model was trained on.
    fn width(&self) -> usize;
}

/// Trait for image models.
pub trait ImagePredictor: Send + Sync {
    /// Run the model on a single-image batch, returning its sigmoid output.
    ///
    /// # Errors
    /// Returns `PredictError` if the tensor shape is wrong or the backend fails.
    fn predict(&self, image: &ImageTensor) -> Result<f64, PredictError>;

    /// Square edge length the model expects its input resized to.
    fn input_size(&self) -> u32;
}

/// A fitted transform applied to raw features before prediction.
///
/// Fixed at load time and applied identically on every request; no
/// per-request state. Width agreement with the paired model is checked
/// when the artifacts load, not per call.
pub trait Preprocessor: Send + Sync {
    fn transform(&self, features: &FeatureVector) -> FeatureVector;
}
