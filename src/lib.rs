//! # Medscreen
//!
//! Multi-model medical screening inference service.
//!
//! Serves a small set of pretrained binary classifiers behind HTML form
//! endpoints:
//! - diabetes risk from 8 clinical fields (scaled tabular model)
//! - lung cancer risk from 15 survey fields (tabular model)
//! - brain tumor presence from an uploaded MRI scan (ONNX image model)
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: request records, feature ordering, label mapping
//! - `ports`: trait definitions for predictors, preprocessors and rendering
//! - `adapters`: concrete implementations (exported linear models, tract-onnx,
//!   minijinja)
//! - `application`: model registry, feature codec, upload steward, dispatcher
//! - `server`: axum HTTP surface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod server;

pub use application::{ModelRegistry, PredictionService};
pub use domain::{Label, PredictionResult};

/// Result type for medscreen operations.
pub type Result<T> = std::result::Result<T, MedscreenError>;

/// Main error type for medscreen.
#[derive(Debug, thiserror::Error)]
pub enum MedscreenError {
    #[error("invalid input: {0}")]
    Validation(#[from] domain::ValidationError),

    #[error(transparent)]
    Registry(#[from] application::RegistryError),

    #[error("upload staging failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("image decoding failed: {0}")]
    Decode(#[from] application::DecodeError),

    #[error("inference failed: {0}")]
    Inference(#[from] application::InferenceError),

    #[error("model load failed: {0}")]
    Load(#[from] adapters::LoadError),

    #[error("rendering failed: {0}")]
    Render(#[from] ports::RenderError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
