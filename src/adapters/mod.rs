//! Adapters layer: concrete implementations of ports.
//!
//! These modules contain the actual integration with external libraries:
//! - `linear`: exported linear decision models and fitted scalers (JSON)
//! - `onnx`: image classifiers executed through tract-onnx
//! - `minijinja`: embedded HTML template rendering

pub mod linear;
pub mod minijinja;
pub mod onnx;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::ModelEntry;
use crate::domain::{ModelId, DIABETES_FIELDS, LUNG_CANCER_FIELDS};

use linear::{LinearModel, StandardScaler};
use onnx::OnnxImageModel;

/// Square edge length the image models resize their input to.
pub const DEFAULT_IMAGE_SIZE: u32 = 224;

/// Failure to load a model artifact. Fatal at startup: the service never
/// serves a partially populated registry.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("model artifact {path} is inconsistent: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("failed to load ONNX model {path}: {message}")]
    Backend { path: PathBuf, message: String },
}

/// Load the artifacts for one model family from `model_dir`.
///
/// # Errors
/// Returns `LoadError` if any artifact is missing, unparsable, or records a
/// feature order different from the service's canonical order.
pub fn load_model_entry(id: ModelId, model_dir: &Path) -> Result<ModelEntry, LoadError> {
    match id {
        ModelId::Diabetes => {
            let model =
                LinearModel::from_path(&model_dir.join("diabetes_model.json"), &DIABETES_FIELDS)?;
            let scaler = StandardScaler::from_path(
                &model_dir.join("diabetes_scaler.json"),
                &DIABETES_FIELDS,
            )?;
            Ok(ModelEntry::tabular(
                id,
                Arc::new(model),
                Some(Arc::new(scaler)),
            ))
        }
        ModelId::LungCancer => {
            let model = LinearModel::from_path(
                &model_dir.join("lungcancer_model.json"),
                &LUNG_CANCER_FIELDS,
            )?;
            Ok(ModelEntry::tabular(id, Arc::new(model), None))
        }
        ModelId::BrainTumor => {
            let model =
                OnnxImageModel::from_path(&model_dir.join("braintumor.onnx"), DEFAULT_IMAGE_SIZE)?;
            Ok(ModelEntry::image(id, Arc::new(model)))
        }
    }
}
