//! Application layer: the inference serving pipeline.
//!
//! Registry lifecycle, feature encoding, upload stewardship and dispatch.

mod codec;
mod dispatch;
mod registry;
mod upload;

pub use codec::FeatureCodec;
pub use dispatch::{InferenceError, PredictionService};
pub use registry::{ModelEntry, ModelRegistry, RegistryError};
pub use upload::{DecodeError, StagedUpload, UploadSteward};
