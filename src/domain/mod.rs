//! Domain layer: core request and result types.
//!
//! Pure types with no I/O. Field ordering and the raw-output-to-label
//! mapping live here because they are part of the prediction contract,
//! not an implementation detail of any backend.

mod features;
mod label;
mod model;
mod tensor;

pub use features::{
    DiabetesFields, FieldKind, FieldSpec, FormValues, ImageUpload, LungCancerFields,
    TabularRequest, ValidationError, DIABETES_FIELDS, LUNG_CANCER_FIELDS,
};
pub use label::{Label, PredictionResult};
pub use model::ModelId;
pub use tensor::{FeatureVector, ImageTensor};
