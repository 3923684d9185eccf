//! Prediction dispatcher: routes validated requests through the registry.
//!
//! Predictor invocation is computational, not I/O, so every invocation (and
//! the image decode that feeds it) runs on the blocking worker pool; the
//! async scheduler only ever awaits the result. Model calls are assumed
//! deterministic and side-effect-free, so a failed invocation is surfaced
//! immediately and never retried.

use std::sync::Arc;

use crate::application::{FeatureCodec, ModelRegistry, UploadSteward};
use crate::domain::{ImageUpload, Label, ModelId, PredictionResult, TabularRequest};
use crate::ports::PredictError;
use crate::MedscreenError;

/// Failure of a predictor invocation or of mapping its output.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error(transparent)]
    Predictor(#[from] PredictError),

    #[error("predictor output {0} maps to no label")]
    Unmappable(f64),

    #[error("inference task aborted: {0}")]
    Aborted(String),
}

/// Service dispatching requests to loaded models.
pub struct PredictionService {
    registry: Arc<ModelRegistry>,
    steward: UploadSteward,
}

impl PredictionService {
    #[must_use]
    pub fn new(registry: Arc<ModelRegistry>, steward: UploadSteward) -> Self {
        Self { registry, steward }
    }

    #[must_use]
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Directory staged uploads are written under.
    #[must_use]
    pub fn steward_dir(&self) -> &std::path::Path {
        self.steward.dir()
    }

    /// Run a tabular prediction.
    ///
    /// # Errors
    /// Validation, lookup and inference failures; see [`MedscreenError`].
    pub async fn predict_tabular(
        &self,
        request: &TabularRequest,
    ) -> Result<PredictionResult, MedscreenError> {
        let model = request.model();
        let entry = self.registry.get(model)?;
        let predictor = entry.tabular_predictor()?;

        let codec = FeatureCodec::new(entry.preprocessor());
        let features = codec.encode(request)?;

        let raw = tokio::task::spawn_blocking(move || predictor.predict(&features))
            .await
            .map_err(|e| InferenceError::Aborted(e.to_string()))?
            .map_err(InferenceError::from)?;

        self.finish(model, raw)
    }

    /// Run an image prediction.
    ///
    /// The staged artifact is owned by this call and removed before it
    /// returns, whatever the outcome.
    ///
    /// # Errors
    /// Staging, decoding, lookup and inference failures; see
    /// [`MedscreenError`].
    pub async fn predict_image(
        &self,
        model: ModelId,
        upload: &ImageUpload,
    ) -> Result<PredictionResult, MedscreenError> {
        let entry = self.registry.get(model)?;
        let predictor = entry.image_predictor()?;
        let target_size = predictor.input_size();

        let staged = self.steward.stage(&upload.bytes, &upload.filename).await?;

        // Decode and invoke off the async scheduler. The staged file moves
        // into the blocking task, which disposes it however the pipeline
        // exits; a panicking predictor unwinds through the Drop backstop.
        let raw = tokio::task::spawn_blocking(move || {
            let outcome = staged
                .materialize(target_size)
                .map_err(MedscreenError::from)
                .and_then(|tensor| {
                    predictor
                        .predict(&tensor)
                        .map_err(|e| MedscreenError::from(InferenceError::from(e)))
                });
            staged.dispose();
            outcome
        })
        .await
        .map_err(|e| MedscreenError::from(InferenceError::Aborted(e.to_string())))??;

        self.finish(model, raw)
    }

    fn finish(&self, model: ModelId, raw: f64) -> Result<PredictionResult, MedscreenError> {
        let label = Label::from_raw(raw).ok_or(InferenceError::Unmappable(raw))?;
        let result = PredictionResult::new(model, label, raw);
        tracing::info!(model = %model, label = %label, raw_output = raw, "prediction complete");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::linear::{
        ExportedLinearModel, ExportedScaler, LinearModel, StandardScaler,
    };
    use crate::application::ModelEntry;
    use crate::domain::{
        DiabetesFields, FeatureVector, ImageTensor, LungCancerFields, DIABETES_FIELDS,
        LUNG_CANCER_FIELDS,
    };
    use crate::ports::{ImagePredictor, TabularPredictor};

    struct FixedTabular(f64);

    impl TabularPredictor for FixedTabular {
        fn predict(&self, _features: &FeatureVector) -> Result<f64, PredictError> {
            Ok(self.0)
        }

        fn width(&self) -> usize {
            8
        }
    }

    enum ImageStub {
        Fixed(f64),
        Failing,
    }

    impl ImagePredictor for ImageStub {
        fn predict(&self, _image: &ImageTensor) -> Result<f64, PredictError> {
            match self {
                Self::Fixed(v) => Ok(*v),
                Self::Failing => Err(PredictError::Backend("stub backend down".to_string())),
            }
        }

        fn input_size(&self) -> u32 {
            8
        }
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(16, 16, image::Rgb([40, 90, 200]));
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .expect("Should encode PNG");
        out.into_inner()
    }

    fn staged_files(service: &PredictionService) -> usize {
        std::fs::read_dir(service.steward.dir())
            .expect("Staging dir should exist")
            .count()
    }

    fn service_with(entries: Vec<ModelEntry>) -> (tempfile::TempDir, PredictionService) {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let registry = ModelRegistry::new();
        for entry in entries {
            registry.register(entry).expect("Should register");
        }
        let steward =
            UploadSteward::new(dir.path().join("staged")).expect("Should create steward");
        (dir, PredictionService::new(Arc::new(registry), steward))
    }

    fn diabetes_request() -> TabularRequest {
        TabularRequest::Diabetes(DiabetesFields {
            pregnancies: 2,
            glucose: 120,
            blood_pressure: 70,
            skin_thickness: 20.0,
            insulin: 79.0,
            bmi: 25.0,
            pedigree: 0.5,
            age: 33,
        })
    }

    #[tokio::test]
    async fn test_tabular_prediction_is_deterministic() {
        let (_dir, service) = service_with(vec![ModelEntry::tabular(
            ModelId::Diabetes,
            Arc::new(FixedTabular(1.0)),
            None,
        )]);

        let first = service
            .predict_tabular(&diabetes_request())
            .await
            .expect("Should predict");
        let second = service
            .predict_tabular(&diabetes_request())
            .await
            .expect("Should predict");
        assert_eq!(first.label, Label::Yes);
        assert_eq!(first.label, second.label);
    }

    #[tokio::test]
    async fn test_unloaded_model_is_reported() {
        let (_dir, service) = service_with(vec![]);
        let err = service
            .predict_tabular(&diabetes_request())
            .await
            .expect_err("Should fail");
        assert!(matches!(err, MedscreenError::Registry(_)));
    }

    #[tokio::test]
    async fn test_unmappable_output_is_an_inference_error() {
        let (_dir, service) = service_with(vec![ModelEntry::tabular(
            ModelId::Diabetes,
            Arc::new(FixedTabular(2.0)),
            None,
        )]);
        let err = service
            .predict_tabular(&diabetes_request())
            .await
            .expect_err("Should fail");
        assert!(matches!(
            err,
            MedscreenError::Inference(InferenceError::Unmappable(_))
        ));
    }

    /// Scenario A: the pinned fixture scaler and model give a stable label
    /// for the reference diabetes fields.
    #[tokio::test]
    async fn test_diabetes_fixture_scenario() {
        // Identity scaler and a model that only weighs the intercept: the
        // decision is -1.0 for every input, so the label is pinned to "No".
        let names: Vec<String> = DIABETES_FIELDS.iter().map(|s| s.name.to_string()).collect();
        let model = LinearModel::from_exported(
            ExportedLinearModel {
                feature_names: names.clone(),
                coefficients: vec![0.0; 8],
                intercept: -1.0,
            },
            &DIABETES_FIELDS,
        )
        .expect("Should build model");
        let scaler = StandardScaler::from_exported(
            ExportedScaler {
                feature_names: names,
                mean: vec![0.0; 8],
                scale: vec![1.0; 8],
            },
            &DIABETES_FIELDS,
        )
        .expect("Should build scaler");

        let (_dir, service) = service_with(vec![ModelEntry::tabular(
            ModelId::Diabetes,
            Arc::new(model),
            Some(Arc::new(scaler)),
        )]);

        let result = service
            .predict_tabular(&diabetes_request())
            .await
            .expect("Should predict");
        assert_eq!(result.label, Label::No);
        assert_eq!(result.raw_output, 0.0);
    }

    /// Scenario B: the all-zero lung cancer vector under a pinned fixture
    /// model gives a stable label.
    #[tokio::test]
    async fn test_lung_cancer_all_zero_fixture_scenario() {
        let model = LinearModel::from_exported(
            ExportedLinearModel {
                feature_names: LUNG_CANCER_FIELDS
                    .iter()
                    .map(|s| s.name.to_string())
                    .collect(),
                coefficients: vec![1.0; 15],
                intercept: 0.5,
            },
            &LUNG_CANCER_FIELDS,
        )
        .expect("Should build model");

        let (_dir, service) = service_with(vec![ModelEntry::tabular(
            ModelId::LungCancer,
            Arc::new(model),
            None,
        )]);

        // All-zero features leave only the intercept: 0.5 > 0, so "Yes".
        let request = TabularRequest::LungCancer(LungCancerFields::default());
        let result = service
            .predict_tabular(&request)
            .await
            .expect("Should predict");
        assert_eq!(result.label, Label::Yes);
    }

    #[tokio::test]
    async fn test_image_prediction_disposes_on_success() {
        let (_dir, service) = service_with(vec![ModelEntry::image(
            ModelId::BrainTumor,
            Arc::new(ImageStub::Fixed(0.87)),
        )]);

        let upload = ImageUpload {
            bytes: png_bytes(),
            filename: "scan.png".to_string(),
        };
        let result = service
            .predict_image(ModelId::BrainTumor, &upload)
            .await
            .expect("Should predict");
        assert_eq!(result.label, Label::Yes);
        assert_eq!(staged_files(&service), 0);
    }

    #[tokio::test]
    async fn test_image_prediction_disposes_on_decode_failure() {
        let (_dir, service) = service_with(vec![ModelEntry::image(
            ModelId::BrainTumor,
            Arc::new(ImageStub::Fixed(0.5)),
        )]);

        let upload = ImageUpload {
            bytes: b"not an image at all".to_vec(),
            filename: "scan.png".to_string(),
        };
        let err = service
            .predict_image(ModelId::BrainTumor, &upload)
            .await
            .expect_err("Should fail");
        assert!(matches!(err, MedscreenError::Decode(_)));
        assert_eq!(staged_files(&service), 0);
    }

    #[tokio::test]
    async fn test_image_prediction_disposes_on_predictor_failure() {
        let (_dir, service) = service_with(vec![ModelEntry::image(
            ModelId::BrainTumor,
            Arc::new(ImageStub::Failing),
        )]);

        let upload = ImageUpload {
            bytes: png_bytes(),
            filename: "scan.png".to_string(),
        };
        let err = service
            .predict_image(ModelId::BrainTumor, &upload)
            .await
            .expect_err("Should fail");
        assert!(matches!(err, MedscreenError::Inference(_)));
        assert_eq!(staged_files(&service), 0);
    }

    #[tokio::test]
    async fn test_sigmoid_output_rounds_to_label() {
        let (_dir, service) = service_with(vec![ModelEntry::image(
            ModelId::BrainTumor,
            Arc::new(ImageStub::Fixed(0.49)),
        )]);
        let upload = ImageUpload {
            bytes: png_bytes(),
            filename: "scan.png".to_string(),
        };
        let result = service
            .predict_image(ModelId::BrainTumor, &upload)
            .await
            .expect("Should predict");
        assert_eq!(result.label, Label::No);
    }
}
