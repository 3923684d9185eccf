//! ONNX adapter: image classifiers executed through tract.
//!
//! The brain tumor model is exported with an NHWC input of shape
//! `(1, S, S, 3)` and a single sigmoid output. The graph is optimized for
//! that fixed shape at load time and compiled into a runnable plan, so each
//! request only pays for the forward pass.

use std::path::Path;

use tract_onnx::prelude::*;

use crate::adapters::LoadError;
use crate::domain::ImageTensor;
use crate::ports::{ImagePredictor, PredictError};

type RunnableOnnx = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// An ONNX image model compiled into a runnable tract plan.
#[derive(Debug)]
pub struct OnnxImageModel {
    plan: RunnableOnnx,
    input_size: u32,
}

impl OnnxImageModel {
    /// Load and optimize an ONNX graph for single-image batches.
    ///
    /// # Errors
    /// Returns `LoadError` if the file is missing or the graph cannot be
    /// optimized for the declared input shape.
    pub fn from_path(path: &Path, input_size: u32) -> Result<Self, LoadError> {
        let size = input_size as usize;
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| {
                m.with_input_fact(
                    0,
                    InferenceFact::dt_shape(
                        f32::datum_type(),
                        tvec!(1, size, size, ImageTensor::CHANNELS),
                    ),
                )
            })
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .map_err(|e| LoadError::Backend {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        tracing::info!(path = %path.display(), input_size, "loaded ONNX image model");
        Ok(Self { plan, input_size })
    }
}

impl ImagePredictor for OnnxImageModel {
    fn predict(&self, image: &ImageTensor) -> Result<f64, PredictError> {
        let size = self.input_size as usize;
        if image.size() != self.input_size {
            return Err(PredictError::Shape {
                expected: size,
                got: image.size() as usize,
            });
        }

        let input = tract_ndarray::Array4::from_shape_vec(
            (1, size, size, ImageTensor::CHANNELS),
            image.data().to_vec(),
        )
        .map_err(|e| PredictError::Backend(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(input.into_tensor().into()))
            .map_err(|e| PredictError::Backend(e.to_string()))?;

        let view = outputs[0]
            .to_array_view::<f32>()
            .map_err(|e| PredictError::Backend(e.to_string()))?;
        let raw = view
            .iter()
            .next()
            .copied()
            .ok_or_else(|| PredictError::Backend("model returned an empty output".to_string()))?;
        Ok(f64::from(raw))
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }
}
