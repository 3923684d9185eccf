//! Feature codec: validated request fields to model input vectors.
//!
//! The canonical field order lives on the request records; the codec checks
//! ranges, emits the ordered vector, and applies the model's registered
//! preprocessor so a raw vector never reaches a scaled model unscaled.

use crate::domain::{FeatureVector, TabularRequest, ValidationError};
use crate::ports::Preprocessor;

/// Encoder for one request against one registry entry.
pub struct FeatureCodec<'a> {
    preprocessor: Option<&'a dyn Preprocessor>,
}

impl<'a> FeatureCodec<'a> {
    /// Codec applying the model's registered preprocessor, if any.
    #[must_use]
    pub fn new(preprocessor: Option<&'a dyn Preprocessor>) -> Self {
        Self { preprocessor }
    }

    /// Validate the request and emit the model input vector.
    ///
    /// # Errors
    /// Returns a `ValidationError` naming the offending field.
    pub fn encode(&self, request: &TabularRequest) -> Result<FeatureVector, ValidationError> {
        request.validate()?;
        let raw = request.to_vec();
        Ok(match self.preprocessor {
            Some(p) => p.transform(&raw),
            None => raw,
        })
    }
}
