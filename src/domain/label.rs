//! Prediction labels and the shared raw-output mapping.
//!
//! Every served model is a binary classifier; the mapping from raw predictor
//! output to the ("No", "Yes") pair lives here, once, so no model family can
//! drift to its own thresholding rule.

use serde::{Deserialize, Serialize};

use crate::domain::ModelId;

/// Binary screening outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    No,
    Yes,
}

impl Label {
    /// Map a raw predictor output to a label.
    ///
    /// The value is rounded half away from zero; 0 maps to `No`, 1 to `Yes`,
    /// and anything else (including non-finite values) maps to nothing.
    #[must_use]
    pub fn from_raw(raw: f64) -> Option<Label> {
        if !raw.is_finite() {
            return None;
        }
        let rounded = raw.round();
        if rounded == 0.0 {
            Some(Label::No)
        } else if rounded == 1.0 {
            Some(Label::Yes)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::No => "No",
            Self::Yes => "Yes",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one dispatched prediction.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    /// Model that produced the result
    pub model: ModelId,
    /// Mapped label
    pub label: Label,
    /// Raw predictor output before mapping
    pub raw_output: f64,
    /// Timestamp of the prediction
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl PredictionResult {
    #[must_use]
    pub fn new(model: ModelId, label: Label, raw_output: f64) -> Self {
        Self {
            model,
            label,
            raw_output,
            created_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_outputs_map() {
        assert_eq!(Label::from_raw(0.0), Some(Label::No));
        assert_eq!(Label::from_raw(1.0), Some(Label::Yes));
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        assert_eq!(Label::from_raw(0.49), Some(Label::No));
        assert_eq!(Label::from_raw(0.51), Some(Label::Yes));
        // The tie goes away from zero.
        assert_eq!(Label::from_raw(0.5), Some(Label::Yes));
        assert_eq!(Label::from_raw(-0.4), Some(Label::No));
    }

    #[test]
    fn test_unmappable_outputs() {
        assert_eq!(Label::from_raw(2.0), None);
        assert_eq!(Label::from_raw(-1.0), None);
        assert_eq!(Label::from_raw(1.51), None);
        assert_eq!(Label::from_raw(f64::NAN), None);
        assert_eq!(Label::from_raw(f64::INFINITY), None);
    }

    #[test]
    fn test_result_carries_label() {
        let result = PredictionResult::new(ModelId::Diabetes, Label::Yes, 1.0);
        assert_eq!(result.label.as_str(), "Yes");
        assert_eq!(result.model, ModelId::Diabetes);
    }
}
