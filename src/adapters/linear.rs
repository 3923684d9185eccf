//! Linear model adapter: exported decision models and fitted scalers.
//!
//! Tabular models are trained offline and exported as JSON parameter files;
//! this adapter evaluates the decision function `w . x + b` on a single row
//! and thresholds it to the model's class output. The recorded feature names
//! are checked against the service's canonical order at load time so an
//! artifact trained on a different column order can never be served.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::adapters::LoadError;
use crate::domain::{FeatureVector, FieldSpec};
use crate::ports::{PredictError, Preprocessor, TabularPredictor};

/// Parameter file layout produced by the training export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedLinearModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Scaler file layout produced by the training export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedScaler {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// A binary linear classifier evaluated on its decision function.
#[derive(Debug)]
pub struct LinearModel {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    /// Load exported parameters and bind them to the declared field order.
    ///
    /// # Errors
    /// Returns `LoadError` if the file is unreadable, unparsable, or records
    /// a feature order different from `specs`.
    pub fn from_path(path: &Path, specs: &'static [FieldSpec]) -> Result<Self, LoadError> {
        let exported: ExportedLinearModel = read_json(path)?;
        Self::from_exported(exported, specs).map_err(|reason| LoadError::Invalid {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Build from already-parsed parameters.
    ///
    /// # Errors
    /// Returns the mismatch reason if the parameters disagree with `specs`.
    pub fn from_exported(
        exported: ExportedLinearModel,
        specs: &'static [FieldSpec],
    ) -> Result<Self, String> {
        check_feature_names(&exported.feature_names, specs)?;
        if exported.coefficients.len() != specs.len() {
            return Err(format!(
                "expected {} coefficients, got {}",
                specs.len(),
                exported.coefficients.len()
            ));
        }
        Ok(Self {
            coefficients: exported.coefficients,
            intercept: exported.intercept,
        })
    }
}

impl TabularPredictor for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        if features.len() != self.coefficients.len() {
            return Err(PredictError::Shape {
                expected: self.coefficients.len(),
                got: features.len(),
            });
        }
        let decision: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        Ok(if decision > 0.0 { 1.0 } else { 0.0 })
    }

    fn width(&self) -> usize {
        self.coefficients.len()
    }
}

/// Standard scaler fitted at training time: `(x - mean) / scale` per feature.
#[derive(Debug)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Load a fitted scaler and bind it to the declared field order.
    ///
    /// # Errors
    /// Returns `LoadError` if the file is unreadable, unparsable, or
    /// inconsistent with `specs`.
    pub fn from_path(path: &Path, specs: &'static [FieldSpec]) -> Result<Self, LoadError> {
        let exported: ExportedScaler = read_json(path)?;
        Self::from_exported(exported, specs).map_err(|reason| LoadError::Invalid {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Build from already-parsed parameters.
    ///
    /// # Errors
    /// Returns the mismatch reason if the parameters disagree with `specs`
    /// or any scale entry is unusable.
    pub fn from_exported(
        exported: ExportedScaler,
        specs: &'static [FieldSpec],
    ) -> Result<Self, String> {
        check_feature_names(&exported.feature_names, specs)?;
        if exported.mean.len() != specs.len() || exported.scale.len() != specs.len() {
            return Err(format!(
                "expected {} mean/scale entries, got {}/{}",
                specs.len(),
                exported.mean.len(),
                exported.scale.len()
            ));
        }
        if let Some(i) = exported
            .scale
            .iter()
            .position(|s| !s.is_finite() || *s == 0.0)
        {
            return Err(format!(
                "scale entry for `{}` is {}",
                exported.feature_names[i], exported.scale[i]
            ));
        }
        Ok(Self {
            mean: exported.mean,
            scale: exported.scale,
        })
    }
}

impl Preprocessor for StandardScaler {
    fn transform(&self, features: &FeatureVector) -> FeatureVector {
        debug_assert_eq!(features.len(), self.mean.len());
        features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Feature order is part of the model contract: a reordered artifact would
/// silently change predictions, so it is rejected outright.
fn check_feature_names(names: &[String], specs: &'static [FieldSpec]) -> Result<(), String> {
    if names.len() != specs.len() {
        return Err(format!(
            "artifact records {} features, service declares {}",
            names.len(),
            specs.len()
        ));
    }
    for (i, (name, spec)) in names.iter().zip(specs).enumerate() {
        if name != spec.name {
            return Err(format!(
                "feature {i} is `{name}` in the artifact but `{}` in the service",
                spec.name
            ));
        }
    }
    Ok(())
}
