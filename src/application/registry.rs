//! Process-wide model registry.
//!
//! Populated exactly once while the service starts, read-only for the
//! serving lifetime, emptied after in-flight requests drain at shutdown.
//! Handlers receive it by `Arc`, never through ambient global state.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use crate::adapters;
use crate::domain::ModelId;
use crate::ports::{ImagePredictor, Preprocessor, TabularPredictor};

/// Registry lookup and lifecycle failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("model `{0}` is not loaded")]
    NotLoaded(ModelId),

    #[error("model `{0}` is already loaded")]
    AlreadyLoaded(ModelId),

    #[error("registry is shut down")]
    ShutDown,

    #[error("model `{id}` does not take {expected} input")]
    Kind { id: ModelId, expected: &'static str },
}

enum PredictorHandle {
    Tabular(Arc<dyn TabularPredictor>),
    Image(Arc<dyn ImagePredictor>),
}

/// One loaded model with its fit-time preprocessor.
///
/// Immutable after load; requests share it by `Arc` and never copy it.
pub struct ModelEntry {
    id: ModelId,
    predictor: PredictorHandle,
    preprocessor: Option<Arc<dyn Preprocessor>>,
}

impl ModelEntry {
    /// Entry for a tabular model, optionally with a fitted scaler.
    #[must_use]
    pub fn tabular(
        id: ModelId,
        predictor: Arc<dyn TabularPredictor>,
        preprocessor: Option<Arc<dyn Preprocessor>>,
    ) -> Self {
        Self {
            id,
            predictor: PredictorHandle::Tabular(predictor),
            preprocessor,
        }
    }

    /// Entry for an image model.
    #[must_use]
    pub fn image(id: ModelId, predictor: Arc<dyn ImagePredictor>) -> Self {
        Self {
            id,
            predictor: PredictorHandle::Image(predictor),
            preprocessor: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> ModelId {
        self.id
    }

    #[must_use]
    pub fn preprocessor(&self) -> Option<&dyn Preprocessor> {
        self.preprocessor.as_deref()
    }

    /// The tabular predictor behind this entry.
    ///
    /// # Errors
    /// Returns `RegistryError::Kind` when the entry holds an image model.
    pub fn tabular_predictor(&self) -> Result<Arc<dyn TabularPredictor>, RegistryError> {
        match &self.predictor {
            PredictorHandle::Tabular(p) => Ok(Arc::clone(p)),
            PredictorHandle::Image(_) => Err(RegistryError::Kind {
                id: self.id,
                expected: "tabular",
            }),
        }
    }

    /// The image predictor behind this entry.
    ///
    /// # Errors
    /// Returns `RegistryError::Kind` when the entry holds a tabular model.
    pub fn image_predictor(&self) -> Result<Arc<dyn ImagePredictor>, RegistryError> {
        match &self.predictor {
            PredictorHandle::Image(p) => Ok(Arc::clone(p)),
            PredictorHandle::Tabular(_) => Err(RegistryError::Kind {
                id: self.id,
                expected: "image",
            }),
        }
    }
}

enum State {
    Open(HashMap<ModelId, Arc<ModelEntry>>),
    ShutDown,
}

/// Process-wide store of loaded models.
///
/// `load`/`register` run only during startup; `get` is read-only and safe
/// under many concurrent in-flight requests because the map is never mutated
/// while serving; `clear` runs once after the server drains.
pub struct ModelRegistry {
    state: RwLock<State>,
}

impl ModelRegistry {
    /// Empty registry; nothing can be served until every model is loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::Open(HashMap::new())),
        }
    }

    /// Load the artifacts for `id` from `model_dir` and register the entry.
    ///
    /// # Errors
    /// Propagates artifact load failures. Startup treats any of these as
    /// fatal so a partially populated registry never serves.
    pub fn load(&self, id: ModelId, model_dir: &Path) -> Result<(), crate::MedscreenError> {
        let entry = adapters::load_model_entry(id, model_dir)?;
        self.register(entry)?;
        Ok(())
    }

    /// Register an already-built entry.
    ///
    /// # Errors
    /// Returns `RegistryError` on duplicate ids and after shutdown.
    pub fn register(&self, entry: ModelEntry) -> Result<(), RegistryError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        match &mut *state {
            State::Open(models) => {
                let id = entry.id();
                if models.contains_key(&id) {
                    return Err(RegistryError::AlreadyLoaded(id));
                }
                tracing::info!(model = %id, "registered model");
                models.insert(id, Arc::new(entry));
                Ok(())
            }
            State::ShutDown => Err(RegistryError::ShutDown),
        }
    }

    /// Look up a loaded model.
    ///
    /// # Errors
    /// Returns `RegistryError::NotLoaded` before the model is loaded and
    /// after `clear`.
    pub fn get(&self, id: ModelId) -> Result<Arc<ModelEntry>, RegistryError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            State::Open(models) => models.get(&id).cloned().ok_or(RegistryError::NotLoaded(id)),
            State::ShutDown => Err(RegistryError::NotLoaded(id)),
        }
    }

    /// Drop every entry; lookups and registrations fail from here on.
    pub fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let State::Open(models) = &*state {
            tracing::info!(count = models.len(), "clearing model registry");
        }
        *state = State::ShutDown;
    }

    /// Number of loaded models.
    #[must_use]
    pub fn len(&self) -> usize {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            State::Open(models) => models.len(),
            State::ShutDown => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureVector;
    use crate::ports::PredictError;

    struct StubModel(f64);

    impl TabularPredictor for StubModel {
        fn predict(&self, _features: &FeatureVector) -> Result<f64, PredictError> {
            Ok(self.0)
        }

        fn width(&self) -> usize {
            8
        }
    }

    fn stub_entry(id: ModelId) -> ModelEntry {
        ModelEntry::tabular(id, Arc::new(StubModel(0.0)), None)
    }

    #[test]
    fn test_get_fails_before_load_and_after_clear() {
        let registry = ModelRegistry::new();
        assert!(matches!(
            registry.get(ModelId::Diabetes),
            Err(RegistryError::NotLoaded(ModelId::Diabetes))
        ));

        registry
            .register(stub_entry(ModelId::Diabetes))
            .expect("Should register");
        registry
            .register(stub_entry(ModelId::LungCancer))
            .expect("Should register");
        assert!(registry.get(ModelId::Diabetes).is_ok());
        assert!(registry.get(ModelId::LungCancer).is_ok());
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(matches!(
            registry.get(ModelId::Diabetes),
            Err(RegistryError::NotLoaded(ModelId::Diabetes))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let registry = ModelRegistry::new();
        registry
            .register(stub_entry(ModelId::Diabetes))
            .expect("Should register");
        assert!(matches!(
            registry.register(stub_entry(ModelId::Diabetes)),
            Err(RegistryError::AlreadyLoaded(ModelId::Diabetes))
        ));
    }

    #[test]
    fn test_no_registration_after_shutdown() {
        let registry = ModelRegistry::new();
        registry.clear();
        assert!(matches!(
            registry.register(stub_entry(ModelId::Diabetes)),
            Err(RegistryError::ShutDown)
        ));
    }

    #[test]
    fn test_family_mismatch_is_an_error() {
        let registry = ModelRegistry::new();
        registry
            .register(stub_entry(ModelId::Diabetes))
            .expect("Should register");
        let entry = registry.get(ModelId::Diabetes).expect("Should get");
        assert!(entry.tabular_predictor().is_ok());
        assert!(matches!(
            entry.image_predictor(),
            Err(RegistryError::Kind { .. })
        ));
    }
}
