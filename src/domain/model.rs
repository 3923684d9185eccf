//! Identifiers for the closed set of served models.

use serde::{Deserialize, Serialize};

/// Identifier of one served model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
    /// Tabular diabetes classifier (8 clinical fields, scaled input)
    Diabetes,
    /// Tabular lung cancer classifier (15 survey fields)
    LungCancer,
    /// Image-based brain tumor classifier (MRI upload)
    BrainTumor,
}

impl ModelId {
    /// Every identifier that must be loaded before the service accepts traffic.
    pub const ALL: [ModelId; 3] = [ModelId::Diabetes, ModelId::LungCancer, ModelId::BrainTumor];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diabetes => "diabetes",
            Self::LungCancer => "lungcancer",
            Self::BrainTumor => "braintumor",
        }
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
