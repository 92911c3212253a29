//! Model readiness lifecycle.

use serde::{Deserialize, Serialize};

/// Readiness of the classifier: `Loading` until it settles on `Loaded` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    /// Model files are being fetched
    #[default]
    Loading,
    /// Ready to classify
    Loaded,
    /// Loading failed; the pipeline stays inert until reload
    Failed,
}

impl ModelStatus {
    /// Get the identifier for this status.
    pub fn name(&self) -> &'static str {
        match self {
            ModelStatus::Loading => "loading",
            ModelStatus::Loaded => "loaded",
            ModelStatus::Failed => "failed",
        }
    }

    /// Status line shown to the user.
    pub fn display_text(&self) -> &'static str {
        match self {
            ModelStatus::Loading => "Loading model…",
            ModelStatus::Loaded => "Model loaded ✅",
            ModelStatus::Failed => "Model failed ❌",
        }
    }

    /// Whether the status has reached a final value.
    pub fn is_settled(&self) -> bool {
        !matches!(self, ModelStatus::Loading)
    }
}
