//! Model metadata in the Teachable Machine `metadata.json` layout.

use serde::{Deserialize, Serialize};

use crate::error::ModelLoadError;

/// Default input edge length in pixels.
const DEFAULT_IMAGE_SIZE: u32 = 224;

fn default_image_size() -> u32 {
    DEFAULT_IMAGE_SIZE
}

/// Class labels and input size of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    /// Class labels in output order
    pub labels: Vec<String>,

    /// Square input edge length
    #[serde(default = "default_image_size")]
    pub image_size: u32,

    /// Model name
    #[serde(default)]
    pub model_name: Option<String>,

    /// Exporting package
    #[serde(default)]
    pub package_name: Option<String>,

    /// Export time
    #[serde(default)]
    pub time_stamp: Option<String>,
}

impl ModelMetadata {
    /// Parse and validate metadata JSON fetched from `url`.
    pub fn from_json(url: &str, json: &str) -> Result<Self, ModelLoadError> {
        let metadata: Self = serde_json::from_str(json).map_err(|source| ModelLoadError::Parse {
            url: url.to_string(),
            source,
        })?;

        if metadata.labels.is_empty() {
            return Err(ModelLoadError::NoLabels);
        }

        Ok(metadata)
    }
}
