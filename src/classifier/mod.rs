//! Classifier adapter.
//!
//! The pretrained model is opaque to the rest of SmartSort: anything that
//! implements [`Classifier`] can be plugged into the pipeline. Readiness is
//! tracked by a [`ClassifierSlot`], which starts out loading and is resolved
//! exactly once to either a ready classifier or a permanent failure.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use smartsort::classifier::{ClassifierSlot, FileModelLoader, ClassifierLoader};
//!
//! let mut slot = ClassifierSlot::new();
//! slot.resolve(FileModelLoader.load("model.json", "metadata.json"));
//! ```

mod metadata;
mod palette;
mod status;

pub use metadata::ModelMetadata;
pub use palette::{PaletteClassifier, PaletteModel};
pub use status::ModelStatus;

use crate::decoder::DecodedImage;
use crate::error::{ClassificationError, ModelLoadError};
use crate::model::Prediction;

/// A pretrained image-classification model.
pub trait Classifier {
    /// Class labels in the order predictions are returned.
    fn labels(&self) -> &[String];

    /// Return (label, probability) pairs for a decoded image.
    fn predict(&self, image: &DecodedImage) -> Result<Vec<Prediction>, ClassificationError>;
}

/// Loads a classifier from a model location and a metadata location.
pub trait ClassifierLoader {
    /// Load the model. Called once at startup.
    fn load(
        &self,
        model_url: &str,
        metadata_url: &str,
    ) -> Result<Box<dyn Classifier>, ModelLoadError>;
}

/// Holds the classifier and its readiness status.
pub struct ClassifierSlot {
    status: ModelStatus,
    classifier: Option<Box<dyn Classifier>>,
    error: Option<String>,
}

impl ClassifierSlot {
    /// Create a slot in the loading state.
    pub fn new() -> Self {
        Self {
            status: ModelStatus::Loading,
            classifier: None,
            error: None,
        }
    }

    /// Create a slot that is already loaded.
    pub fn loaded(classifier: Box<dyn Classifier>) -> Self {
        let mut slot = Self::new();
        slot.resolve(Ok(classifier));
        slot
    }

    /// Apply a load result.
    ///
    /// Only the first result is applied; the status never leaves `Loaded` or
    /// `Failed`. Returns whether the status changed.
    pub fn resolve(&mut self, result: Result<Box<dyn Classifier>, ModelLoadError>) -> bool {
        if self.status.is_settled() {
            log::warn!(
                "Ignoring model load result, status is already {}",
                self.status.name()
            );
            return false;
        }

        match result {
            Ok(classifier) => {
                log::info!(
                    "Model loaded with {} labels: {:?}",
                    classifier.labels().len(),
                    classifier.labels()
                );
                self.classifier = Some(classifier);
                self.status = ModelStatus::Loaded;
            }
            Err(e) => {
                log::error!("Model failed to load: {}", e);
                self.error = Some(e.to_string());
                self.status = ModelStatus::Failed;
            }
        }
        true
    }

    /// Current readiness status.
    pub fn status(&self) -> ModelStatus {
        self.status
    }

    /// Load error message, if loading failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The classifier, if loaded.
    pub fn ready(&self) -> Option<&dyn Classifier> {
        match self.status {
            ModelStatus::Loaded => self.classifier.as_deref(),
            _ => None,
        }
    }
}

impl Default for ClassifierSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a palette model from its two JSON documents.
pub fn load_palette_from_json(
    model_url: &str,
    model_json: &str,
    metadata_url: &str,
    metadata_json: &str,
) -> Result<PaletteClassifier, ModelLoadError> {
    let metadata = ModelMetadata::from_json(metadata_url, metadata_json)?;
    let model = PaletteModel::from_json(model_url, model_json)?;
    PaletteClassifier::new(metadata, model)
}

/// Loads a [`PaletteClassifier`] from files on disk.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct FileModelLoader;

#[cfg(not(target_arch = "wasm32"))]
impl ClassifierLoader for FileModelLoader {
    fn load(
        &self,
        model_url: &str,
        metadata_url: &str,
    ) -> Result<Box<dyn Classifier>, ModelLoadError> {
        let read = |url: &str| {
            std::fs::read_to_string(url).map_err(|e| ModelLoadError::fetch(url, e.to_string()))
        };

        log::info!("Loading model from '{}' and '{}'", model_url, metadata_url);
        let model_json = read(model_url)?;
        let metadata_json = read(metadata_url)?;
        let classifier =
            load_palette_from_json(model_url, &model_json, metadata_url, &metadata_json)?;
        Ok(Box::new(classifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(Vec<String>);

    impl Classifier for Constant {
        fn labels(&self) -> &[String] {
            &self.0
        }

        fn predict(&self, _image: &DecodedImage) -> Result<Vec<Prediction>, ClassificationError> {
            Ok(vec![Prediction::new(self.0[0].clone(), 1.0)])
        }
    }

    #[test]
    fn test_slot_starts_loading() {
        let slot = ClassifierSlot::new();
        assert_eq!(slot.status(), ModelStatus::Loading);
        assert!(slot.ready().is_none());
    }

    #[test]
    fn test_slot_loaded() {
        let mut slot = ClassifierSlot::new();
        assert!(slot.resolve(Ok(Box::new(Constant(vec!["cat".into()])))));
        assert_eq!(slot.status(), ModelStatus::Loaded);
        assert!(slot.ready().is_some());
    }

    #[test]
    fn test_slot_failure_is_permanent() {
        let mut slot = ClassifierSlot::new();
        assert!(slot.resolve(Err(ModelLoadError::NoLabels)));
        assert_eq!(slot.status(), ModelStatus::Failed);
        assert!(slot.error().is_some());

        // A late success does not revive the slot
        assert!(!slot.resolve(Ok(Box::new(Constant(vec!["cat".into()])))));
        assert_eq!(slot.status(), ModelStatus::Failed);
        assert!(slot.ready().is_none());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_loader_missing_file() {
        let result = FileModelLoader.load("/nonexistent/model.json", "/nonexistent/metadata.json");
        assert!(matches!(result, Err(ModelLoadError::Fetch { .. })));
    }
}
