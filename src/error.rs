//! Error types for model loading, decoding, classification and export.
//!
//! Per-file errors ([`DecodeError`], [`ClassificationError`]) are contained by
//! the pipeline and only logged. [`ModelLoadError`] becomes the persistent
//! failed model status, and [`ArchiveError`] is reported back to the caller of
//! an export.

use thiserror::Error;

/// The classifier could not be made ready.
#[derive(Error, Debug)]
pub enum ModelLoadError {
    /// A model resource could not be fetched or read
    #[error("Failed to fetch '{url}': {message}")]
    Fetch {
        /// Resource location
        url: String,
        /// Underlying failure
        message: String,
    },

    /// A model resource is not valid JSON for its role
    #[error("Failed to parse '{url}': {source}")]
    Parse {
        /// Resource location
        url: String,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },

    /// Metadata lists no class labels
    #[error("Model metadata contains no labels")]
    NoLabels,

    /// Model weights and metadata disagree on the number of classes
    #[error("Model defines {classes} classes but metadata lists {labels} labels")]
    LabelMismatch {
        /// Number of labels in the metadata
        labels: usize,
        /// Number of classes in the model
        classes: usize,
    },
}

impl ModelLoadError {
    /// Create a fetch error.
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// A single file could not be decoded into a bitmap.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The file does not declare an image MIME type
    #[error("'{name}' is not an image ({mime})")]
    NotAnImage {
        /// File name
        name: String,
        /// Declared MIME type
        mime: String,
    },

    /// The image crate rejected the contents
    #[error("Failed to decode '{name}': {source}")]
    Image {
        /// File name
        name: String,
        /// Decoder error
        #[source]
        source: image::ImageError,
    },
}

/// A single decoded image could not be classified.
#[derive(Error, Debug)]
pub enum ClassificationError {
    /// The classifier returned an empty prediction list
    #[error("Classifier returned no predictions")]
    NoPredictions,

    /// The image has zero width or height
    #[error("Image has no pixels")]
    EmptyImage,

    /// Model-specific inference failure
    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Exporting a group as a zip archive failed.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// There is no group with this label
    #[error("No group named '{0}'")]
    UnknownGroup(String),

    /// The group has no files to archive
    #[error("Group '{0}' is empty")]
    EmptyGroup(String),

    /// Zip construction failed
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Writing the archive failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The browser refused the download
    #[error("Download failed: {0}")]
    Download(String),
}
