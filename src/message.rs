//! Application message types for SmartSort.
//!
//! All input events and async results are represented as messages in the Elm
//! architecture style. Side effects requested by an update are returned as
//! [`Effect`]s and executed by the caller.

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::classifier::Classifier;
use crate::error::{ArchiveError, ModelLoadError};
use crate::geometry::{Point, Rect, Region};
use crate::model::{ClassifiedGroups, ImageFile};
use crate::pipeline::ClassificationReport;

/// What to do with a drop that arrives while a classification is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DropPolicy {
    /// Discard the new drop
    Ignore,
    /// Classify it after the current run finishes
    #[default]
    Queue,
}

/// Where a set of picked files should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropTarget {
    /// Primary drop zone, classified right away
    DropZone,
    /// Staged on the plate
    Plate,
}

impl DropTarget {
    /// Message delivering `files` to this target.
    pub fn into_message(self, files: Vec<ImageFile>) -> Message {
        match self {
            Self::DropZone => Message::FilesDropped(files),
            Self::Plate => Message::PlateFolderDropped(files),
        }
    }
}

/// Messages that can be sent to update application state.
pub enum Message {
    // Model
    /// Model loading finished
    ModelLoaded(Result<Box<dyn Classifier>, ModelLoadError>),

    // Drop zone
    /// Files were dropped on or picked for the drop zone
    FilesDropped(Vec<ImageFile>),
    /// A classification run finished
    ClassificationFinished(ClassifiedGroups, ClassificationReport),
    /// Show or hide thumbnails in the result grid
    ToggleThumbnails,

    // Plate
    /// A folder was dropped on or picked for the plate
    PlateFolderDropped(Vec<ImageFile>),
    /// Clear Plate button
    ClearPlate,
    /// Show/Hide Plate button
    TogglePlate,
    /// Pointer pressed on the plate handle
    PlatePressed(Point),
    /// Pointer moved anywhere
    PointerMoved(Point),
    /// Pointer released anywhere
    PointerReleased(Point),
    /// The poof effect finished playing
    PoofFinished(Instant),
    /// Periodic tick for delayed work
    Tick(Instant),
    /// Layout reported a new rectangle for a region
    LayoutChanged(Region, Option<Rect>),

    // Export
    /// Download button for a group
    ExportGroup(String),
    /// An export finished
    ExportFinished(String, Result<String, ArchiveError>),
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::ModelLoaded(Ok(_)) => write!(f, "ModelLoaded(Ok)"),
            Message::ModelLoaded(Err(e)) => write!(f, "ModelLoaded(Err({}))", e),
            Message::FilesDropped(files) => write!(f, "FilesDropped({} files)", files.len()),
            Message::ClassificationFinished(groups, report) => write!(
                f,
                "ClassificationFinished({} groups, {:?})",
                groups.len(),
                report
            ),
            Message::ToggleThumbnails => write!(f, "ToggleThumbnails"),
            Message::PlateFolderDropped(files) => {
                write!(f, "PlateFolderDropped({} files)", files.len())
            }
            Message::ClearPlate => write!(f, "ClearPlate"),
            Message::TogglePlate => write!(f, "TogglePlate"),
            Message::PlatePressed(p) => write!(f, "PlatePressed({:?})", p),
            Message::PointerMoved(p) => write!(f, "PointerMoved({:?})", p),
            Message::PointerReleased(p) => write!(f, "PointerReleased({:?})", p),
            Message::PoofFinished(_) => write!(f, "PoofFinished"),
            Message::Tick(_) => write!(f, "Tick"),
            Message::LayoutChanged(region, rect) => {
                write!(f, "LayoutChanged({:?}, {:?})", region, rect)
            }
            Message::ExportGroup(label) => write!(f, "ExportGroup({})", label),
            Message::ExportFinished(label, result) => {
                write!(f, "ExportFinished({}, {:?})", label, result)
            }
        }
    }
}

/// Side effects requested by an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run the classification pipeline over these files
    Classify(Vec<ImageFile>),
    /// Pack a group into an archive and save it
    Export {
        /// Group label
        label: String,
        /// Files in the group
        files: Vec<ImageFile>,
    },
}
