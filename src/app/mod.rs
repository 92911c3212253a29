//! SmartSort application controller.
//!
//! All session state lives in [`SmartSortApp`] and changes only through
//! [`SmartSortApp::update`]. Each update returns the effects it needs run;
//! [`run_effect`] executes one and produces the follow-up message, and
//! [`SmartSortApp::dispatch`] loops the two until nothing is left to do.

mod handlers;

use std::collections::VecDeque;

use serde::Serialize;

use crate::classifier::{ClassifierSlot, ModelStatus};
use crate::config::AppConfig;
use crate::decoder::{ImageCrateDecoder, ImageDecoder};
use crate::export::{ArchiveSink, export_group};
use crate::geometry::{Point, ReportedGeometry};
use crate::gesture::GestureController;
use crate::merge::MergeSequencer;
use crate::message::{DropPolicy, Effect, Message};
use crate::model::{ClassifiedGroups, ImageFile};
use crate::pipeline::{ClassificationReport, classify_with_report};
use crate::plate::{PlateFolder, PlateStore};

/// Snapshot of the plate for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlateState {
    pub folders: Vec<PlateFolder>,
    pub flattened_images: Vec<ImageFile>,
    pub position: Point,
    pub is_dragging: bool,
    pub is_open: bool,
    pub is_poofing: bool,
    pub is_hidden: bool,
}

/// Main application state.
pub struct SmartSortApp {
    // Classification
    classifier: ClassifierSlot,
    decoder: Box<dyn ImageDecoder>,
    groups: ClassifiedGroups,
    last_report: ClassificationReport,
    last_batch: Vec<ImageFile>,
    loading: bool,
    queued: VecDeque<Vec<ImageFile>>,
    drop_policy: DropPolicy,
    show_thumbnails: bool,

    // Plate
    plate: PlateStore,
    gesture: GestureController,
    merge: MergeSequencer,
    geometry: ReportedGeometry,

    // Export
    last_export_error: Option<String>,
}

impl SmartSortApp {
    /// Create the app with the default `image` crate decoder.
    pub fn new(config: &AppConfig) -> Self {
        Self::with_decoder(config, Box::new(ImageCrateDecoder))
    }

    /// Create the app with a custom decoder.
    pub fn with_decoder(config: &AppConfig, decoder: Box<dyn ImageDecoder>) -> Self {
        log::info!(
            "🚀 SmartSort starting (merge {:?}, hit test {:?}, drops {:?})",
            config.plate.merge_mode,
            config.plate.hit_test,
            config.drop_policy
        );
        Self {
            classifier: ClassifierSlot::new(),
            decoder,
            groups: ClassifiedGroups::new(),
            last_report: ClassificationReport::default(),
            last_batch: Vec::new(),
            loading: false,
            queued: VecDeque::new(),
            drop_policy: config.drop_policy,
            show_thumbnails: false,
            plate: PlateStore::new(config.plate.origin),
            gesture: GestureController::new(config.plate.hit_test),
            merge: MergeSequencer::new(config.plate.merge_mode),
            geometry: ReportedGeometry::default(),
            last_export_error: None,
        }
    }

    /// Apply a message and return the effects it requests.
    pub fn update(&mut self, message: Message) -> Vec<Effect> {
        log::trace!("update: {:?}", message);
        match message {
            Message::ModelLoaded(result) => {
                self.classifier.resolve(result);
                Vec::new()
            }
            Message::FilesDropped(files) => self.handle_files_dropped(files),
            Message::ClassificationFinished(groups, report) => {
                self.handle_classification_finished(groups, report)
            }
            Message::ToggleThumbnails => {
                self.show_thumbnails = !self.show_thumbnails;
                Vec::new()
            }
            Message::PlateFolderDropped(files) => {
                self.handle_plate_folder(files);
                Vec::new()
            }
            Message::ClearPlate => {
                self.handle_clear_plate();
                Vec::new()
            }
            Message::TogglePlate => {
                self.plate.toggle_open();
                Vec::new()
            }
            Message::PlatePressed(pointer) => {
                self.gesture.press(
                    pointer,
                    &self.plate,
                    &self.geometry,
                    self.merge.is_pending(),
                );
                Vec::new()
            }
            Message::PointerMoved(pointer) => {
                self.gesture.pointer_moved(pointer, &mut self.plate);
                Vec::new()
            }
            Message::PointerReleased(pointer) => {
                self.gesture
                    .release(pointer, &mut self.plate, &self.geometry);
                Vec::new()
            }
            Message::PoofFinished(now) => self.handle_poof_finished(now),
            Message::Tick(now) => match self.merge.tick(&mut self.plate, now) {
                Some(images) => self.submit_batch(images),
                None => Vec::new(),
            },
            Message::LayoutChanged(region, rect) => {
                self.geometry.set(region, rect);
                Vec::new()
            }
            Message::ExportGroup(label) => self.handle_export_group(label),
            Message::ExportFinished(label, result) => {
                self.handle_export_finished(label, result);
                Vec::new()
            }
        }
    }

    /// Apply a message, then run every resulting effect to completion.
    pub fn dispatch(&mut self, message: Message, sink: &dyn ArchiveSink) {
        let mut pending: VecDeque<Effect> = self.update(message).into();
        while let Some(effect) = pending.pop_front() {
            if let Some(next) = run_effect(self, effect, sink) {
                pending.extend(self.update(next));
            }
        }
    }

    /// Model status line.
    pub fn status_text(&self) -> &'static str {
        self.classifier.status().display_text()
    }

    /// Summary of the last run, e.g. "Sorted 4 images into 2 groups".
    pub fn summary_text(&self) -> String {
        if self.loading {
            return format!("Classifying {} images…", self.last_batch.len());
        }
        if self.last_batch.is_empty() {
            return "Drop a folder of images".to_string();
        }
        let mut text = format!(
            "Sorted {} image{} into {} group{}",
            self.groups.total_files(),
            if self.groups.total_files() == 1 { "" } else { "s" },
            self.groups.len(),
            if self.groups.len() == 1 { "" } else { "s" }
        );
        if self.last_report.failed > 0 {
            text.push_str(&format!(" ({} failed)", self.last_report.failed));
        }
        text
    }

    /// Model readiness.
    pub fn model_status(&self) -> ModelStatus {
        self.classifier.status()
    }

    /// Why the model failed to load, if it did.
    pub fn model_error(&self) -> Option<&str> {
        self.classifier.error()
    }

    /// Current groups.
    pub fn groups(&self) -> &ClassifiedGroups {
        &self.groups
    }

    /// Counts from the last finished run.
    pub fn last_report(&self) -> ClassificationReport {
        self.last_report
    }

    /// Image files from the most recent drop.
    pub fn last_batch(&self) -> &[ImageFile] {
        &self.last_batch
    }

    /// Whether a classification run is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Batches waiting for the current run to finish.
    pub fn queued_batches(&self) -> usize {
        self.queued.len()
    }

    /// Whether thumbnails are shown in the result grid.
    pub fn show_thumbnails(&self) -> bool {
        self.show_thumbnails
    }

    /// Message from the last failed export.
    pub fn last_export_error(&self) -> Option<&str> {
        self.last_export_error.as_deref()
    }

    /// Whether a delayed merge is waiting for its deadline.
    pub fn is_merge_pending(&self) -> bool {
        self.merge.is_pending()
    }

    /// Plate snapshot.
    pub fn plate_state(&self) -> PlateState {
        PlateState {
            folders: self.plate.folders().to_vec(),
            flattened_images: self.plate.flattened_images().to_vec(),
            position: self.plate.position(),
            is_dragging: self.gesture.is_dragging(),
            is_open: self.plate.is_open(),
            is_poofing: self.gesture.is_poofing(),
            is_hidden: self.plate.is_hidden(),
        }
    }

    /// Plate summary line.
    pub fn plate_summary(&self) -> String {
        self.plate.summary()
    }
}

/// Execute one effect and return the message carrying its result.
pub fn run_effect(app: &SmartSortApp, effect: Effect, sink: &dyn ArchiveSink) -> Option<Message> {
    match effect {
        Effect::Classify(files) => {
            let (groups, report) =
                classify_with_report(&files, app.decoder.as_ref(), &app.classifier);
            Some(Message::ClassificationFinished(groups, report))
        }
        Effect::Export { label, files } => {
            let result = export_group(&label, &files, sink);
            Some(Message::ExportFinished(label, result))
        }
    }
}
