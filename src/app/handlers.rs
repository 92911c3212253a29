//! Message handlers for the SmartSort application.
//!
//! Each handler processes one kind of message, keeping
//! [`SmartSortApp::update`] a flat dispatch table.

use web_time::Instant;

use super::SmartSortApp;
use crate::classifier::ModelStatus;
use crate::error::ArchiveError;
use crate::message::{DropPolicy, Effect};
use crate::model::{ClassifiedGroups, ImageFile};
use crate::pipeline::{ClassificationReport, filter_images};

impl SmartSortApp {
    /// Files dropped on the drop zone.
    pub(super) fn handle_files_dropped(&mut self, files: Vec<ImageFile>) -> Vec<Effect> {
        self.submit_batch(files)
    }

    /// Start classifying a batch, or hold it according to model state and drop policy.
    ///
    /// Plate merges come through here too, so they behave exactly like a drop.
    pub(super) fn submit_batch(&mut self, files: Vec<ImageFile>) -> Vec<Effect> {
        let images = filter_images(&files);
        log::info!(
            "📥 Received {} files ({} images)",
            files.len(),
            images.len()
        );

        if self.loading {
            return match self.drop_policy {
                DropPolicy::Ignore => {
                    log::warn!(
                        "Classification in progress, ignoring drop of {} images",
                        images.len()
                    );
                    Vec::new()
                }
                DropPolicy::Queue => {
                    log::info!(
                        "Classification in progress, queueing {} images",
                        images.len()
                    );
                    self.queued.push_back(images);
                    Vec::new()
                }
            };
        }

        self.last_batch = images.clone();
        self.show_thumbnails = false;

        if self.classifier.status() != ModelStatus::Loaded {
            log::warn!(
                "Model is {}; {} images not classified",
                self.classifier.status().name(),
                images.len()
            );
            return Vec::new();
        }

        self.loading = true;
        vec![Effect::Classify(images)]
    }

    pub(super) fn handle_classification_finished(
        &mut self,
        groups: ClassifiedGroups,
        report: ClassificationReport,
    ) -> Vec<Effect> {
        log::info!(
            "✅ Classification finished: {} groups, {} images",
            groups.len(),
            groups.total_files()
        );
        self.groups = groups;
        self.last_report = report;
        self.loading = false;

        match self.queued.pop_front() {
            Some(next) => {
                log::debug!("Starting queued batch of {} images", next.len());
                self.submit_batch(next)
            }
            None => Vec::new(),
        }
    }

    pub(super) fn handle_plate_folder(&mut self, files: Vec<ImageFile>) {
        if self.merge.is_pending() || self.gesture.is_poofing() {
            log::warn!("Plate is merging, folder drop refused");
            return;
        }
        self.plate.add_folder(&files);
    }

    pub(super) fn handle_clear_plate(&mut self) {
        if self.merge.is_pending() || self.gesture.is_dragging() || self.gesture.is_poofing() {
            log::debug!("Clear refused while the plate is in motion");
            return;
        }
        self.plate.clear();
    }

    pub(super) fn handle_poof_finished(&mut self, now: Instant) -> Vec<Effect> {
        if !self.gesture.poof_finished(&mut self.plate) {
            log::trace!("Poof finished with no poof playing");
            return Vec::new();
        }
        match self.merge.begin(&mut self.plate, now) {
            Some(images) => self.submit_batch(images),
            None => Vec::new(),
        }
    }

    pub(super) fn handle_export_group(&mut self, label: String) -> Vec<Effect> {
        match self.groups.get(&label) {
            Some(files) => vec![Effect::Export {
                files: files.to_vec(),
                label,
            }],
            None => {
                let error = ArchiveError::UnknownGroup(label.clone());
                self.handle_export_finished(label, Err(error));
                Vec::new()
            }
        }
    }

    pub(super) fn handle_export_finished(
        &mut self,
        label: String,
        result: Result<String, ArchiveError>,
    ) {
        match result {
            Ok(filename) => {
                log::info!("📦 Exported group '{}' as {}", label, filename);
                self.last_export_error = None;
            }
            Err(e) => {
                log::error!("Export of group '{}' failed: {}", label, e);
                self.last_export_error = Some(e.to_string());
            }
        }
    }
}
