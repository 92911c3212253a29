//! Merge sequencer: hands the plate's images to the pipeline after a poof.
//!
//! In [`MergeMode::Immediate`] the plate is emptied as soon as the poof
//! finishes. In [`MergeMode::Delayed`] the plate is first hidden for a fixed
//! delay so the poof reads as a disappearance; the images captured when the
//! poof finished are handed off on the first tick at or after the deadline.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::model::ImageFile;
use crate::plate::PlateStore;

/// How a successful drop hands the plate over to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum MergeMode {
    /// Merge as soon as the poof finishes
    Immediate,
    /// Hide the plate, then merge after `delay_ms`
    Delayed {
        /// Hide duration in milliseconds
        delay_ms: u64,
    },
}

impl Default for MergeMode {
    fn default() -> Self {
        MergeMode::Delayed {
            delay_ms: crate::constants::DEFAULT_MERGE_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone)]
struct PendingMerge {
    deadline: Instant,
    images: Vec<ImageFile>,
}

/// Sequences the plate-to-pipeline hand-off.
#[derive(Debug, Clone, Default)]
pub struct MergeSequencer {
    mode: MergeMode,
    pending: Option<PendingMerge>,
}

impl MergeSequencer {
    /// Create a sequencer for the given mode.
    pub fn new(mode: MergeMode) -> Self {
        Self {
            mode,
            pending: None,
        }
    }

    /// Whether a delayed merge is waiting for its deadline.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Start merging once the poof finished.
    ///
    /// Returns the images to classify right away in immediate mode, or `None`
    /// when the merge was deferred.
    pub fn begin(&mut self, plate: &mut PlateStore, now: Instant) -> Option<Vec<ImageFile>> {
        match self.mode {
            MergeMode::Immediate => {
                let images = plate.take_all();
                log::info!("🍽️ Merging {} plate images", images.len());
                Some(images)
            }
            MergeMode::Delayed { delay_ms } => {
                if self.pending.is_some() {
                    log::warn!("Merge already pending, ignoring second poof");
                    return None;
                }
                let images = plate.flattened_images().to_vec();
                plate.set_hidden(true);
                log::info!(
                    "🍽️ Plate hidden, merging {} images in {} ms",
                    images.len(),
                    delay_ms
                );
                self.pending = Some(PendingMerge {
                    deadline: now + Duration::from_millis(delay_ms),
                    images,
                });
                None
            }
        }
    }

    /// Advance time. Returns the captured images once the deadline has passed.
    pub fn tick(&mut self, plate: &mut PlateStore, now: Instant) -> Option<Vec<ImageFile>> {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.deadline);
        if !due {
            return None;
        }

        let pending = self.pending.take()?;
        plate.clear();
        plate.set_hidden(false);
        log::info!("🍽️ Merging {} plate images", pending.images.len());
        Some(pending.images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn staged(n: usize) -> PlateStore {
        let mut plate = PlateStore::new(Point::new(0.0, 0.0));
        let files: Vec<_> = (0..n)
            .map(|i| ImageFile::from_bytes(format!("{}.png", i), vec![]))
            .collect();
        plate.add_folder(&files);
        plate
    }

    #[test]
    fn test_immediate_merge() {
        let mut plate = staged(3);
        let mut merge = MergeSequencer::new(MergeMode::Immediate);

        let images = merge.begin(&mut plate, Instant::now()).expect("immediate");
        assert_eq!(images.len(), 3);
        assert!(plate.is_empty());
        assert!(!merge.is_pending());
    }

    #[test]
    fn test_delayed_merge_waits_for_deadline() {
        let mut plate = staged(2);
        let expected = plate.flattened_images().to_vec();
        let mut merge = MergeSequencer::new(MergeMode::Delayed { delay_ms: 3000 });
        let start = Instant::now();

        assert!(merge.begin(&mut plate, start).is_none());
        assert!(merge.is_pending());
        assert!(plate.is_hidden());
        assert_eq!(plate.flattened_images().len(), 2, "still staged during the delay");

        assert!(merge.tick(&mut plate, start + Duration::from_millis(2999)).is_none());

        let images = merge
            .tick(&mut plate, start + Duration::from_millis(3000))
            .expect("due");
        assert_eq!(images, expected);
        assert!(plate.is_empty());
        assert!(!plate.is_hidden());
        assert!(!merge.is_pending());

        assert!(merge.tick(&mut plate, start + Duration::from_secs(10)).is_none());
    }

    #[test]
    fn test_tick_without_pending_is_noop() {
        let mut plate = staged(1);
        let mut merge = MergeSequencer::new(MergeMode::default());
        assert!(merge.tick(&mut plate, Instant::now()).is_none());
        assert_eq!(plate.flattened_images().len(), 1);
    }

    #[test]
    fn test_merge_mode_serde() {
        let json = serde_json::to_string(&MergeMode::Delayed { delay_ms: 500 }).unwrap();
        assert_eq!(json, r#"{"mode":"delayed","delay_ms":500}"#);
        let mode: MergeMode = serde_json::from_str(r#"{"mode":"immediate"}"#).unwrap();
        assert_eq!(mode, MergeMode::Immediate);
    }
}
