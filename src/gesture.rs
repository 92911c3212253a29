//! Plate drag gesture controller.
//!
//! State machine over `Idle -> Dragging -> (Poofing | Idle)` and
//! `Poofing -> Idle`. While dragging, the plate follows the pointer with the
//! grab offset recorded at press time, so the grabbed point stays under the
//! cursor. On release the plate is hit-tested against the drop zone: a hit
//! starts the poof, a miss snaps the plate back to its origin.
//!
//! Pointer moves and releases outside `Dragging` are ignored, which covers
//! duplicate and late pointer-up events.

use serde::{Deserialize, Serialize};

use crate::geometry::{GeometryProvider, Point, Rect, Region};
use crate::plate::PlateStore;

/// What is tested against the drop zone on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HitTestMode {
    /// The plate's bounding box must intersect the drop zone
    #[default]
    Rect,
    /// The release point must lie inside the drop zone
    Point,
}

/// Current gesture phase.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GesturePhase {
    /// No gesture in progress
    #[default]
    Idle,
    /// The plate follows the pointer
    Dragging {
        /// Pointer position minus plate origin at press time
        offset: Point,
    },
    /// Dropped on the drop zone, waiting for the poof effect to finish
    Poofing,
}

/// Result of a pointer release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// No drag was active
    Ignored,
    /// Released over the drop zone; the poof has started
    Poof,
    /// Released elsewhere; the plate snapped back
    SnapBack,
}

/// Drives the plate drag gesture.
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    phase: GesturePhase,
    hit_test: HitTestMode,
}

impl GestureController {
    /// Create an idle controller.
    pub fn new(hit_test: HitTestMode) -> Self {
        Self {
            phase: GesturePhase::Idle,
            hit_test,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Whether a drag is active.
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, GesturePhase::Dragging { .. })
    }

    /// Whether the poof effect is playing.
    pub fn is_poofing(&self) -> bool {
        matches!(self.phase, GesturePhase::Poofing)
    }

    /// Begin a drag when the plate handle is pressed.
    ///
    /// Refused while idle is not the current phase, when nothing is staged, or
    /// while `blocked` (a merge is pending). Returns whether dragging started.
    pub fn press(
        &mut self,
        pointer: Point,
        plate: &PlateStore,
        geometry: &dyn GeometryProvider,
        blocked: bool,
    ) -> bool {
        if self.phase != GesturePhase::Idle || plate.is_empty() || blocked {
            log::debug!(
                "Drag refused (phase {:?}, empty {}, blocked {})",
                self.phase,
                plate.is_empty(),
                blocked
            );
            return false;
        }

        let plate_origin = geometry
            .rect(Region::Plate)
            .map(|r| r.origin())
            .unwrap_or_else(|| plate.position());
        let offset = pointer - plate_origin;

        self.phase = GesturePhase::Dragging { offset };
        log::debug!("Drag started at {:?} (offset {:?})", pointer, offset);
        true
    }

    /// Move the plate with the pointer. Returns whether the plate moved.
    pub fn pointer_moved(&mut self, pointer: Point, plate: &mut PlateStore) -> bool {
        let GesturePhase::Dragging { offset } = self.phase else {
            return false;
        };
        plate.set_position(pointer - offset);
        true
    }

    /// End the drag and hit-test against the drop zone.
    pub fn release(
        &mut self,
        pointer: Point,
        plate: &mut PlateStore,
        geometry: &dyn GeometryProvider,
    ) -> ReleaseOutcome {
        let GesturePhase::Dragging { offset } = self.phase else {
            log::trace!("Release ignored, no drag active");
            return ReleaseOutcome::Ignored;
        };

        plate.set_position(pointer - offset);

        if self.is_over_drop_zone(pointer, plate, geometry) {
            self.phase = GesturePhase::Poofing;
            log::info!("💨 Plate dropped on drop zone with {} images", plate.flattened_images().len());
            ReleaseOutcome::Poof
        } else {
            self.phase = GesturePhase::Idle;
            plate.reset_position();
            log::debug!("Plate released outside drop zone, snapping back");
            ReleaseOutcome::SnapBack
        }
    }

    /// The poof effect completed. Returns whether a poof was playing.
    pub fn poof_finished(&mut self, plate: &mut PlateStore) -> bool {
        if !self.is_poofing() {
            return false;
        }
        self.phase = GesturePhase::Idle;
        plate.reset_position();
        true
    }

    fn is_over_drop_zone(
        &self,
        pointer: Point,
        plate: &PlateStore,
        geometry: &dyn GeometryProvider,
    ) -> bool {
        let Some(zone) = geometry.rect(Region::DropZone) else {
            log::warn!("Drop zone is not laid out; treating release as a miss");
            return false;
        };

        match self.hit_test {
            HitTestMode::Point => zone.contains(pointer),
            HitTestMode::Rect => {
                let size = geometry
                    .rect(Region::Plate)
                    .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
                size.with_origin(plate.position()).intersects(&zone)
            }
        }
    }
}
