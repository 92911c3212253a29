//! Global constants for the SmartSort application

use crate::geometry::Point;

/// Resting position of the plate panel
pub const PLATE_ORIGIN: Point = Point::new(10.0, 80.0);

/// How long the plate stays hidden before a delayed merge runs
pub const DEFAULT_MERGE_DELAY_MS: u64 = 3000;

/// Model weights, relative to the page (WASM) or working directory (native)
pub const DEFAULT_MODEL_URL: &str = "assets/model/model.json";

/// Model metadata with class labels
pub const DEFAULT_METADATA_URL: &str = "assets/model/metadata.json";
