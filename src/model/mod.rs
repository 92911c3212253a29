//! Data models for SmartSort.

mod groups;
mod image_file;
mod prediction;

pub use groups::{ClassifiedGroups, Group};
pub use image_file::{ImageFile, is_image_mime, mime_for_filename};
pub use prediction::{Prediction, top_prediction};
