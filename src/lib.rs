//! SmartSort - image sorter
//!
//! Classifies a folder of images with a pretrained model, groups them by
//! predicted label and exports each group as a zip archive. A staging plate
//! collects several folders and merges them into one batch with a
//! drag-and-drop gesture. Runs natively as a CLI and in the browser via WASM.

pub mod app;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod export;
pub mod geometry;
pub mod gesture;
pub mod logging;
pub mod merge;
pub mod message;
pub mod model;
pub mod pipeline;
pub mod plate;

#[cfg(not(target_arch = "wasm32"))]
pub mod input;

pub use app::{PlateState, SmartSortApp};
pub use config::AppConfig;
pub use message::{Effect, Message};

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;
#[cfg(any(target_arch = "wasm32", test))]
mod wasm_file;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
