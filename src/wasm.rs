//! Browser entry point.
//!
//! [`WebSmartSort`] wraps the application controller for the page script:
//! the page forwards pointer events, file drops, layout rectangles and
//! animation ends, calls `tick` from `requestAnimationFrame`, and reads state
//! back as JSON.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{DragEvent, FileList, Response};
use web_time::Instant;

use crate::app::SmartSortApp;
use crate::classifier::{Classifier, load_palette_from_json};
use crate::config::{AppConfig, LogLevel};
use crate::error::ModelLoadError;
use crate::export::BrowserDownload;
use crate::geometry::{Point, Rect, Region};
use crate::message::{DropTarget, Message};
use crate::wasm_file::{
    open_folder_picker, read_dropped_entries, read_file_list, take_pending_batch,
};

#[wasm_bindgen(start)]
pub fn start() {
    let config = AppConfig::load_from_local_storage();
    crate::logging::init(config.preferences.log_level);
    log::info!("SmartSort WASM starting...");
}

/// SmartSort handle exposed to JavaScript.
#[wasm_bindgen]
pub struct WebSmartSort {
    app: Rc<RefCell<SmartSortApp>>,
}

#[wasm_bindgen]
impl WebSmartSort {
    /// Create the app and start loading the model in the background.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebSmartSort {
        let config = AppConfig::load_from_local_storage();
        let app = Rc::new(RefCell::new(SmartSortApp::new(&config)));

        let loader_app = app.clone();
        let model_url = config.model.model_url.clone();
        let metadata_url = config.model.metadata_url.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = load_model(&model_url, &metadata_url).await;
            loader_app
                .borrow_mut()
                .dispatch(Message::ModelLoaded(result), &BrowserDownload);
        });

        WebSmartSort { app }
    }

    /// Model status line.
    pub fn status_text(&self) -> String {
        self.app.borrow().status_text().to_string()
    }

    /// Why the model failed to load, if it did.
    pub fn model_error(&self) -> Option<String> {
        self.app.borrow().model_error().map(str::to_string)
    }

    /// Result summary line.
    pub fn summary_text(&self) -> String {
        self.app.borrow().summary_text()
    }

    pub fn is_loading(&self) -> bool {
        self.app.borrow().is_loading()
    }

    pub fn show_thumbnails(&self) -> bool {
        self.app.borrow().show_thumbnails()
    }

    /// Groups as `[{label, files: [...]}, ...]`.
    pub fn groups_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.app.borrow().groups())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Plate snapshot as JSON.
    pub fn plate_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.app.borrow().plate_state())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn plate_summary(&self) -> String {
        self.app.borrow().plate_summary()
    }

    /// Open the folder picker for the drop zone, or for the plate.
    pub fn open_picker(&self, for_plate: bool) -> Result<(), JsValue> {
        open_folder_picker(drop_target(for_plate))
    }

    /// Handle a `drop` event on the drop zone or the plate.
    ///
    /// Dropped folders are walked recursively. The files reach the app on a
    /// later `tick` once they have been read.
    pub fn drop_event(&self, for_plate: bool, event: DragEvent) -> Result<(), JsValue> {
        event.prevent_default();
        match event.data_transfer() {
            Some(transfer) => read_dropped_entries(drop_target(for_plate), &transfer),
            None => {
                log::warn!("📂 Drop without data");
                Ok(())
            }
        }
    }

    /// Read a `FileList` the page collected itself.
    pub fn files_dropped(&self, for_plate: bool, files: FileList) -> Result<(), JsValue> {
        read_file_list(drop_target(for_plate), &files)
    }

    /// Deliver read files and advance timers. Call once per frame.
    pub fn tick(&self) {
        while let Some((target, files)) = take_pending_batch() {
            self.dispatch(target.into_message(files));
        }
        self.dispatch(Message::Tick(Instant::now()));
    }

    /// Report a region's bounding rectangle (`"plate"` or `"dropzone"`).
    pub fn set_layout(&self, region: &str, left: f32, top: f32, width: f32, height: f32) {
        let region = match region {
            "plate" => Region::Plate,
            "dropzone" => Region::DropZone,
            other => {
                log::warn!("Unknown layout region '{}'", other);
                return;
            }
        };
        self.dispatch(Message::LayoutChanged(
            region,
            Some(Rect::new(left, top, width, height)),
        ));
    }

    pub fn plate_pressed(&self, x: f32, y: f32) {
        self.dispatch(Message::PlatePressed(Point::new(x, y)));
    }

    pub fn pointer_moved(&self, x: f32, y: f32) {
        self.dispatch(Message::PointerMoved(Point::new(x, y)));
    }

    pub fn pointer_released(&self, x: f32, y: f32) {
        self.dispatch(Message::PointerReleased(Point::new(x, y)));
    }

    /// The poof animation ended.
    pub fn poof_finished(&self) {
        self.dispatch(Message::PoofFinished(Instant::now()));
    }

    pub fn toggle_plate(&self) {
        self.dispatch(Message::TogglePlate);
    }

    pub fn clear_plate(&self) {
        self.dispatch(Message::ClearPlate);
    }

    pub fn toggle_thumbnails(&self) {
        self.dispatch(Message::ToggleThumbnails);
    }

    /// Download a group as `<label>.zip`.
    pub fn export_group(&self, label: String) {
        self.dispatch(Message::ExportGroup(label));
    }

    /// Message from the last failed export.
    pub fn last_export_error(&self) -> Option<String> {
        self.app.borrow().last_export_error().map(str::to_string)
    }

    /// Change the log level and remember it in localStorage.
    pub fn set_log_level(&self, level: &str) -> Result<(), JsValue> {
        let level = LogLevel::from_name(level)
            .ok_or_else(|| JsValue::from_str(&format!("unknown log level '{}'", level)))?;
        log::set_max_level(level.to_level_filter());

        let mut config = AppConfig::load_from_local_storage();
        config.preferences.log_level = level;
        config
            .save_to_local_storage()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl WebSmartSort {
    fn dispatch(&self, message: Message) {
        self.app.borrow_mut().dispatch(message, &BrowserDownload);
    }
}

fn drop_target(for_plate: bool) -> DropTarget {
    if for_plate {
        DropTarget::Plate
    } else {
        DropTarget::DropZone
    }
}

impl Default for WebSmartSort {
    fn default() -> Self {
        Self::new()
    }
}

async fn load_model(
    model_url: &str,
    metadata_url: &str,
) -> Result<Box<dyn Classifier>, ModelLoadError> {
    log::info!("Fetching model from '{}' and '{}'", model_url, metadata_url);
    let model_json = fetch_text(model_url).await?;
    let metadata_json = fetch_text(metadata_url).await?;
    let classifier = load_palette_from_json(model_url, &model_json, metadata_url, &metadata_json)?;
    Ok(Box::new(classifier))
}

async fn fetch_text(url: &str) -> Result<String, ModelLoadError> {
    let fail = |e: JsValue| ModelLoadError::fetch(url, format!("{:?}", e));

    let window = web_sys::window().ok_or_else(|| ModelLoadError::fetch(url, "no window"))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(fail)?;
    let response: Response = response.dyn_into().map_err(fail)?;

    if !response.ok() {
        return Err(ModelLoadError::fetch(
            url,
            format!("HTTP {}", response.status()),
        ));
    }

    let text = JsFuture::from(response.text().map_err(fail)?)
        .await
        .map_err(fail)?;
    text.as_string()
        .ok_or_else(|| ModelLoadError::fetch(url, "response is not text"))
}
