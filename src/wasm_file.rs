//! WASM file input.
//!
//! Files arrive from a `webkitdirectory` picker or from a drag-and-drop on
//! the page. Every file is read with a `FileReader` and the finished batch is
//! parked in a thread-local queue tagged with its [`DropTarget`]. The app
//! drains the queue on each tick.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::message::DropTarget;
use crate::model::ImageFile;

#[cfg(target_arch = "wasm32")]
pub use web::{open_folder_picker, read_dropped_entries, read_file_list};

thread_local! {
    /// Finished batches waiting to be picked up by the app.
    static PENDING_BATCHES: RefCell<VecDeque<(DropTarget, Vec<ImageFile>)>> =
        const { RefCell::new(VecDeque::new()) };
}

/// Take the oldest finished batch, if any.
pub fn take_pending_batch() -> Option<(DropTarget, Vec<ImageFile>)> {
    PENDING_BATCHES.with(|pending| pending.borrow_mut().pop_front())
}

fn push_pending_batch(target: DropTarget, files: Vec<ImageFile>) {
    PENDING_BATCHES.with(|pending| pending.borrow_mut().push_back((target, files)));
}

/// Build the handle for a file read in the browser.
///
/// `relative_path` is empty for loose files; otherwise it starts with the
/// dropped folder's name (`holiday/img1.jpg`).
fn browser_file(name: &str, mime: &str, relative_path: &str, bytes: Vec<u8>) -> ImageFile {
    let file = if mime.is_empty() {
        ImageFile::from_bytes(name, bytes)
    } else {
        ImageFile::new(name, mime, bytes)
    };
    match relative_path.trim_start_matches('/') {
        "" => file,
        path => file.with_relative_path(path),
    }
}

/// Batch being read; files land in their selection slot so order is kept.
struct PendingRead {
    target: DropTarget,
    slots: Vec<Option<ImageFile>>,
    remaining: usize,
}

impl PendingRead {
    fn new(target: DropTarget, len: usize) -> Self {
        Self {
            target,
            slots: vec![None; len],
            remaining: len,
        }
    }

    /// Record the outcome of one read; `None` means the read failed.
    fn fill(&mut self, index: usize, file: Option<ImageFile>) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = file;
        }
        self.finish_one();
    }

    fn finish_one(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            let files: Vec<ImageFile> = self.slots.drain(..).flatten().collect();
            log::info!("📂 All {} files read for {:?}", files.len(), self.target);
            push_pending_batch(self.target, files);
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::future::Future;
    use std::pin::Pin;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        DataTransfer, Event, File, FileList, FileReader, FileSystemDirectoryEntry,
        FileSystemEntry, FileSystemFileEntry, HtmlInputElement,
    };

    use super::{PendingRead, browser_file};
    use crate::message::DropTarget;

    /// A file plus the folder path it was found under.
    struct PickedFile {
        file: File,
        relative_path: String,
    }

    /// Open the folder picker for `target`.
    pub fn open_folder_picker(target: DropTarget) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let input: HtmlInputElement = document.create_element("input")?.dyn_into()?;
        input.set_type("file");
        input.set_multiple(true);
        input.set_attribute("webkitdirectory", "")?;
        input.set_attribute("directory", "")?; // Firefox fallback

        let onchange = Closure::wrap(Box::new(move |event: Event| {
            let Some(input) = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            let Some(list) = input.files() else {
                return;
            };
            if let Err(e) = read_file_list(target, &list) {
                log::error!("Failed to read selected files: {:?}", e);
            }
        }) as Box<dyn FnMut(Event)>);

        input.set_onchange(Some(onchange.as_ref().unchecked_ref()));
        onchange.forget(); // Leak the closure to keep it alive

        input.click();
        Ok(())
    }

    /// Read a `FileList` from a picker or a plain file drop.
    pub fn read_file_list(target: DropTarget, list: &FileList) -> Result<(), JsValue> {
        let files: Vec<PickedFile> = (0..list.length())
            .filter_map(|i| list.get(i))
            .map(|file| PickedFile {
                relative_path: file.webkit_relative_path(),
                file,
            })
            .collect();
        read_files(target, files)
    }

    /// Read everything dropped onto the page, walking into dropped folders.
    ///
    /// Entries must be taken while the drop event is being handled; the walk
    /// and the reads finish asynchronously.
    pub fn read_dropped_entries(
        target: DropTarget,
        transfer: &DataTransfer,
    ) -> Result<(), JsValue> {
        let items = transfer.items();
        let mut entries = Vec::new();
        for i in 0..items.length() {
            let Some(item) = items.get(i) else {
                continue;
            };
            if item.kind() != "file" {
                continue;
            }
            if let Some(entry) = item.webkit_get_as_entry()? {
                entries.push(entry);
            }
        }

        if entries.is_empty() {
            return match transfer.files() {
                Some(list) => read_file_list(target, &list),
                None => Ok(()),
            };
        }

        wasm_bindgen_futures::spawn_local(async move {
            let mut files = Vec::new();
            for entry in entries {
                if let Err(e) = walk_entry(entry, &mut files).await {
                    log::warn!("📂 Skipping part of the drop: {:?}", e);
                }
            }
            if let Err(e) = read_files(target, files) {
                log::error!("Failed to read dropped files: {:?}", e);
            }
        });
        Ok(())
    }

    fn walk_entry<'a>(
        entry: FileSystemEntry,
        out: &'a mut Vec<PickedFile>,
    ) -> Pin<Box<dyn Future<Output = Result<(), JsValue>> + 'a>> {
        Box::pin(async move {
            if entry.is_file() {
                let entry: FileSystemFileEntry = entry.unchecked_into();
                let promise = js_sys::Promise::new(&mut |resolve, reject| {
                    entry.file_with_callback_and_callback(&resolve, &reject);
                });
                let file: File = JsFuture::from(promise).await?.dyn_into()?;
                out.push(PickedFile {
                    relative_path: entry.full_path(),
                    file,
                });
            } else if entry.is_directory() {
                let directory: FileSystemDirectoryEntry = entry.unchecked_into();
                let reader = directory.create_reader();
                // readEntries hands out results in chunks until it returns none
                loop {
                    let promise = js_sys::Promise::new(&mut |resolve, reject| {
                        let read = reader.read_entries_with_callback_and_callback(&resolve, &reject);
                        if let Err(e) = read {
                            reject.call1(&JsValue::NULL, &e).ok();
                        }
                    });
                    let chunk: js_sys::Array = JsFuture::from(promise).await?.dyn_into()?;
                    if chunk.length() == 0 {
                        break;
                    }
                    for child in chunk.iter() {
                        walk_entry(child.dyn_into()?, out).await?;
                    }
                }
            }
            Ok(())
        })
    }

    fn read_files(target: DropTarget, files: Vec<PickedFile>) -> Result<(), JsValue> {
        if files.is_empty() {
            log::warn!("📂 No files to read for {:?}", target);
            return Ok(());
        }
        log::info!("📂 Reading {} files for {:?}", files.len(), target);

        let pending = Rc::new(RefCell::new(PendingRead::new(target, files.len())));

        for (index, picked) in files.into_iter().enumerate() {
            let reader = FileReader::new()?;
            let name = picked.file.name();
            let mime = picked.file.type_();
            let relative_path = picked.relative_path;
            let pending_inner = pending.clone();

            let onloadend = Closure::wrap(Box::new(move |event: Event| {
                let bytes = event
                    .target()
                    .and_then(|t| t.dyn_into::<FileReader>().ok())
                    .and_then(|reader| reader.result().ok())
                    .map(|result| js_sys::Uint8Array::new(&result).to_vec());

                let file = match bytes {
                    Some(bytes) => {
                        log::debug!("📂 File {} read: {} bytes", name, bytes.len());
                        Some(browser_file(&name, &mime, &relative_path, bytes))
                    }
                    None => {
                        log::warn!("📂 Could not read {}", name);
                        None
                    }
                };
                pending_inner.borrow_mut().fill(index, file);
            }) as Box<dyn FnMut(Event)>);

            reader.set_onloadend(Some(onloadend.as_ref().unchecked_ref()));
            onloadend.forget(); // Leak the closure to keep it alive

            reader.read_as_array_buffer(&picked.file)?;
        }

        Ok(())
    }
}
