//! Group export as zip archives.
//!
//! A group is packed into `<label>.zip` with one deflated entry per file and
//! handed to an [`ArchiveSink`]: a browser download on WASM, a file in the
//! export folder on native. Export never changes classification state.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::ArchiveError;
use crate::model::ImageFile;

/// Receives finished archives.
pub trait ArchiveSink {
    /// Save the archive under `filename`.
    fn save(&self, archive: Vec<u8>, filename: &str) -> Result<(), ArchiveError>;
}

/// Download filename for a group.
pub fn archive_name(label: &str) -> String {
    format!("{}.zip", label)
}

/// Build a zip archive holding the given files.
///
/// Files sharing a name get a ` (n)` suffix so every entry is kept.
pub fn build_archive(files: &[ImageFile]) -> Result<Vec<u8>, ArchiveError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut used = HashSet::new();

    for file in files {
        let entry = unique_entry_name(file.name(), &mut used);
        zip.start_file(entry.as_str(), options)?;
        zip.write_all(file.data())?;
        log::trace!("Added '{}' ({} bytes) to archive", entry, file.size());
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Pack a group and hand it to the sink.
pub fn export_group(
    label: &str,
    files: &[ImageFile],
    sink: &dyn ArchiveSink,
) -> Result<String, ArchiveError> {
    if files.is_empty() {
        return Err(ArchiveError::EmptyGroup(label.to_string()));
    }

    let filename = archive_name(label);
    let archive = build_archive(files)?;
    log::info!(
        "📦 Exporting {} files as '{}' ({} bytes)",
        files.len(),
        filename,
        archive.len()
    );
    sink.save(archive, &filename)?;
    Ok(filename)
}

fn unique_entry_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };

    let mut n = 1;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Writes archives into a folder (native only).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FolderSink {
    folder: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FolderSink {
    /// Create a sink writing into `folder`.
    pub fn new(folder: impl Into<std::path::PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ArchiveSink for FolderSink {
    fn save(&self, archive: Vec<u8>, filename: &str) -> Result<(), ArchiveError> {
        std::fs::create_dir_all(&self.folder)?;
        // Labels may contain path separators
        let safe: String = filename
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        let path = self.folder.join(safe);
        std::fs::write(&path, archive)?;
        log::info!("📦 Saved {:?}", path);
        Ok(())
    }
}

/// Triggers a browser download (WASM only).
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserDownload;

#[cfg(target_arch = "wasm32")]
impl ArchiveSink for BrowserDownload {
    fn save(&self, archive: Vec<u8>, filename: &str) -> Result<(), ArchiveError> {
        use wasm_bindgen::JsCast;
        use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

        let fail = |what: &str, e: wasm_bindgen::JsValue| {
            ArchiveError::Download(format!("{}: {:?}", what, e))
        };

        let bytes = js_sys::Uint8Array::from(archive.as_slice());
        let parts = js_sys::Array::of1(&bytes);
        let props = BlobPropertyBag::new();
        props.set_type("application/zip");
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &props)
            .map_err(|e| fail("blob", e))?;

        let url = Url::create_object_url_with_blob(&blob).map_err(|e| fail("object url", e))?;

        let window =
            web_sys::window().ok_or_else(|| ArchiveError::Download("no window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| ArchiveError::Download("no document".to_string()))?;
        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(|e| fail("anchor", e))?
            .dyn_into()
            .map_err(|_| ArchiveError::Download("not an anchor element".to_string()))?;

        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.click();

        // The download reads the URL after this task, so revoke it on the next one
        let revoke = wasm_bindgen::closure::Closure::once_into_js(move || {
            Url::revoke_object_url(&url).ok();
        });
        if let Err(e) = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(revoke.unchecked_ref(), 0)
        {
            log::warn!("Could not schedule object URL cleanup: {:?}", e);
        }
        Ok(())
    }
}
