//! User-supplied image handles.

use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// MIME type used for files whose extension is not recognised.
const FALLBACK_MIME: &str = "application/octet-stream";

/// Guess a MIME type from the filename extension.
pub fn mime_for_filename(name: &str) -> &'static str {
    let Some((_, ext)) = name.rsplit_once('.') else {
        return FALLBACK_MIME;
    };

    match ext.to_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tiff" | "tif" => "image/tiff",
        "txt" => "text/plain",
        "json" => "application/json",
        "zip" => "application/zip",
        _ => FALLBACK_MIME,
    }
}

/// Whether a declared MIME type is an image type.
pub fn is_image_mime(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}

struct ImageFileInner {
    name: String,
    relative_path: Option<String>,
    mime: String,
    data: Vec<u8>,
}

/// Opaque handle to a user-supplied file.
///
/// The handle is immutable and reference-counted: the pending batch, a plate
/// folder and a classified group can all hold the same file without copying
/// its bytes. Equality is identity, two handles are equal only if they point
/// at the same file.
#[derive(Clone)]
pub struct ImageFile(Arc<ImageFileInner>);

impl ImageFile {
    /// Create a file handle with an explicit MIME type.
    pub fn new(name: impl Into<String>, mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self(Arc::new(ImageFileInner {
            name: name.into(),
            relative_path: None,
            mime: mime.into(),
            data,
        }))
    }

    /// Create a file handle, guessing the MIME type from the name.
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        let name = name.into();
        let mime = mime_for_filename(&name);
        Self::new(name, mime, data)
    }

    /// Attach the path relative to the dropped folder (e.g. `holiday/img1.jpg`).
    ///
    /// Must be called before the handle is shared.
    pub fn with_relative_path(self, path: impl Into<String>) -> Self {
        let inner = match Arc::try_unwrap(self.0) {
            Ok(inner) => inner,
            Err(shared) => ImageFileInner {
                name: shared.name.clone(),
                relative_path: shared.relative_path.clone(),
                mime: shared.mime.clone(),
                data: shared.data.clone(),
            },
        };
        Self(Arc::new(ImageFileInner {
            relative_path: Some(path.into()),
            ..inner
        }))
    }

    /// File name without directories.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Path relative to the dropped folder, if the file came from one.
    pub fn relative_path(&self) -> Option<&str> {
        self.0.relative_path.as_deref()
    }

    /// Declared MIME type.
    pub fn mime(&self) -> &str {
        &self.0.mime
    }

    /// Raw file contents.
    pub fn data(&self) -> &[u8] {
        &self.0.data
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.0.data.len()
    }

    /// Whether the declared MIME type is an image type.
    pub fn is_image(&self) -> bool {
        is_image_mime(&self.0.mime)
    }
}

impl PartialEq for ImageFile {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ImageFile {}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.0.name)
            .field("mime", &self.0.mime)
            .field("size", &self.0.data.len())
            .finish()
    }
}

/// Serialized without contents; the frontend only needs to list files.
impl Serialize for ImageFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ImageFile", 4)?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("relativePath", &self.relative_path())?;
        state.serialize_field("mime", self.mime())?;
        state.serialize_field("size", &self.size())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for_filename() {
        assert_eq!(mime_for_filename("a.jpg"), "image/jpeg");
        assert_eq!(mime_for_filename("b.PNG"), "image/png");
        assert_eq!(mime_for_filename("c.txt"), "text/plain");
        assert_eq!(mime_for_filename("no_extension"), FALLBACK_MIME);
    }

    #[test]
    fn test_is_image_mime() {
        assert!(is_image_mime("image/png"));
        assert!(is_image_mime("Image/JPEG"));
        assert!(!is_image_mime("text/plain"));
        assert!(!is_image_mime(""));
    }

    #[test]
    fn test_equality_is_identity() {
        let a = ImageFile::from_bytes("a.png", vec![1, 2, 3]);
        let b = ImageFile::from_bytes("a.png", vec![1, 2, 3]);
        assert_eq!(a, a.clone());
        assert_ne!(a, b, "same contents but different files");
    }

    #[test]
    fn test_relative_path() {
        let file = ImageFile::from_bytes("cat.jpg", vec![]).with_relative_path("pets/cat.jpg");
        assert_eq!(file.relative_path(), Some("pets/cat.jpg"));
        assert_eq!(file.name(), "cat.jpg");
        assert_eq!(file.mime(), "image/jpeg");
    }
}
