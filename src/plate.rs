//! Plate store: staging area for folder drops.
//!
//! The plate accumulates several folders before they are merged into one
//! classification batch. `flattened_images` is always the concatenation of the
//! folders' images in folder order and is rebuilt whenever the folder list
//! changes; it is never edited on its own.

use serde::Serialize;

use crate::geometry::Point;
use crate::model::ImageFile;
use crate::pipeline::filter_images;

/// One staged folder drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlateFolder {
    /// Folder name for display
    pub name: String,
    /// Images in their original order
    pub images: Vec<ImageFile>,
}

/// Staged folders plus the plate's on-screen state.
#[derive(Debug, Clone)]
pub struct PlateStore {
    folders: Vec<PlateFolder>,
    flattened_images: Vec<ImageFile>,
    origin: Point,
    position: Point,
    is_open: bool,
    is_hidden: bool,
}

impl PlateStore {
    /// Create an empty, closed plate anchored at `origin`.
    pub fn new(origin: Point) -> Self {
        Self {
            folders: Vec::new(),
            flattened_images: Vec::new(),
            origin,
            position: origin,
            is_open: false,
            is_hidden: false,
        }
    }

    /// Stage a folder drop.
    ///
    /// Non-image files are dropped. Returns `false` (and changes nothing) if
    /// no image remains.
    pub fn add_folder(&mut self, files: &[ImageFile]) -> bool {
        let images = filter_images(files);
        if images.is_empty() {
            log::debug!("Plate: ignoring folder drop with no images ({} files)", files.len());
            return false;
        }

        let name = folder_name(&images, self.folders.len() + 1);
        log::info!("📂 Plate: added folder '{}' with {} images", name, images.len());
        self.folders.push(PlateFolder { name, images });
        self.recompute_flattened();
        true
    }

    /// Remove all staged folders and snap the plate back to its origin.
    ///
    /// Open/closed visibility is left as is.
    pub fn clear(&mut self) {
        self.folders.clear();
        self.recompute_flattened();
        self.position = self.origin;
        log::debug!("Plate cleared");
    }

    /// Take the staged images and clear the plate.
    pub fn take_all(&mut self) -> Vec<ImageFile> {
        let images = std::mem::take(&mut self.flattened_images);
        self.clear();
        images
    }

    /// Show or hide the plate panel.
    pub fn toggle_open(&mut self) {
        self.is_open = !self.is_open;
        log::debug!("Plate open: {}", self.is_open);
    }

    /// Staged folders in drop order.
    pub fn folders(&self) -> &[PlateFolder] {
        &self.folders
    }

    /// All staged images, folder by folder.
    pub fn flattened_images(&self) -> &[ImageFile] {
        &self.flattened_images
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Current top-left position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Move the plate.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Snap back to the origin anchor.
    pub fn reset_position(&mut self) {
        self.position = self.origin;
    }

    /// Resting position.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Whether the plate panel is shown.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Whether the plate is faded out while a delayed merge runs.
    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.is_hidden = hidden;
    }

    /// Summary line, e.g. "2 folders, 1 image".
    pub fn summary(&self) -> String {
        let folders = self.folders.len();
        let images = self.flattened_images.len();
        format!(
            "{} folder{}, {} image{}",
            folders,
            if folders == 1 { "" } else { "s" },
            images,
            if images == 1 { "" } else { "s" }
        )
    }

    fn recompute_flattened(&mut self) {
        self.flattened_images = self
            .folders
            .iter()
            .flat_map(|f| f.images.iter().cloned())
            .collect();
    }
}

/// Name a folder after the first path component of its first image.
fn folder_name(images: &[ImageFile], index: usize) -> String {
    images
        .first()
        .and_then(|f| f.relative_path())
        .and_then(|p| p.split(['/', '\\']).find(|s| !s.is_empty()))
        .filter(|first| images[0].relative_path() != Some(*first))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Folder {}", index))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: Point = Point::new(10.0, 80.0);

    fn images(prefix: &str, n: usize) -> Vec<ImageFile> {
        (0..n)
            .map(|i| ImageFile::from_bytes(format!("{}{}.jpg", prefix, i), vec![]))
            .collect()
    }

    fn assert_flattened_invariant(plate: &PlateStore) {
        let expected: Vec<ImageFile> = plate
            .folders()
            .iter()
            .flat_map(|f| f.images.clone())
            .collect();
        assert_eq!(plate.flattened_images(), expected.as_slice());
    }

    #[test]
    fn test_add_folder_flattens_in_order() {
        let mut plate = PlateStore::new(ORIGIN);
        let first = images("a", 2);
        let second = images("b", 3);

        assert!(plate.add_folder(&first));
        assert!(plate.add_folder(&second));

        assert_eq!(plate.folders().len(), 2);
        let names: Vec<_> = plate.flattened_images().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a0.jpg", "a1.jpg", "b0.jpg", "b1.jpg", "b2.jpg"]);
        assert_flattened_invariant(&plate);
    }

    #[test]
    fn test_add_folder_filters_non_images() {
        let mut plate = PlateStore::new(ORIGIN);
        let mut files = images("a", 1);
        files.push(ImageFile::from_bytes("notes.txt", vec![]));

        assert!(plate.add_folder(&files));
        assert_eq!(plate.flattened_images().len(), 1);

        let only_text = vec![ImageFile::from_bytes("notes.txt", vec![])];
        assert!(!plate.add_folder(&only_text));
        assert_eq!(plate.folders().len(), 1);
        assert!(!plate.add_folder(&[]));
        assert_flattened_invariant(&plate);
    }

    #[test]
    fn test_clear_resets_position_keeps_open() {
        let mut plate = PlateStore::new(ORIGIN);
        plate.add_folder(&images("a", 2));
        plate.toggle_open();
        plate.set_position(Point::new(300.0, 300.0));

        plate.clear();

        assert!(plate.is_empty());
        assert!(plate.flattened_images().is_empty());
        assert_eq!(plate.position(), ORIGIN);
        assert!(plate.is_open());
    }

    #[test]
    fn test_invariant_over_mixed_operations() {
        let mut plate = PlateStore::new(ORIGIN);
        for round in 0..4 {
            plate.add_folder(&images("x", round + 1));
            plate.add_folder(&images("y", 2));
            assert_flattened_invariant(&plate);
            let sum: usize = plate.folders().iter().map(|f| f.images.len()).sum();
            assert_eq!(plate.flattened_images().len(), sum);
            if round % 2 == 1 {
                plate.clear();
                assert_flattened_invariant(&plate);
            }
        }
    }

    #[test]
    fn test_take_all() {
        let mut plate = PlateStore::new(ORIGIN);
        plate.add_folder(&images("a", 2));
        plate.add_folder(&images("b", 1));
        plate.set_position(Point::new(1.0, 1.0));

        let taken = plate.take_all();
        assert_eq!(taken.len(), 3);
        assert!(plate.is_empty());
        assert!(plate.flattened_images().is_empty());
        assert_eq!(plate.position(), ORIGIN);
    }

    #[test]
    fn test_toggle_open_keeps_data() {
        let mut plate = PlateStore::new(ORIGIN);
        plate.add_folder(&images("a", 2));
        plate.toggle_open();
        plate.toggle_open();
        assert!(!plate.is_open());
        assert_eq!(plate.flattened_images().len(), 2);
    }

    #[test]
    fn test_summary_pluralization() {
        let mut plate = PlateStore::new(ORIGIN);
        assert_eq!(plate.summary(), "0 folders, 0 images");
        plate.add_folder(&images("a", 1));
        assert_eq!(plate.summary(), "1 folder, 1 image");
        plate.add_folder(&images("b", 2));
        assert_eq!(plate.summary(), "2 folders, 3 images");
    }

    #[test]
    fn test_folder_names() {
        let mut plate = PlateStore::new(ORIGIN);
        let nested = vec![ImageFile::from_bytes("cat.jpg", vec![]).with_relative_path("pets/cat.jpg")];
        plate.add_folder(&nested);
        plate.add_folder(&images("loose", 1));

        assert_eq!(plate.folders()[0].name, "pets");
        assert_eq!(plate.folders()[1].name, "Folder 2");
    }
}
