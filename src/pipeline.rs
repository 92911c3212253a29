//! Classification pipeline.
//!
//! Classifies a batch of files one at a time and groups them by their
//! top-probability label. Files are processed strictly in input order, each
//! one fully decoded and classified before the next, so group membership
//! always follows the order the files were supplied in.
//!
//! A file that fails to decode or classify is logged and left out of every
//! group; the rest of the batch continues. The pipeline never touches outside
//! state: callers replace their previous groups with the returned mapping.

use crate::classifier::{Classifier, ClassifierSlot};
use crate::decoder::ImageDecoder;
use crate::error::ClassificationError;
use crate::model::{ClassifiedGroups, ImageFile, top_prediction};

/// Counts collected during a classification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassificationReport {
    /// Image files that were attempted
    pub accepted: usize,
    /// Non-image files that were skipped
    pub skipped: usize,
    /// Image files that failed to decode or classify
    pub failed: usize,
}

impl ClassificationReport {
    /// Number of files that ended up in a group.
    pub fn classified(&self) -> usize {
        self.accepted - self.failed
    }
}

/// Keep only files that declare an image MIME type, preserving order.
pub fn filter_images(files: &[ImageFile]) -> Vec<ImageFile> {
    files.iter().filter(|f| f.is_image()).cloned().collect()
}

/// Classify a batch and group it by predicted label.
///
/// Returns an empty mapping when the classifier is not loaded.
pub fn classify(
    files: &[ImageFile],
    decoder: &dyn ImageDecoder,
    slot: &ClassifierSlot,
) -> ClassifiedGroups {
    classify_with_report(files, decoder, slot).0
}

/// Like [`classify`], also returning per-run counts.
pub fn classify_with_report(
    files: &[ImageFile],
    decoder: &dyn ImageDecoder,
    slot: &ClassifierSlot,
) -> (ClassifiedGroups, ClassificationReport) {
    let Some(classifier) = slot.ready() else {
        log::warn!(
            "Classification requested while model is {}; ignoring {} files",
            slot.status().name(),
            files.len()
        );
        return (ClassifiedGroups::new(), ClassificationReport::default());
    };

    let mut groups = ClassifiedGroups::new();
    let mut report = ClassificationReport::default();

    log::info!("🔍 Classifying {} files", files.len());

    for file in files {
        if !file.is_image() {
            log::debug!("Skipping non-image '{}' ({})", file.name(), file.mime());
            report.skipped += 1;
            continue;
        }
        report.accepted += 1;

        match classify_one(file, decoder, classifier) {
            Ok(label) => {
                log::debug!("'{}' -> {}", file.name(), label);
                groups.push(&label, file.clone());
            }
            Err(e) => {
                log::warn!("Dropping '{}': {}", file.name(), e);
                report.failed += 1;
            }
        }
    }

    log::info!(
        "🔍 Classified {} of {} images into {} groups ({} skipped, {} failed)",
        report.classified(),
        report.accepted,
        groups.len(),
        report.skipped,
        report.failed
    );

    (groups, report)
}

/// Error from classifying a single file.
#[derive(Debug, thiserror::Error)]
enum FileError {
    #[error(transparent)]
    Decode(#[from] crate::error::DecodeError),
    #[error(transparent)]
    Classify(#[from] ClassificationError),
}

fn classify_one(
    file: &ImageFile,
    decoder: &dyn ImageDecoder,
    classifier: &dyn Classifier,
) -> Result<String, FileError> {
    let image = decoder.decode(file)?;
    let predictions = classifier.predict(&image)?;
    let top = top_prediction(&predictions).ok_or(ClassificationError::NoPredictions)?;
    Ok(top.label.clone())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::decoder::DecodedImage;
    use crate::error::{DecodeError, ModelLoadError};
    use crate::model::Prediction;
    use image::{DynamicImage, RgbImage};
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Decoder that returns a 1x1 bitmap, or fails for names containing "corrupt".
    #[derive(Default)]
    pub(crate) struct StubDecoder {
        calls: Rc<Cell<usize>>,
    }

    impl StubDecoder {
        /// Shared decode counter, readable after the decoder is boxed.
        pub(crate) fn call_counter(&self) -> Rc<Cell<usize>> {
            self.calls.clone()
        }
    }

    impl ImageDecoder for StubDecoder {
        fn decode(&self, file: &ImageFile) -> Result<DecodedImage, DecodeError> {
            self.calls.set(self.calls.get() + 1);
            if file.name().contains("corrupt") {
                return Err(DecodeError::NotAnImage {
                    name: file.name().to_string(),
                    mime: file.mime().to_string(),
                });
            }
            // Encode the file name in the pixel so the classifier can look it up
            let mut img = RgbImage::new(1, 1);
            let hash = file.name().bytes().fold(0u8, |a, b| a.wrapping_add(b));
            img.put_pixel(0, 0, image::Rgb([hash, 0, 0]));
            Ok(DynamicImage::ImageRgb8(img))
        }
    }

    /// Classifier that maps decoded images to labels by the red channel set by `StubDecoder`.
    pub(crate) struct StubClassifier {
        labels: Vec<String>,
        by_hash: HashMap<u8, &'static str>,
        calls: Rc<Cell<usize>>,
    }

    impl StubClassifier {
        pub(crate) fn new(assignments: &[(&str, &'static str)]) -> Self {
            let by_hash = assignments
                .iter()
                .map(|(name, label)| (name.bytes().fold(0u8, |a, b| a.wrapping_add(b)), *label))
                .collect::<HashMap<_, _>>();
            let mut labels: Vec<String> = assignments.iter().map(|(_, l)| l.to_string()).collect();
            labels.dedup();
            Self {
                labels,
                by_hash,
                calls: Rc::default(),
            }
        }

        /// Shared predict counter, readable after the classifier is boxed.
        pub(crate) fn call_counter(&self) -> Rc<Cell<usize>> {
            self.calls.clone()
        }
    }

    impl Classifier for StubClassifier {
        fn labels(&self) -> &[String] {
            &self.labels
        }

        fn predict(&self, image: &DecodedImage) -> Result<Vec<Prediction>, ClassificationError> {
            self.calls.set(self.calls.get() + 1);
            let hash = image.to_rgb8().get_pixel(0, 0)[0];
            match self.by_hash.get(&hash) {
                Some(label) => Ok(vec![
                    Prediction::new("other", 0.1),
                    Prediction::new(*label, 0.9),
                ]),
                None => Ok(Vec::new()),
            }
        }
    }

    fn loaded(classifier: StubClassifier) -> ClassifierSlot {
        ClassifierSlot::loaded(Box::new(classifier))
    }

    fn file(name: &str) -> ImageFile {
        ImageFile::from_bytes(name, vec![0u8; 4])
    }

    #[test]
    fn test_scenario_mixed_batch() {
        let slot = loaded(StubClassifier::new(&[("a.jpg", "cat"), ("b.png", "dog")]));
        let a = file("a.jpg");
        let b = file("b.png");
        let c = file("c.txt");

        let groups = classify(&[a.clone(), b.clone(), c.clone()], &StubDecoder::default(), &slot);

        assert_eq!(groups.labels().collect::<Vec<_>>(), vec!["cat", "dog"]);
        assert_eq!(groups.get("cat"), Some(&[a][..]));
        assert_eq!(groups.get("dog"), Some(&[b][..]));
        assert!(groups.iter().all(|g| !g.files.contains(&c)));
    }

    #[test]
    fn test_group_order_follows_input() {
        let slot = loaded(StubClassifier::new(&[
            ("1.jpg", "cat"),
            ("2.jpg", "dog"),
            ("3.jpg", "cat"),
            ("4.jpg", "cat"),
        ]));
        let files: Vec<_> = ["1.jpg", "2.jpg", "3.jpg", "4.jpg"].iter().map(|n| file(n)).collect();

        let groups = classify(&files, &StubDecoder::default(), &slot);
        let cats: Vec<_> = groups.get("cat").unwrap().iter().map(|f| f.name()).collect();
        assert_eq!(cats, vec!["1.jpg", "3.jpg", "4.jpg"]);
        assert_eq!(groups.total_files(), files.len());
    }

    #[test]
    fn test_idempotent() {
        let slot = loaded(StubClassifier::new(&[("x.jpg", "cat"), ("y.jpg", "dog"), ("z.jpg", "cat")]));
        let files: Vec<_> = ["x.jpg", "y.jpg", "z.jpg"].iter().map(|n| file(n)).collect();

        let first = classify(&files, &StubDecoder::default(), &slot);
        let second = classify(&files, &StubDecoder::default(), &slot);
        assert_eq!(first, second);
    }

    #[test]
    fn test_failures_are_dropped() {
        let slot = loaded(StubClassifier::new(&[("good.jpg", "cat")]));
        let files = vec![file("good.jpg"), file("corrupt.jpg"), file("unknown.jpg")];

        let (groups, report) = classify_with_report(&files, &StubDecoder::default(), &slot);

        assert_eq!(groups.total_files(), 1);
        assert_eq!(report.accepted, 3);
        assert_eq!(report.failed, 2, "decode failure and empty predictions");
        assert_eq!(report.classified(), 1);
        assert!(groups.total_files() <= files.len());
    }

    #[test]
    fn test_non_images_never_classified() {
        let classifier = StubClassifier::new(&[("a.jpg", "cat")]);
        let slot = loaded(classifier);
        let files = vec![
            ImageFile::new("a.jpg", "text/plain", vec![]),
            ImageFile::new("readme", "application/octet-stream", vec![]),
        ];

        let (groups, report) = classify_with_report(&files, &StubDecoder::default(), &slot);
        assert!(groups.is_empty());
        assert_eq!(report.skipped, 2);
        assert_eq!(report.accepted, 0);
    }

    #[test]
    fn test_not_ready_is_noop() {
        let decoder = StubDecoder::default();
        let decodes = decoder.call_counter();
        let mut slot = ClassifierSlot::new();
        assert!(classify(&[file("a.jpg")], &decoder, &slot).is_empty());

        let classifier = StubClassifier::new(&[("a.jpg", "cat")]);
        let predictions = classifier.call_counter();
        slot.resolve(Err(ModelLoadError::NoLabels));
        slot.resolve(Ok(Box::new(classifier)));
        assert!(classify(&[file("a.jpg")], &decoder, &slot).is_empty());

        assert_eq!(decodes.get(), 0, "nothing decoded without a model");
        assert_eq!(predictions.get(), 0);
    }

    #[test]
    fn test_each_image_decoded_and_classified_once() {
        let decoder = StubDecoder::default();
        let decodes = decoder.call_counter();
        let classifier = StubClassifier::new(&[("a.jpg", "cat"), ("b.png", "dog")]);
        let predictions = classifier.call_counter();
        let slot = loaded(classifier);

        classify(&[file("a.jpg"), file("notes.txt"), file("b.png")], &decoder, &slot);

        assert_eq!(decodes.get(), 2, "non-image skipped before decoding");
        assert_eq!(predictions.get(), 2);
    }

    #[test]
    fn test_filter_images() {
        let files = vec![file("a.jpg"), file("b.txt"), file("c.png")];
        let names: Vec<_> = filter_images(&files).iter().map(|f| f.name().to_string()).collect();
        assert_eq!(names, vec!["a.jpg", "c.png"]);
    }
}
