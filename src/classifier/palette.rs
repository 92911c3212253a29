//! Lightweight built-in classifier based on average image colour.
//!
//! Each class has a reference RGB colour. An image is downscaled to the model
//! input size, its mean colour is measured, and the class probabilities are a
//! softmax over the negative distances to each reference colour. It is small
//! enough to ship with the native binary and deterministic enough for tests.

use image::imageops::FilterType;
use serde::Deserialize;

use super::{Classifier, ModelMetadata};
use crate::decoder::DecodedImage;
use crate::error::{ClassificationError, ModelLoadError};
use crate::model::Prediction;

/// Softmax temperature applied to normalized colour distances.
const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Upper bound for the side of the square images are sampled at.
const MAX_IMAGE_SIZE: u32 = 1024;

/// Largest possible RGB distance, `sqrt(3) * 255`.
const MAX_DISTANCE: f32 = 441.672_96;

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

/// Model weights file for the palette classifier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaletteModel {
    /// One reference colour per label, aligned with the metadata labels
    pub colors: Vec<[u8; 3]>,

    /// Softmax temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl PaletteModel {
    /// Parse model JSON fetched from `url`.
    pub fn from_json(url: &str, json: &str) -> Result<Self, ModelLoadError> {
        serde_json::from_str(json).map_err(|source| ModelLoadError::Parse {
            url: url.to_string(),
            source,
        })
    }
}

/// Classifies images by their average colour.
#[derive(Debug, Clone)]
pub struct PaletteClassifier {
    labels: Vec<String>,
    colors: Vec<[f32; 3]>,
    image_size: u32,
    temperature: f32,
}

impl PaletteClassifier {
    /// Combine metadata and model weights.
    pub fn new(metadata: ModelMetadata, model: PaletteModel) -> Result<Self, ModelLoadError> {
        if metadata.labels.is_empty() {
            return Err(ModelLoadError::NoLabels);
        }
        if metadata.labels.len() != model.colors.len() {
            return Err(ModelLoadError::LabelMismatch {
                labels: metadata.labels.len(),
                classes: model.colors.len(),
            });
        }

        let colors = model
            .colors
            .iter()
            .map(|c| [f32::from(c[0]), f32::from(c[1]), f32::from(c[2])])
            .collect();

        let temperature = if model.temperature > 0.0 {
            model.temperature
        } else {
            DEFAULT_TEMPERATURE
        };

        if metadata.image_size > MAX_IMAGE_SIZE {
            log::warn!(
                "Model image size {} too large, sampling at {}",
                metadata.image_size,
                MAX_IMAGE_SIZE
            );
        }

        Ok(Self {
            labels: metadata.labels,
            colors,
            image_size: metadata.image_size.clamp(1, MAX_IMAGE_SIZE),
            temperature,
        })
    }

    fn mean_color(&self, image: &DecodedImage) -> Result<[f32; 3], ClassificationError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ClassificationError::EmptyImage);
        }

        let rgb = image
            .resize(self.image_size, self.image_size, FilterType::Triangle)
            .to_rgb8();

        let pixel_count = (rgb.width() as usize) * (rgb.height() as usize);
        if pixel_count == 0 {
            return Err(ClassificationError::EmptyImage);
        }

        let mut sum = [0u64; 3];
        for pixel in rgb.pixels() {
            sum[0] += u64::from(pixel[0]);
            sum[1] += u64::from(pixel[1]);
            sum[2] += u64::from(pixel[2]);
        }

        let n = pixel_count as f32;
        Ok([sum[0] as f32 / n, sum[1] as f32 / n, sum[2] as f32 / n])
    }
}

impl Classifier for PaletteClassifier {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn predict(&self, image: &DecodedImage) -> Result<Vec<Prediction>, ClassificationError> {
        let mean = self.mean_color(image)?;

        let logits: Vec<f32> = self
            .colors
            .iter()
            .map(|c| {
                let d = ((mean[0] - c[0]).powi(2) + (mean[1] - c[1]).powi(2) + (mean[2] - c[2]).powi(2))
                    .sqrt();
                -(d / MAX_DISTANCE) / self.temperature
            })
            .collect();

        // Softmax
        let max_logit = logits.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        let exp_sum: f32 = logits.iter().map(|&x| (x - max_logit).exp()).sum();
        if !exp_sum.is_finite() || exp_sum <= 0.0 {
            return Err(ClassificationError::Inference(format!(
                "invalid softmax normalizer {}",
                exp_sum
            )));
        }

        Ok(self
            .labels
            .iter()
            .zip(&logits)
            .map(|(label, &x)| Prediction::new(label.clone(), (x - max_logit).exp() / exp_sum))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::top_prediction;
    use image::{DynamicImage, Rgb, RgbImage};

    fn classifier() -> PaletteClassifier {
        let metadata = ModelMetadata::from_json("m", r#"{"labels": ["red", "green", "blue"], "imageSize": 8}"#)
            .unwrap();
        let model = PaletteModel::from_json(
            "w",
            r#"{"colors": [[255, 0, 0], [0, 255, 0], [0, 0, 255]]}"#,
        )
        .unwrap();
        PaletteClassifier::new(metadata, model).unwrap()
    }

    fn solid(color: [u8; 3]) -> DecodedImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb(color)))
    }

    #[test]
    fn test_predicts_nearest_colour() {
        let c = classifier();
        let preds = c.predict(&solid([240, 20, 10])).unwrap();
        assert_eq!(top_prediction(&preds).unwrap().label, "red");

        let preds = c.predict(&solid([10, 30, 250])).unwrap();
        assert_eq!(top_prediction(&preds).unwrap().label, "blue");
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let preds = classifier().predict(&solid([100, 150, 50])).unwrap();
        assert_eq!(preds.len(), 3);
        let sum: f32 = preds.iter().map(|p| p.probability).sum();
        assert!((sum - 1.0).abs() < 1e-4, "sum was {}", sum);
        assert!(preds.iter().all(|p| (0.0..=1.0).contains(&p.probability)));
    }

    #[test]
    fn test_predictions_follow_label_order() {
        let preds = classifier().predict(&solid([0, 0, 0])).unwrap();
        let labels: Vec<_> = preds.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["red", "green", "blue"]);
    }

    #[test]
    fn test_empty_image() {
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            classifier().predict(&empty),
            Err(ClassificationError::EmptyImage)
        ));
    }

    #[test]
    fn test_image_size_is_bounded() {
        let model = || PaletteModel::from_json("w", r#"{"colors": [[255, 0, 0]]}"#).unwrap();

        let huge = ModelMetadata::from_json("m", r#"{"labels": ["red"], "imageSize": 4000000000}"#)
            .unwrap();
        let c = PaletteClassifier::new(huge, model()).unwrap();
        assert_eq!(c.image_size, MAX_IMAGE_SIZE);
        let preds = c.predict(&solid([250, 0, 0])).unwrap();
        assert_eq!(preds[0].label, "red");

        let zero = ModelMetadata::from_json("m", r#"{"labels": ["red"], "imageSize": 0}"#).unwrap();
        assert_eq!(PaletteClassifier::new(zero, model()).unwrap().image_size, 1);
    }

    #[test]
    fn test_label_mismatch() {
        let metadata = ModelMetadata::from_json("m", r#"{"labels": ["a", "b"]}"#).unwrap();
        let model = PaletteModel::from_json("w", r#"{"colors": [[0, 0, 0]]}"#).unwrap();
        assert!(matches!(
            PaletteClassifier::new(metadata, model),
            Err(ModelLoadError::LabelMismatch { labels: 2, classes: 1 })
        ));
    }
}
