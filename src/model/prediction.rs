//! Classifier output.

use serde::{Deserialize, Serialize};

/// One (label, probability) pair returned by a classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Class name
    pub label: String,
    /// Probability in `[0, 1]`
    pub probability: f32,
}

impl Prediction {
    /// Create a new prediction.
    pub fn new(label: impl Into<String>, probability: f32) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// Select the prediction with the highest probability.
///
/// Ties keep the first entry in the classifier's order. NaN never wins.
pub fn top_prediction(predictions: &[Prediction]) -> Option<&Prediction> {
    predictions.iter().fold(None, |best, candidate| match best {
        None if candidate.probability.is_nan() => None,
        None => Some(candidate),
        Some(current) if candidate.probability > current.probability => Some(candidate),
        Some(current) => Some(current),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_prediction_picks_max() {
        let preds = vec![
            Prediction::new("cat", 0.2),
            Prediction::new("dog", 0.7),
            Prediction::new("bird", 0.1),
        ];
        assert_eq!(top_prediction(&preds).map(|p| p.label.as_str()), Some("dog"));
    }

    #[test]
    fn test_top_prediction_tie_keeps_first() {
        let preds = vec![
            Prediction::new("cat", 0.5),
            Prediction::new("dog", 0.5),
        ];
        assert_eq!(top_prediction(&preds).map(|p| p.label.as_str()), Some("cat"));
    }

    #[test]
    fn test_top_prediction_empty() {
        assert!(top_prediction(&[]).is_none());
    }

    #[test]
    fn test_top_prediction_skips_nan() {
        let preds = vec![
            Prediction::new("broken", f32::NAN),
            Prediction::new("cat", 0.1),
        ];
        assert_eq!(top_prediction(&preds).map(|p| p.label.as_str()), Some("cat"));
    }
}
