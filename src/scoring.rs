//! Risk scoring boundary between the feature table and a trained classifier.
//!
//! The classifier only ever sees [`FEATURES`], in that order. Probabilities
//! are turned into a 0–100 risk score with one decimal.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::features::types::PortTimeSeriesRow;
use crate::features::utility::ratio;

/// Fixed training and scoring feature set.
pub const FEATURES: [&str; 4] = ["vessels", "mean_sog", "p10_sog", "anchored_ratio"];

pub type FeatureVector = [f64; 4];

/// Extracts the feature vector of one row, replacing non-finite values with 0.
pub fn feature_vector(row: &PortTimeSeriesRow) -> FeatureVector {
    [
        row.vessels as f64,
        row.mean_sog,
        row.p10_sog,
        row.anchored_ratio,
    ]
    .map(|v| if v.is_finite() { v } else { 0.0 })
}

pub fn feature_matrix(rows: &[PortTimeSeriesRow]) -> Vec<FeatureVector> {
    rows.iter().map(feature_vector).collect()
}

/// Converts a probability into a 0–100 score rounded to one decimal.
pub fn risk_score(probability: f64) -> f64 {
    (probability.clamp(0.0, 1.0) * 1000.0).round() / 10.0
}

/// A binary classifier returning the probability of the positive (congested) class.
pub trait Classifier {
    fn predict_proba(&self, features: &[FeatureVector]) -> Vec<f64>;
}

/// Logistic model over [`FEATURES`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub weights: FeatureVector,
    pub intercept: f64,
}

impl Classifier for LinearClassifier {
    fn predict_proba(&self, features: &[FeatureVector]) -> Vec<f64> {
        features
            .iter()
            .map(|x| {
                let z = self
                    .weights
                    .iter()
                    .zip(x)
                    .fold(self.intercept, |acc, (w, v)| acc + w * v);
                1.0 / (1.0 + (-z).exp())
            })
            .collect()
    }
}

/// Predicts the same probability for every row.
///
/// Used when the training labels contain a single class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantClassifier {
    pub probability: f64,
}

impl ConstantClassifier {
    /// Predicts the positive-label prevalence of `labels`.
    pub fn from_labels(labels: &[u8]) -> Self {
        let positives = labels.iter().filter(|&&l| l == 1).count();
        Self {
            probability: ratio(positives, labels.len()),
        }
    }
}

impl Classifier for ConstantClassifier {
    fn predict_proba(&self, features: &[FeatureVector]) -> Vec<f64> {
        vec![self.probability; features.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    Linear(LinearClassifier),
    Constant(ConstantClassifier),
}

impl Classifier for Model {
    fn predict_proba(&self, features: &[FeatureVector]) -> Vec<f64> {
        match self {
            Model::Linear(m) => m.predict_proba(features),
            Model::Constant(m) => m.predict_proba(features),
        }
    }
}

/// Persisted model together with the feature names it was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPayload {
    pub features: Vec<String>,
    pub model: Model,
}

impl ModelPayload {
    pub fn new(model: Model) -> Self {
        Self {
            features: FEATURES.iter().map(|f| f.to_string()).collect(),
            model,
        }
    }

    /// Loads a payload from JSON, rejecting models trained on other features.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let payload: ModelPayload = serde_json::from_str(&content)?;

        if payload.features != FEATURES {
            return Err(Error::FeatureMismatch {
                expected: FEATURES.iter().map(|f| f.to_string()).collect(),
                actual: payload.features,
            });
        }

        Ok(payload)
    }
}

/// Input contract of the external training procedure.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    pub x: Vec<FeatureVector>,
    pub y: Vec<u8>,
}

impl TrainingSet {
    pub fn from_rows(rows: &[PortTimeSeriesRow]) -> Self {
        Self {
            x: feature_matrix(rows),
            y: rows.iter().map(|r| r.risk_label).collect(),
        }
    }

    /// True when every label is the same, in which case a trained classifier
    /// should be replaced by [`ConstantClassifier`].
    pub fn is_single_class(&self) -> bool {
        self.y.windows(2).all(|w| w[0] == w[1])
    }

    pub fn positives(&self) -> usize {
        self.y.iter().filter(|&&l| l == 1).count()
    }

    pub fn fallback_classifier(&self) -> ConstantClassifier {
        ConstantClassifier::from_labels(&self.y)
    }
}
