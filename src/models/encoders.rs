//! Encoder and scaler types deserialized from the artifact bundle.
//!
//! These mirror the preprocessing objects fit at training time: one
//! categorical encoder per input feature, one label encoder for the class,
//! and one standardizing scaler over the encoded vector.

use serde::Deserialize;

/// Closed string-to-integer vocabulary for one categorical feature.
///
/// A value's code is its position in `classes`; values outside the
/// vocabulary do not encode.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoricalEncoder {
    /// Canonical feature name this encoder belongs to.
    pub name: String,
    /// Vocabulary in training order.
    pub classes: Vec<String>,
}

impl CategoricalEncoder {
    /// Create an encoder from a name and vocabulary.
    pub fn new(name: &str, classes: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            classes,
        }
    }

    /// Encode a categorical value, or `None` if it is outside the vocabulary.
    pub fn encode(&self, value: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == value)
    }

    /// The vocabulary in training order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Vocabulary size.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the vocabulary is empty (an invalid artifact).
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Mapping between classifier output indices and outcome category strings.
#[derive(Debug, Clone)]
pub struct ClassLabels {
    classes: Vec<String>,
}

impl ClassLabels {
    /// Create a label encoder from the outcome categories in training order.
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    /// Decode a class index into its category string.
    pub fn decode(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    /// Number of outcome categories.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no categories are present.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Standardizing transform fit at training time: `(x - mean) / scale`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureScaler {
    mean: Vec<f32>,
    scale: Vec<f32>,
}

impl FeatureScaler {
    /// Create a scaler from per-feature means and scale factors.
    pub fn new(mean: Vec<f32>, scale: Vec<f32>) -> Self {
        Self { mean, scale }
    }

    /// The no-op scaler (zero mean, unit scale) over `len` features.
    pub fn identity(len: usize) -> Self {
        Self {
            mean: vec![0.0; len],
            scale: vec![1.0; len],
        }
    }

    /// Apply the transform to an encoded feature vector.
    pub fn transform(&self, features: &[f32]) -> Vec<f32> {
        features
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(&x, (&mean, &scale))| (x - mean) / scale)
            .collect()
    }

    /// Number of features the scaler was fit on.
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    /// Whether the scaler covers no features.
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// The per-feature scale factors.
    pub fn scale_factors(&self) -> &[f32] {
        &self.scale
    }

    /// Whether mean and scale arities agree.
    pub fn is_consistent(&self) -> bool {
        self.mean.len() == self.scale.len()
    }
}
