//! Feature extraction for mushroom edibility inference.
//!
//! Turns a submitted form (field name -> categorical code) into the scaled
//! numeric vector the classifier was trained on. The feature order is the
//! canonical [`FEATURE_NAMES`] sequence, never the iteration order of a map.

use std::collections::HashMap;

use crate::error::PredictError;
use crate::models::encoders::{CategoricalEncoder, FeatureScaler};

/// Canonical feature order, matching the column order of the training data.
///
/// The artifact bundle must list its encoders in exactly this order; the
/// loader rejects anything else.
pub const FEATURE_NAMES: [&str; 22] = [
    "cap-shape",
    "cap-surface",
    "cap-color",
    "bruises",
    "odor",
    "gill-attachment",
    "gill-spacing",
    "gill-size",
    "gill-color",
    "stalk-shape",
    "stalk-root",
    "stalk-surface-above-ring",
    "stalk-surface-below-ring",
    "stalk-color-above-ring",
    "stalk-color-below-ring",
    "veil-type",
    "veil-color",
    "ring-number",
    "ring-type",
    "spore-print-color",
    "population",
    "habitat",
];

/// Number of input features expected by the classifier.
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Feature extractor that transforms a form submission into model input.
///
/// Holds the per-feature categorical encoders (one per entry in
/// [`FEATURE_NAMES`], same order) and the scaler fit at training time.
pub struct FeatureExtractor {
    encoders: Vec<CategoricalEncoder>,
    scaler: FeatureScaler,
}

impl FeatureExtractor {
    /// Create an extractor from loaded encoders and scaler.
    ///
    /// The caller (the bundle loader) is responsible for having validated
    /// that `encoders` matches [`FEATURE_NAMES`] in length and order.
    pub fn new(encoders: Vec<CategoricalEncoder>, scaler: FeatureScaler) -> Self {
        Self { encoders, scaler }
    }

    /// Encode and scale one form submission.
    ///
    /// Every canonical field must be present and carry a value from its
    /// encoder's vocabulary; the first violation is returned as a
    /// [`PredictError`].
    pub fn extract(&self, fields: &HashMap<String, String>) -> Result<Vec<f32>, PredictError> {
        let mut codes = Vec::with_capacity(FEATURE_COUNT);

        for (encoder, &name) in self.encoders.iter().zip(FEATURE_NAMES.iter()) {
            let value = fields
                .get(name)
                .ok_or(PredictError::MissingField(name))?;

            let code = encoder
                .encode(value)
                .ok_or_else(|| PredictError::UnknownCategory {
                    field: name,
                    value: value.clone(),
                })?;

            codes.push(code as f32);
        }

        Ok(self.scaler.transform(&codes))
    }

    /// Number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// The vocabulary of the feature at `index` in canonical order.
    pub fn vocabulary(&self, index: usize) -> &[String] {
        self.encoders[index].classes()
    }
}
