//! Artifact bundle loading.
//!
//! The bundle is a JSON manifest produced by the training pipeline, holding
//! the per-feature encoder vocabularies, the class labels, the scaler
//! parameters, and the file name of the serialized classifier graph
//! (resolved relative to the manifest). Any inconsistency is fatal at
//! startup; the service never runs with a partially loaded bundle.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::config::ArtifactConfig;
use crate::error::PredictError;
use crate::features::{FeatureExtractor, FEATURE_COUNT, FEATURE_NAMES};
use crate::models::classifier::{Classifier, OnnxClassifier, Verdict};
use crate::models::encoders::{CategoricalEncoder, ClassLabels, FeatureScaler};

/// Manifest schema version this build understands.
pub const SCHEMA_VERSION: u32 = 1;

/// On-disk shape of the bundle manifest.
#[derive(Debug, Deserialize)]
struct BundleManifest {
    schema_version: u32,
    /// Encoders in canonical feature order.
    features: Vec<CategoricalEncoder>,
    /// Outcome categories in training order.
    class_labels: Vec<String>,
    scaler: FeatureScaler,
    /// Classifier graph file, relative to the manifest.
    model_file: String,
}

/// The loaded model bundle: encoders, scaler, label encoder, classifier.
///
/// Immutable for the process lifetime and shared read-only across requests.
pub struct ModelBundle {
    /// Encoders plus scaler, applied in canonical feature order.
    pub extractor: FeatureExtractor,
    /// Maps classifier output indices back to category strings.
    pub labels: ClassLabels,
    /// The classifier itself.
    pub classifier: Box<dyn Classifier>,
}

impl std::fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle").finish_non_exhaustive()
    }
}

impl ModelBundle {
    /// Load the bundle described by `config`.
    pub fn load(config: &ArtifactConfig) -> Result<Self> {
        BundleLoader::with_threads(config.onnx_threads).load(&config.bundle_path)
    }

    /// Assemble a bundle from already-built parts.
    pub fn new(
        extractor: FeatureExtractor,
        labels: ClassLabels,
        classifier: Box<dyn Classifier>,
    ) -> Self {
        Self {
            extractor,
            labels,
            classifier,
        }
    }

    /// Run the full prediction pipeline on one form submission:
    /// encode, scale, classify, decode.
    pub fn predict(&self, fields: &HashMap<String, String>) -> Result<Verdict, PredictError> {
        let features = self.extractor.extract(fields)?;

        let class_index = self
            .classifier
            .predict(&features)
            .map_err(|e| PredictError::Inference(e.to_string()))?;

        let label = self
            .labels
            .decode(class_index)
            .ok_or_else(|| {
                PredictError::Inference(format!("class index {class_index} out of range"))
            })?;

        Ok(Verdict::from_label(label))
    }
}

/// Loader for the artifact bundle.
pub struct BundleLoader {
    /// Number of intra-op threads for ONNX inference.
    onnx_threads: usize,
}

impl BundleLoader {
    /// Create a loader with default settings (1 thread).
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    /// Create a loader with the given ONNX thread count.
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self { onnx_threads }
    }

    /// Load and validate the bundle at `path`.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<ModelBundle> {
        let path = path.as_ref();

        info!(path = %path.display(), "Loading model bundle");

        let raw = fs::read_to_string(path)
            .context(format!("Failed to read bundle manifest {:?}", path))?;
        let manifest: BundleManifest = serde_json::from_str(&raw)
            .context(format!("Failed to parse bundle manifest {:?}", path))?;

        validate_manifest(&manifest)?;

        let model_path = path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&manifest.model_file);
        let classifier = OnnxClassifier::load(&model_path, self.onnx_threads)?;

        let bundle = ModelBundle::new(
            FeatureExtractor::new(manifest.features, manifest.scaler),
            ClassLabels::new(manifest.class_labels),
            Box::new(classifier),
        );

        info!(
            features = bundle.extractor.feature_count(),
            classes = bundle.labels.len(),
            "Model bundle loaded successfully"
        );

        Ok(bundle)
    }
}

impl Default for BundleLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject manifests that do not match what this build was written against.
fn validate_manifest(manifest: &BundleManifest) -> Result<()> {
    if manifest.schema_version != SCHEMA_VERSION {
        bail!(
            "Unsupported bundle schema version {} (expected {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }

    if manifest.features.len() != FEATURE_COUNT {
        bail!(
            "Bundle has {} feature encoders, expected {}",
            manifest.features.len(),
            FEATURE_COUNT
        );
    }

    for (encoder, &expected) in manifest.features.iter().zip(FEATURE_NAMES.iter()) {
        if encoder.name != expected {
            bail!(
                "Bundle feature order mismatch: found {:?} where {:?} was expected",
                encoder.name,
                expected
            );
        }
        if encoder.is_empty() {
            bail!("Empty vocabulary for feature {:?}", encoder.name);
        }
    }

    if manifest.class_labels.len() != 2 {
        bail!(
            "Bundle has {} class labels, expected 2",
            manifest.class_labels.len()
        );
    }

    if !manifest.scaler.is_consistent() || manifest.scaler.len() != FEATURE_COUNT {
        bail!(
            "Scaler covers {} features, expected {}",
            manifest.scaler.len(),
            FEATURE_COUNT
        );
    }

    if manifest.scaler.scale_factors().iter().any(|&s| s == 0.0) {
        bail!("Scaler has a zero scale factor");
    }

    Ok(())
}
