//! Classifier inference over the scaled feature vector.
//!
//! The production implementation runs a pre-trained ONNX graph through ONNX
//! Runtime. Inference sits behind the [`Classifier`] trait so the request
//! pipeline can be exercised without a model artifact on disk.

use std::fmt;
use std::path::Path;
use std::sync::RwLock;

use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use tracing::info;

/// A binary edibility verdict, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Edible,
    Poisonous,
}

impl Verdict {
    /// Map a decoded class label to a verdict.
    ///
    /// The training data codes edible as `"e"`; every other label is
    /// treated as poisonous.
    pub fn from_label(label: &str) -> Self {
        if label == "e" {
            Verdict::Edible
        } else {
            Verdict::Poisonous
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Edible => write!(f, "Edible"),
            Verdict::Poisonous => write!(f, "Poisonous"),
        }
    }
}

/// Inference over a scaled feature vector, yielding a class index.
pub trait Classifier: Send + Sync {
    /// Predict the class index for one feature vector.
    fn predict(&self, features: &[f32]) -> Result<usize>;
}

/// ONNX-backed classifier.
///
/// sklearn-exported graphs produce an `int64` label tensor and a float
/// probability tensor; prediction reads the label output when present and
/// falls back to an argmax over probabilities.
pub struct OnnxClassifier {
    /// ONNX Runtime session. `run` needs `&mut`, hence the lock.
    session: RwLock<Session>,
    /// Input name for the feature tensor.
    input_name: String,
    /// Output carrying the predicted class index, if the graph has one.
    label_output: Option<String>,
    /// Output carrying per-class probabilities, if the graph has one.
    prob_output: Option<String>,
}

impl OnnxClassifier {
    /// Load the classifier graph from `path`.
    pub fn load<P: AsRef<Path>>(path: P, onnx_threads: usize) -> Result<Self> {
        let path = path.as_ref();

        ort::init().commit();
        info!(path = %path.display(), threads = onnx_threads, "Loading ONNX classifier");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| -> ort::Error { e.into() })?
            .with_intra_threads(onnx_threads)
            .map_err(|e| -> ort::Error { e.into() })?
            .commit_from_file(path)
            .context(format!("Failed to load classifier from {:?}", path))?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "float_input".to_string());

        let label_output = session
            .outputs()
            .iter()
            .find(|o| o.name().contains("label"))
            .map(|o| o.name().to_string());

        let prob_output = session
            .outputs()
            .iter()
            .find(|o| o.name().contains("prob") || o.name().contains("output"))
            .map(|o| o.name().to_string());

        info!(
            input = %input_name,
            label_output = ?label_output,
            prob_output = ?prob_output,
            "Classifier loaded"
        );

        Ok(Self {
            session: RwLock::new(session),
            input_name,
            label_output,
            prob_output,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &[f32]) -> Result<usize> {
        use ort::value::Tensor;

        let mut session = self
            .session
            .write()
            .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

        // Shape [1, num_features]: a single-row batch.
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .context("Failed to create input tensor")?;

        let outputs = session.run(ort::inputs![&self.input_name => input_tensor])?;

        // Preferred path: the graph's own label output.
        if let Some(name) = &self.label_output {
            if let Some(output) = outputs.get(name) {
                if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
                    if let Some(&index) = data.first() {
                        return Ok(index as usize);
                    }
                }
            }
        }

        // Fallback: argmax over the probability tensor.
        if let Some(name) = &self.prob_output {
            if let Some(output) = outputs.get(name) {
                if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
                    return argmax(data);
                }
            }
        }

        // Last resort: scan every output for something usable.
        for (_, output) in outputs.iter() {
            if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
                if let Some(&index) = data.first() {
                    return Ok(index as usize);
                }
            }
            if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
                return argmax(data);
            }
        }

        anyhow::bail!("No usable output tensor in classifier graph")
    }
}

/// Index of the largest probability in a single-row output.
fn argmax(data: &[f32]) -> Result<usize> {
    data.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(index, _)| index)
        .ok_or_else(|| anyhow::anyhow!("Empty probability tensor"))
}
