//! Model artifact types: encoders, classifier, and the loaded bundle.

pub mod classifier;
pub mod encoders;
pub mod loader;

pub use classifier::{Classifier, OnnxClassifier, Verdict};
pub use encoders::{CategoricalEncoder, ClassLabels, FeatureScaler};
pub use loader::{BundleLoader, ModelBundle};
