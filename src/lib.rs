//! Mushroom Classification Service Library
//!
//! Serves edibility predictions from a pre-trained mushroom classifier via
//! a small web form: 22 categorical attributes in, "Edible" or "Poisonous"
//! out. The classifier, per-feature encoders, class-label encoder, and
//! scaler are loaded once at startup from an externally produced artifact
//! bundle and shared read-only across requests.

pub mod config;
pub mod error;
pub mod features;
pub mod metrics;
pub mod models;
pub mod pages;
pub mod server;

pub use config::AppConfig;
pub use error::PredictError;
pub use features::{FeatureExtractor, FEATURE_NAMES};
pub use models::{ModelBundle, Verdict};
pub use server::{build_router, AppState};
