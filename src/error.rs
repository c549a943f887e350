//! Request-level error taxonomy.
//!
//! Prediction failures are a closed set: a required form field was absent,
//! a submitted value falls outside its encoder's vocabulary, or the
//! classifier itself failed. Each variant carries a stable, distinct message
//! that is returned to the client verbatim.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors a single prediction request can produce.
///
/// Input errors (`MissingField`, `UnknownCategory`) map to 400; anything
/// going wrong past validation maps to 500. The process keeps serving in
/// either case.
#[derive(thiserror::Error, Debug)]
pub enum PredictError {
    /// A required form field was not submitted.
    #[error("missing form field: {0}")]
    MissingField(&'static str),

    /// A submitted value is not in the feature's vocabulary.
    #[error("unknown value {value:?} for field {field}")]
    UnknownCategory {
        /// Canonical name of the offending field.
        field: &'static str,
        /// The value as submitted.
        value: String,
    },

    /// Classifier inference or label decoding failed.
    #[error("inference failed: {0}")]
    Inference(String),
}

impl PredictError {
    /// Stable machine-readable code for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::MissingField(_) => "missing-field",
            PredictError::UnknownCategory { .. } => "unknown-category",
            PredictError::Inference(_) => "inference-failure",
        }
    }

    /// Whether the caller supplied bad input (as opposed to a server fault).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PredictError::MissingField(_) | PredictError::UnknownCategory { .. }
        )
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = if self.is_input_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, self.to_string()).into_response()
    }
}
