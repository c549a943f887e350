//! HTTP surface: application state, router, and request handlers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::response::{Html, Redirect};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use tracing::{error, info, warn};

use crate::error::PredictError;
use crate::features::FEATURE_NAMES;
use crate::metrics::ServiceMetrics;
use crate::models::ModelBundle;
use crate::pages;

/// Shared application state: the immutable model bundle plus metrics.
///
/// Initialized once at startup and never mutated; every handler reads it
/// through an `Arc`.
pub struct AppState {
    pub bundle: ModelBundle,
    pub metrics: Arc<ServiceMetrics>,
}

/// Build the axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/predict", post(predict).get(predict_redirect))
        .route("/health", get(health))
        .with_state(state)
}

/// `GET /` — render the attribute form.
pub async fn home(State(state): State<Arc<AppState>>) -> Html<String> {
    info!("Home page accessed");
    Html(pages::form_page(&state.bundle))
}

/// `GET /predict` — redisplay the form rather than predicting.
pub async fn predict_redirect() -> Redirect {
    Redirect::to("/")
}

/// `POST /predict` — run the prediction pipeline on the submitted form.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Html<String>, PredictError> {
    let start = Instant::now();

    let received: Vec<&str> = FEATURE_NAMES
        .iter()
        .map(|&name| fields.get(name).map(String::as_str).unwrap_or("<missing>"))
        .collect();
    info!(features = ?received, "Received feature set");

    match state.bundle.predict(&fields) {
        Ok(verdict) => {
            state.metrics.record_prediction(verdict, start.elapsed());
            info!(
                verdict = %verdict,
                handling_us = start.elapsed().as_micros() as u64,
                "Prediction served"
            );
            Ok(Html(pages::result_page(verdict)))
        }
        Err(e) => {
            state.metrics.record_error(&e);
            if e.is_input_error() {
                warn!(kind = e.kind(), error = %e, "Prediction rejected");
            } else {
                error!(kind = e.kind(), error = %e, "Prediction failed");
            }
            Err(e)
        }
    }
}

/// `GET /health` — readiness probe reporting the loaded bundle's shape.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "features": state.bundle.extractor.feature_count(),
        "classes": state.bundle.labels.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureExtractor, FEATURE_COUNT};
    use crate::models::encoders::{CategoricalEncoder, ClassLabels, FeatureScaler};
    use crate::models::Classifier;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;

    /// The worked example from the training data's documentation.
    const EXAMPLE: [(&str, &str); 22] = [
        ("cap-shape", "x"),
        ("cap-surface", "s"),
        ("cap-color", "n"),
        ("bruises", "t"),
        ("odor", "p"),
        ("gill-attachment", "f"),
        ("gill-spacing", "c"),
        ("gill-size", "n"),
        ("gill-color", "k"),
        ("stalk-shape", "e"),
        ("stalk-root", "e"),
        ("stalk-surface-above-ring", "s"),
        ("stalk-surface-below-ring", "s"),
        ("stalk-color-above-ring", "w"),
        ("stalk-color-below-ring", "w"),
        ("veil-type", "p"),
        ("veil-color", "w"),
        ("ring-number", "o"),
        ("ring-type", "p"),
        ("spore-print-color", "k"),
        ("population", "s"),
        ("habitat", "u"),
    ];

    /// Deterministic classifier returning a fixed class index.
    struct StubClassifier {
        class_index: usize,
    }

    impl Classifier for StubClassifier {
        fn predict(&self, _features: &[f32]) -> anyhow::Result<usize> {
            Ok(self.class_index)
        }
    }

    /// Classifier that always fails, for the inference error path.
    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn predict(&self, _features: &[f32]) -> anyhow::Result<usize> {
            anyhow::bail!("synthetic failure")
        }
    }

    fn test_bundle(classifier: Box<dyn Classifier>) -> ModelBundle {
        let vocab: Vec<String> = ["c", "e", "f", "k", "n", "o", "p", "s", "t", "u", "w", "x"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let encoders = FEATURE_NAMES
            .iter()
            .map(|name| CategoricalEncoder::new(name, vocab.clone()))
            .collect();

        ModelBundle::new(
            FeatureExtractor::new(encoders, FeatureScaler::identity(FEATURE_COUNT)),
            ClassLabels::new(vec!["e".to_string(), "p".to_string()]),
            classifier,
        )
    }

    fn test_state(classifier: Box<dyn Classifier>) -> Arc<AppState> {
        Arc::new(AppState {
            bundle: test_bundle(classifier),
            metrics: Arc::new(ServiceMetrics::new()),
        })
    }

    fn test_app(class_index: usize) -> Router {
        build_router(test_state(Box::new(StubClassifier { class_index })))
    }

    fn form_body(pairs: &[(&str, &str)]) -> String {
        pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn predict_request(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn home_lists_every_feature() {
        let app = test_app(0);
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        for name in FEATURE_NAMES {
            assert!(body.contains(&format!("name=\"{name}\"")), "form misses {name}");
        }
    }

    #[tokio::test]
    async fn valid_submission_yields_edible() {
        let app = test_app(0);
        let response = app
            .oneshot(predict_request(form_body(&EXAMPLE)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("Edible"));
        assert!(!body.contains("Poisonous"));
    }

    #[tokio::test]
    async fn valid_submission_yields_poisonous() {
        let app = test_app(1);
        let response = app
            .oneshot(predict_request(form_body(&EXAMPLE)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("Poisonous"));
        assert!(!body.contains("Edible"));
    }

    #[tokio::test]
    async fn identical_submissions_yield_identical_results() {
        let app = test_app(1);

        let first = app
            .clone()
            .oneshot(predict_request(form_body(&EXAMPLE)))
            .await
            .unwrap();
        let second = app
            .oneshot(predict_request(form_body(&EXAMPLE)))
            .await
            .unwrap();

        assert_eq!(body_string(first).await, body_string(second).await);
    }

    #[tokio::test]
    async fn missing_field_is_a_bad_request() {
        let app = test_app(0);
        let partial: Vec<(&str, &str)> = EXAMPLE
            .iter()
            .copied()
            .filter(|(name, _)| *name != "odor")
            .collect();

        let response = app
            .oneshot(predict_request(form_body(&partial)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_string(response).await;
        assert_eq!(body, "missing form field: odor");
    }

    #[tokio::test]
    async fn unknown_value_is_rejected_and_service_keeps_serving() {
        let app = test_app(0);

        let mut bad: Vec<(&str, &str)> = EXAMPLE.to_vec();
        bad[21] = ("habitat", "zz");

        let response = app
            .clone()
            .oneshot(predict_request(form_body(&bad)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_string(response).await,
            "unknown value \"zz\" for field habitat"
        );

        // A subsequent valid request still succeeds.
        let response = app
            .oneshot(predict_request(form_body(&EXAMPLE)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn inference_failure_is_a_server_error() {
        let app = build_router(test_state(Box::new(FailingClassifier)));

        let response = app
            .oneshot(predict_request(form_body(&EXAMPLE)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_string(response).await;
        assert!(body.contains("inference failed"));
    }

    #[tokio::test]
    async fn get_predict_redisplays_the_form() {
        let app = test_app(0);
        let req = Request::builder()
            .uri("/predict")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn unsupported_method_is_rejected() {
        let app = test_app(0);
        let req = Request::builder()
            .method("DELETE")
            .uri("/predict")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn health_reports_bundle_shape() {
        let app = test_app(0);
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["features"], 22);
        assert_eq!(json["classes"], 2);
    }

    #[tokio::test]
    async fn metrics_track_predictions_and_errors() {
        let state = test_state(Box::new(StubClassifier { class_index: 1 }));
        let app = build_router(state.clone());

        let _ = app
            .clone()
            .oneshot(predict_request(form_body(&EXAMPLE)))
            .await
            .unwrap();

        let mut bad: Vec<(&str, &str)> = EXAMPLE.to_vec();
        bad[0] = ("cap-shape", "zz");
        let _ = app.oneshot(predict_request(form_body(&bad))).await.unwrap();

        assert_eq!(state.metrics.requests_served.load(Ordering::Relaxed), 2);
        assert_eq!(
            state.metrics.predictions_poisonous.load(Ordering::Relaxed),
            1
        );
        assert_eq!(state.metrics.input_errors.load(Ordering::Relaxed), 1);
    }
}
