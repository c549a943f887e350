//! Request metrics and statistics tracking for the classification service.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

use crate::error::PredictError;
use crate::models::Verdict;

/// Metrics collector for the prediction endpoint.
pub struct ServiceMetrics {
    /// Total prediction requests handled (success or failure)
    pub requests_served: AtomicU64,
    /// Predictions that came back edible
    pub predictions_edible: AtomicU64,
    /// Predictions that came back poisonous
    pub predictions_poisonous: AtomicU64,
    /// Requests rejected for bad input (missing field, unknown value)
    pub input_errors: AtomicU64,
    /// Requests that failed inside inference or decoding
    pub inference_errors: AtomicU64,
    /// Handling times (in microseconds)
    handling_times: RwLock<Vec<u64>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ServiceMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            requests_served: AtomicU64::new(0),
            predictions_edible: AtomicU64::new(0),
            predictions_poisonous: AtomicU64::new(0),
            input_errors: AtomicU64::new(0),
            inference_errors: AtomicU64::new(0),
            handling_times: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction.
    pub fn record_prediction(&self, verdict: Verdict, handling_time: Duration) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);

        match verdict {
            Verdict::Edible => self.predictions_edible.fetch_add(1, Ordering::Relaxed),
            Verdict::Poisonous => self.predictions_poisonous.fetch_add(1, Ordering::Relaxed),
        };

        if let Ok(mut times) = self.handling_times.write() {
            times.push(handling_time.as_micros() as u64);
            // Keep only the most recent window for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }
    }

    /// Record a failed prediction request.
    pub fn record_error(&self, error: &PredictError) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);

        if error.is_input_error() {
            self.input_errors.fetch_add(1, Ordering::Relaxed);
        } else {
            self.inference_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get handling time statistics.
    pub fn get_handling_stats(&self) -> HandlingStats {
        let times = self.handling_times.read().unwrap();
        if times.is_empty() {
            return HandlingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        HandlingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (requests per second).
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.requests_served.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Log summary statistics.
    pub fn print_summary(&self) {
        let requests = self.requests_served.load(Ordering::Relaxed);
        let edible = self.predictions_edible.load(Ordering::Relaxed);
        let poisonous = self.predictions_poisonous.load(Ordering::Relaxed);
        let input_errors = self.input_errors.load(Ordering::Relaxed);
        let inference_errors = self.inference_errors.load(Ordering::Relaxed);
        let handling = self.get_handling_stats();

        info!(
            requests,
            edible,
            poisonous,
            input_errors,
            inference_errors,
            throughput = format!("{:.1} req/s", self.get_throughput()),
            "Service metrics summary"
        );
        info!(
            mean_us = handling.mean_us,
            p50_us = handling.p50_us,
            p95_us = handling.p95_us,
            p99_us = handling.p99_us,
            max_us = handling.max_us,
            "Prediction handling time (μs)"
        );
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Handling time statistics.
#[derive(Debug, Default)]
pub struct HandlingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic reporter that logs metric summaries.
pub struct MetricsReporter {
    metrics: Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task.
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_recording() {
        let metrics = ServiceMetrics::new();

        metrics.record_prediction(Verdict::Edible, Duration::from_micros(100));
        metrics.record_prediction(Verdict::Poisonous, Duration::from_micros(200));
        metrics.record_prediction(Verdict::Poisonous, Duration::from_micros(300));

        assert_eq!(metrics.requests_served.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.predictions_edible.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.predictions_poisonous.load(Ordering::Relaxed), 2);

        let stats = metrics.get_handling_stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean_us, 200);
        assert_eq!(stats.max_us, 300);
    }

    #[test]
    fn test_error_recording() {
        let metrics = ServiceMetrics::new();

        metrics.record_error(&PredictError::MissingField("odor"));
        metrics.record_error(&PredictError::Inference("boom".to_string()));

        assert_eq!(metrics.requests_served.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.input_errors.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.inference_errors.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_empty_stats() {
        let metrics = ServiceMetrics::new();
        let stats = metrics.get_handling_stats();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.p99_us, 0);
    }
}
