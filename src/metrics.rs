//! Performance metrics and statistics tracking for the prediction service.

use crate::service::PipelineStage;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Latency samples kept for percentile calculation
const LATENCY_WINDOW: usize = 10_000;

/// Metrics collector for request outcomes
pub struct ServiceMetrics {
    requests: AtomicU64,
    predictions: AtomicU64,
    validation_failures: AtomicU64,
    /// Total field entries across all validation failures
    rejected_fields: AtomicU64,
    processing_failures: AtomicU64,
    scaling_failures: AtomicU64,
    /// Processing times of served predictions (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Running sum of served predictions, for the mean
    prediction_sum: RwLock<f64>,
    start_time: Instant,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            predictions: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            rejected_fields: AtomicU64::new(0),
            processing_failures: AtomicU64::new(0),
            scaling_failures: AtomicU64::new(0),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            prediction_sum: RwLock::new(0.0),
            start_time: Instant::now(),
        }
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a served prediction
    pub fn record_prediction(&self, processing_time: Duration, prediction: f64) {
        self.predictions.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            if times.len() > LATENCY_WINDOW {
                times.drain(0..LATENCY_WINDOW / 2);
            }
        }

        if let Ok(mut sum) = self.prediction_sum.write() {
            *sum += prediction;
        }
    }

    /// Record a rejected request and how many fields it got wrong
    pub fn record_validation_failure(&self, rejected_fields: usize) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
        self.rejected_fields
            .fetch_add(rejected_fields as u64, Ordering::Relaxed);
    }

    pub fn record_processing_failure(&self, stage: PipelineStage) {
        self.processing_failures.fetch_add(1, Ordering::Relaxed);
        if stage == PipelineStage::Scaling {
            self.scaling_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            predictions: self.predictions.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            rejected_fields: self.rejected_fields.load(Ordering::Relaxed),
            processing_failures: self.processing_failures.load(Ordering::Relaxed),
            scaling_failures: self.scaling_failures.load(Ordering::Relaxed),
        }
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let Ok(times) = self.processing_times.read() else {
            return ProcessingStats::default();
        };
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();
        let percentile = |p: f64| sorted[((count as f64 * p) as usize).min(count - 1)];

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: percentile(0.50),
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Mean of all served predictions
    pub fn get_mean_prediction(&self) -> f64 {
        let served = self.predictions.load(Ordering::Relaxed);
        match self.prediction_sum.read() {
            Ok(sum) if served > 0 => *sum / served as f64,
            _ => 0.0,
        }
    }

    /// Requests per second since start
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.requests.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();
        let processing = self.get_processing_stats();
        let rejection_rate = if snapshot.requests > 0 {
            (snapshot.validation_failures as f64 / snapshot.requests as f64) * 100.0
        } else {
            0.0
        };

        info!(
            requests = snapshot.requests,
            predictions = snapshot.predictions,
            validation_failures = snapshot.validation_failures,
            rejected_fields = snapshot.rejected_fields,
            processing_failures = snapshot.processing_failures,
            scaling_failures = snapshot.scaling_failures,
            rejection_rate = format!("{:.1}%", rejection_rate),
            throughput = format!("{:.1} req/s", self.get_throughput()),
            mean_prediction = format!("{:.2}", self.get_mean_prediction()),
            "Service metrics summary"
        );
        info!(
            samples = processing.count,
            mean_us = processing.mean_us,
            p50_us = processing.p50_us,
            p95_us = processing.p95_us,
            p99_us = processing.p99_us,
            max_us = processing.max_us,
            "Prediction latency"
        );
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time outcome counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub predictions: u64,
    pub validation_failures: u64,
    pub rejected_fields: u64,
    pub processing_failures: u64,
    pub scaling_failures: u64,
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic metrics reporter
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

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
