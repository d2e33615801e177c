//! Metrics collection and registry.

use crate::pipeline::PipelineStats;
use crate::recording::RecorderState;
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of pipeline state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Frames colorized and rendered.
    pub frames_rendered: u64,
    /// Frames dropped for mismatched dimensions.
    pub frames_dropped: u64,
    /// Polls that returned no new frame.
    pub empty_polls: u64,
    /// Polls that failed.
    pub acquisition_failures: u64,
    /// Periodic captures written.
    pub captures_written: u64,
    /// Periodic captures that failed to write.
    pub capture_failures: u64,
    /// Number the next periodic capture will use.
    pub next_frame_number: u64,
    /// Completed topography extractions.
    pub extractions_completed: u64,
    /// Failed topography extractions.
    pub extractions_failed: u64,
    /// Most recently measured frame rate.
    pub fps: Option<f64>,
}

/// Prometheus metrics registry for the depth pipeline.
pub struct MetricsRegistry {
    registry: Registry,

    // Frame metrics
    frames_rendered: IntCounter,
    frames_dropped: IntCounter,
    empty_polls: IntCounter,
    acquisition_failures: IntCounter,
    fps: Gauge,

    // Recording metrics
    captures_written: IntCounter,
    capture_failures: IntCounter,
    next_frame_number: IntGauge,

    // Topography metrics
    extractions_completed: IntCounter,
    extractions_failed: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new registry with all pipeline metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let frames_rendered = IntCounter::new(
            "depth_topography_frames_rendered_total",
            "Depth frames colorized and rendered",
        )?;
        let frames_dropped = IntCounter::new(
            "depth_topography_frames_dropped_total",
            "Depth frames dropped for mismatched dimensions",
        )?;
        let empty_polls = IntCounter::new(
            "depth_topography_empty_polls_total",
            "Sensor polls without a new frame",
        )?;
        let acquisition_failures = IntCounter::new(
            "depth_topography_acquisition_failures_total",
            "Sensor polls that failed",
        )?;
        let fps = Gauge::new(
            "depth_topography_frames_per_second",
            "Most recently measured frame rate",
        )?;

        let captures_written = IntCounter::new(
            "depth_topography_captures_written_total",
            "Periodic captures written",
        )?;
        let capture_failures = IntCounter::new(
            "depth_topography_capture_failures_total",
            "Periodic captures that failed to write",
        )?;
        let next_frame_number = IntGauge::new(
            "depth_topography_next_frame_number",
            "Number assigned to the next periodic capture",
        )?;

        let extractions_completed = IntCounter::new(
            "depth_topography_extractions_completed_total",
            "Topography extractions completed",
        )?;
        let extractions_failed = IntCounter::new(
            "depth_topography_extractions_failed_total",
            "Topography extractions that failed",
        )?;

        registry.register(Box::new(frames_rendered.clone()))?;
        registry.register(Box::new(frames_dropped.clone()))?;
        registry.register(Box::new(empty_polls.clone()))?;
        registry.register(Box::new(acquisition_failures.clone()))?;
        registry.register(Box::new(fps.clone()))?;
        registry.register(Box::new(captures_written.clone()))?;
        registry.register(Box::new(capture_failures.clone()))?;
        registry.register(Box::new(next_frame_number.clone()))?;
        registry.register(Box::new(extractions_completed.clone()))?;
        registry.register(Box::new(extractions_failed.clone()))?;

        Ok(Self {
            registry,
            frames_rendered,
            frames_dropped,
            empty_polls,
            acquisition_failures,
            fps,
            captures_written,
            capture_failures,
            next_frame_number,
            extractions_completed,
            extractions_failed,
        })
    }

    /// Updates all metrics from a snapshot of pipeline state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        // Counters only move forward by the difference.
        advance(&self.frames_rendered, snapshot.frames_rendered);
        advance(&self.frames_dropped, snapshot.frames_dropped);
        advance(&self.empty_polls, snapshot.empty_polls);
        advance(&self.acquisition_failures, snapshot.acquisition_failures);
        advance(&self.captures_written, snapshot.captures_written);
        advance(&self.capture_failures, snapshot.capture_failures);
        advance(&self.extractions_completed, snapshot.extractions_completed);
        advance(&self.extractions_failed, snapshot.extractions_failed);

        self.next_frame_number.set(snapshot.next_frame_number as i64);
        if let Some(fps) = snapshot.fps {
            self.fps.set(fps);
        }
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

impl MetricsSnapshot {
    /// Creates a snapshot from pipeline counters and recorder state.
    pub fn from_pipeline(stats: &PipelineStats, recorder: &RecorderState) -> Self {
        Self {
            frames_rendered: stats.frames_rendered,
            frames_dropped: stats.frames_dropped,
            empty_polls: stats.empty_polls,
            acquisition_failures: stats.acquisition_failures,
            captures_written: stats.captures_written,
            capture_failures: stats.capture_failures,
            next_frame_number: recorder.frame_counter,
            extractions_completed: stats.extractions_completed,
            extractions_failed: stats.extractions_failed,
            fps: stats.fps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_registry_creation() {
        assert!(MetricsRegistry::new().is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();
        let stats = PipelineStats {
            frames_rendered: 90,
            frames_dropped: 1,
            captures_written: 3,
            capture_failures: 1,
            extractions_completed: 2,
            fps: Some(29.5),
            ..Default::default()
        };
        let mut recorder = RecorderState::new(Instant::now());
        recorder.frame_counter = 5;

        registry.update(&MetricsSnapshot::from_pipeline(&stats, &recorder));

        let output = registry.encode().unwrap();
        assert!(output.contains("depth_topography_frames_rendered_total 90"));
        assert!(output.contains("depth_topography_captures_written_total 3"));
        assert!(output.contains("depth_topography_next_frame_number 5"));
        assert!(output.contains("depth_topography_frames_per_second 29.5"));
    }

    #[test]
    fn test_counters_never_decrease() {
        let registry = MetricsRegistry::new().unwrap();

        registry.update(&MetricsSnapshot {
            frames_rendered: 10,
            ..Default::default()
        });
        registry.update(&MetricsSnapshot {
            frames_rendered: 4,
            ..Default::default()
        });

        let output = registry.encode().unwrap();
        assert!(output.contains("depth_topography_frames_rendered_total 10"));
    }

    #[test]
    fn test_metrics_encode() {
        let registry = MetricsRegistry::new().unwrap();
        let output = registry.encode().unwrap();

        assert!(output.contains("depth_topography_frames_dropped_total"));
        assert!(output.contains("depth_topography_extractions_failed_total"));
    }
}
