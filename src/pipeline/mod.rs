//! Cooperative host loop tying the components together.
//!
//! One call to [`Pipeline::run_cycle`] performs a single iteration:
//!
//! 1. poll the sensor for at most one new frame (absence is a no-op),
//! 2. colorize it into the frame buffer and hand it to the display,
//! 3. let the recorder capture if its interval has elapsed,
//! 4. if a capture was requested, save the current frame and extract
//!    its topography.
//!
//! Everything runs to completion on the calling thread before the next
//! poll. Failures are reported in the [`CycleReport`] and logged once;
//! nothing is retried.

mod status;

pub use status::{FpsCounter, Status};

use crate::capture::{AcquisitionError, ConfigError, FileConfig, SensorSource};
use crate::colorize::{Colorizer, DimensionMismatch, FrameBuffer};
use crate::recording::{OutputLayout, Recorder, TickOutcome};
use crate::topography::{TopographyError, TopographyExtractor, TopographyReport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Receives every colorized frame.
pub trait DisplaySink {
    /// Renders packed B,G,R pixel bytes of the session's frame size.
    fn render(&mut self, pixels: &[u8]);
}

/// Display sink that only counts frames.
#[derive(Debug, Default)]
pub struct NullDisplay {
    frames: u64,
}

impl NullDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames rendered.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl DisplaySink for NullDisplay {
    fn render(&mut self, _pixels: &[u8]) {
        self.frames += 1;
    }
}

/// Errors constructing a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to prepare output directories: {0}")]
    Io(#[from] std::io::Error),
}

/// What happened to the sensor poll in one cycle.
#[derive(Debug)]
pub enum FrameStatus {
    /// No new frame was available.
    NoFrame,
    /// The frame was colorized and rendered.
    Rendered { timestamp: i64 },
    /// The frame did not match the session geometry and was dropped.
    Dropped(DimensionMismatch),
    /// The sensor reported a failure.
    AcquisitionFailed(AcquisitionError),
}

/// Outcome of one [`Pipeline::run_cycle`].
#[derive(Debug)]
pub struct CycleReport {
    pub frame: FrameStatus,
    pub tick: TickOutcome,
    pub extraction: Option<Result<TopographyReport, TopographyError>>,
}

impl CycleReport {
    fn skipped(frame: FrameStatus) -> Self {
        Self {
            frame,
            tick: TickOutcome::Idle,
            extraction: None,
        }
    }
}

/// Running totals for the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStats {
    pub frames_rendered: u64,
    pub frames_dropped: u64,
    pub empty_polls: u64,
    pub acquisition_failures: u64,
    pub captures_written: u64,
    pub capture_failures: u64,
    pub extractions_completed: u64,
    pub extractions_failed: u64,
    pub fps: Option<f64>,
}

/// The frame processing pipeline.
pub struct Pipeline<S, D> {
    sensor: S,
    display: D,
    buffer: FrameBuffer,
    recorder: Recorder,
    extractor: TopographyExtractor,
    capture_label: String,
    capture_requested: Arc<AtomicBool>,
    fps: FpsCounter,
    stats: PipelineStats,
}

impl<S: SensorSource, D: DisplaySink> Pipeline<S, D> {
    /// Builds a pipeline from validated configuration and creates the
    /// output directories. The first periodic capture is due one interval
    /// after `start`.
    pub fn new(config: &FileConfig, sensor: S, display: D, start: Instant) -> Result<Self, PipelineError> {
        config.validate()?;
        let interval = Duration::try_from_secs_f64(config.recorder.interval_secs)
            .map_err(|_| ConfigError::InvalidInterval)?;

        let layout = OutputLayout::new(&config.output.root);
        layout.prepare()?;

        tracing::info!(
            root = %layout.root().display(),
            width = config.capture.width,
            height = config.capture.height,
            interval_secs = config.recorder.interval_secs,
            "Pipeline ready"
        );

        Ok(Self {
            sensor,
            display,
            buffer: FrameBuffer::new(
                config.capture.width,
                config.capture.height,
                Colorizer::new(config.capture.phase_mode),
            ),
            recorder: Recorder::new(
                layout.clone(),
                interval,
                config.recorder.bits_per_pixel,
                start,
            ),
            extractor: TopographyExtractor::new(&config.topography, layout),
            capture_label: config.recorder.capture_label.clone(),
            capture_requested: Arc::new(AtomicBool::new(false)),
            fps: FpsCounter::default(),
            stats: PipelineStats::default(),
        })
    }

    /// Shared flag that requests an on-demand capture on the next frame.
    pub fn capture_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.capture_requested)
    }

    /// Requests an on-demand capture on the next frame.
    pub fn request_capture(&self) {
        self.capture_requested.store(true, Ordering::SeqCst);
    }

    /// Runs one iteration of the loop.
    ///
    /// Recording and extraction only run on cycles that acquired a frame.
    pub fn run_cycle(&mut self, now: Instant) -> CycleReport {
        let frame = match self.sensor.try_acquire_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                self.stats.empty_polls += 1;
                tracing::trace!("No new depth frame");
                return CycleReport::skipped(FrameStatus::NoFrame);
            }
            Err(e) => {
                self.stats.acquisition_failures += 1;
                tracing::warn!(error = %e, "Depth frame acquisition failed");
                return CycleReport::skipped(FrameStatus::AcquisitionFailed(e));
            }
        };

        let frame_status = match self.buffer.update(&frame) {
            Ok(()) => {
                self.display.render(&self.buffer.as_bgr_bytes());
                self.stats.frames_rendered += 1;
                if let Some(status) = self.fps.record(now, frame.timestamp()) {
                    self.stats.fps = Some(status.fps);
                    tracing::info!(
                        fps = %format!("{:.2}", status.fps),
                        time = status.relative_time,
                        "Status"
                    );
                }
                FrameStatus::Rendered {
                    timestamp: frame.timestamp(),
                }
            }
            Err(mismatch) => {
                self.stats.frames_dropped += 1;
                tracing::warn!(error = %mismatch, "Depth frame dropped");
                FrameStatus::Dropped(mismatch)
            }
        };

        let tick = self.recorder.on_tick(now, &self.buffer);
        match tick {
            TickOutcome::Captured { .. } => self.stats.captures_written += 1,
            TickOutcome::Failed { .. } => self.stats.capture_failures += 1,
            TickOutcome::Idle => {}
        }

        let extraction = self
            .capture_requested
            .swap(false, Ordering::SeqCst)
            .then(|| self.capture_and_extract());

        CycleReport {
            frame: frame_status,
            tick,
            extraction,
        }
    }

    /// Saves the current frame as an on-demand capture and extracts its
    /// topography.
    fn capture_and_extract(&mut self) -> Result<TopographyReport, TopographyError> {
        let at = chrono::Local::now().time();
        let result = self
            .recorder
            .capture_now(&self.capture_label, &at, &self.buffer)
            .map_err(TopographyError::from)
            .and_then(|path| self.extractor.extract(&path));

        match &result {
            Ok(_) => self.stats.extractions_completed += 1,
            Err(e) => {
                self.stats.extractions_failed += 1;
                tracing::warn!(error = %e, "Failed to write contour maps");
            }
        }
        result
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn extractor(&self) -> &TopographyExtractor {
        &self.extractor
    }

    pub fn display(&self) -> &D {
        &self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureConfig, DepthFrame, MockSensor};
    use std::collections::VecDeque;

    /// Sensor replaying a fixed script of poll results.
    struct ScriptedSensor(VecDeque<Result<Option<DepthFrame>, AcquisitionError>>);

    impl SensorSource for ScriptedSensor {
        fn try_acquire_frame(&mut self) -> Result<Option<DepthFrame>, AcquisitionError> {
            self.0.pop_front().unwrap_or(Ok(None))
        }
    }

    fn config(root: &std::path::Path, width: u32, height: u32) -> FileConfig {
        let mut config = FileConfig::default();
        config.capture = CaptureConfig::with_dimensions(width, height);
        config.output.root = root.to_path_buf();
        config.topography.artifact_extension = "png".to_string();
        config.topography.save_intermediates = false;
        config
    }

    #[test]
    fn test_no_frame_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let start = Instant::now();
        let sensor = ScriptedSensor(VecDeque::new());
        let mut pipeline =
            Pipeline::new(&config(dir.path(), 4, 4), sensor, NullDisplay::new(), start).unwrap();
        pipeline.request_capture();

        let report = pipeline.run_cycle(start + Duration::from_secs(60));

        assert!(matches!(report.frame, FrameStatus::NoFrame));
        assert!(report.tick.is_idle());
        assert!(report.extraction.is_none());
        assert_eq!(pipeline.recorder().state().frame_counter, 1);
        assert_eq!(pipeline.stats().empty_polls, 1);
    }

    #[test]
    fn test_frame_is_rendered_and_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let start = Instant::now();
        let sensor = MockSensor::with_dimensions(8, 6);
        let mut pipeline =
            Pipeline::new(&config(dir.path(), 8, 6), sensor, NullDisplay::new(), start).unwrap();

        let early = pipeline.run_cycle(start + Duration::from_secs(1));
        assert!(matches!(early.frame, FrameStatus::Rendered { .. }));
        assert!(early.tick.is_idle());

        let due = pipeline.run_cycle(start + Duration::from_secs(3));
        assert!(matches!(due.tick, TickOutcome::Captured { frame: 1, .. }));
        assert!(dir.path().join("frames/frame_1.bmp").is_file());
        assert_eq!(pipeline.display().frames(), 2);
        assert_eq!(pipeline.stats().captures_written, 1);
    }

    #[test]
    fn test_mismatched_frame_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let start = Instant::now();
        let sensor = ScriptedSensor(VecDeque::from([
            Ok(Some(DepthFrame::new(vec![1000; 16], 4, 4, 1))),
            Ok(Some(DepthFrame::new(vec![0; 20], 5, 4, 2))),
        ]));
        let mut pipeline =
            Pipeline::new(&config(dir.path(), 4, 4), sensor, NullDisplay::new(), start).unwrap();

        pipeline.run_cycle(start);
        let before = pipeline.buffer().snapshot();
        let report = pipeline.run_cycle(start);

        assert!(matches!(report.frame, FrameStatus::Dropped(_)));
        assert_eq!(pipeline.buffer().snapshot(), before);
        assert_eq!(pipeline.display().frames(), 1);
        assert_eq!(pipeline.stats().frames_dropped, 1);
    }

    #[test]
    fn test_acquisition_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let start = Instant::now();
        let sensor = ScriptedSensor(VecDeque::from([Err(AcquisitionError::ReadFailed(
            "usb reset".into(),
        ))]));
        let mut pipeline =
            Pipeline::new(&config(dir.path(), 4, 4), sensor, NullDisplay::new(), start).unwrap();

        let report = pipeline.run_cycle(start + Duration::from_secs(10));

        assert!(matches!(report.frame, FrameStatus::AcquisitionFailed(_)));
        assert!(report.tick.is_idle());
        assert_eq!(pipeline.stats().acquisition_failures, 1);
    }

    #[test]
    fn test_capture_request_runs_extraction_once() {
        let dir = tempfile::tempdir().unwrap();
        let start = Instant::now();
        let sensor = MockSensor::with_dimensions(32, 24);
        let mut pipeline =
            Pipeline::new(&config(dir.path(), 32, 24), sensor, NullDisplay::new(), start).unwrap();

        let handle = pipeline.capture_handle();
        handle.store(true, Ordering::SeqCst);

        let report = pipeline.run_cycle(start);
        let extraction = report.extraction.expect("extraction ran").unwrap();
        assert!(extraction.source.starts_with(dir.path().join("results")));
        assert!(extraction.source.is_file());
        assert!(extraction.topography_path.is_file());
        assert!(extraction.overlay_path.is_file());
        assert!(!handle.load(Ordering::SeqCst));

        let report = pipeline.run_cycle(start);
        assert!(report.extraction.is_none());
        assert_eq!(pipeline.stats().extractions_completed, 1);
        // On-demand captures do not consume periodic frame numbers.
        assert_eq!(pipeline.recorder().state().frame_counter, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), 4, 4);
        config.recorder.interval_secs = -1.0;

        let result = Pipeline::new(
            &config,
            MockSensor::with_dimensions(4, 4),
            NullDisplay::new(),
            Instant::now(),
        );
        assert!(matches!(
            result,
            Err(PipelineError::Config(ConfigError::InvalidInterval))
        ));
    }
}
