//! Time-driven periodic capture.

use super::OutputLayout;
use crate::bitmap::{save_bitmap, BitmapIoError};
use crate::colorize::FrameBuffer;
use chrono::Timelike;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Mutable recording state.
///
/// Owned by a [`Recorder`]; independent recorders never share counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderState {
    /// Number used for the next periodic capture.
    pub frame_counter: u64,
    /// When the last capture was attempted (or the session started).
    pub last_capture: Instant,
}

impl RecorderState {
    /// Fresh state: counter at 1, interval measured from `start`.
    pub fn new(start: Instant) -> Self {
        Self {
            frame_counter: 1,
            last_capture: start,
        }
    }
}

/// Result of a single [`Recorder::on_tick`].
#[derive(Debug)]
pub enum TickOutcome {
    /// Interval has not elapsed yet.
    Idle,
    /// Frame `frame` was written to `path`.
    Captured { frame: u64, path: PathBuf },
    /// Writing frame `frame` failed; the number is not reused.
    Failed { frame: u64, error: BitmapIoError },
}

impl TickOutcome {
    pub fn is_idle(&self) -> bool {
        matches!(self, TickOutcome::Idle)
    }
}

/// Periodically persists the frame buffer as numbered bitmaps.
#[derive(Debug)]
pub struct Recorder {
    state: RecorderState,
    interval: Duration,
    bits_per_pixel: u16,
    layout: OutputLayout,
}

impl Recorder {
    /// Creates a recorder whose first capture is due `interval` after `start`.
    pub fn new(layout: OutputLayout, interval: Duration, bits_per_pixel: u16, start: Instant) -> Self {
        Self {
            state: RecorderState::new(start),
            interval,
            bits_per_pixel,
            layout,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &RecorderState {
        &self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Returns true if a capture would happen at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.state.last_capture) >= self.interval
    }

    /// Captures the buffer if the interval has elapsed.
    ///
    /// At most one capture happens per call regardless of how many
    /// intervals have passed. The counter advances after every attempt,
    /// including failed ones, so a failed write leaves a gap in the
    /// numbering.
    pub fn on_tick(&mut self, now: Instant, buffer: &FrameBuffer) -> TickOutcome {
        if !self.is_due(now) {
            return TickOutcome::Idle;
        }

        let frame = self.state.frame_counter;
        let path = self.layout.frame_path(frame);
        let result = save_bitmap(
            &path,
            buffer.pixels(),
            buffer.width(),
            buffer.height(),
            self.bits_per_pixel,
        );

        self.state.frame_counter += 1;
        self.state.last_capture = now;

        match result {
            Ok(_) => {
                tracing::info!(frame, path = %path.display(), "Frame recorded");
                TickOutcome::Captured { frame, path }
            }
            Err(error) => {
                tracing::warn!(frame, error = %error, "Frame recording failed");
                TickOutcome::Failed { frame, error }
            }
        }
    }

    /// Writes an on-demand capture to `results/<label>-<HH-MM-SS>.bmp`.
    ///
    /// Does not touch the periodic counter or interval.
    pub fn capture_now(
        &self,
        label: &str,
        at: &impl Timelike,
        buffer: &FrameBuffer,
    ) -> Result<PathBuf, BitmapIoError> {
        let path = self.layout.capture_path(label, at);
        save_bitmap(
            &path,
            buffer.pixels(),
            buffer.width(),
            buffer.height(),
            self.bits_per_pixel,
        )?;
        tracing::info!(path = %path.display(), "Capture saved");
        Ok(path)
    }
}
