//! Frame rate status reporting.

use std::time::{Duration, Instant};

/// A status update ready to be shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Status {
    /// Frames per second since the previous status.
    pub fps: f64,
    /// Sensor time elapsed since the first frame, in sensor ticks.
    pub relative_time: i64,
}

/// Computes frames per second and rate-limits status updates.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    min_interval: Duration,
    first_timestamp: Option<i64>,
    last_report: Option<Instant>,
    frames_since_report: u64,
    last_fps: Option<f64>,
}

impl FpsCounter {
    /// Reports at most once per `min_interval`.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            first_timestamp: None,
            last_report: None,
            frames_since_report: 0,
            last_fps: None,
        }
    }

    /// Records a processed frame and returns a status when one is due.
    ///
    /// The first frame only starts the clock.
    pub fn record(&mut self, now: Instant, timestamp: i64) -> Option<Status> {
        let first = *self.first_timestamp.get_or_insert(timestamp);
        let Some(last) = self.last_report else {
            self.last_report = Some(now);
            return None;
        };

        self.frames_since_report += 1;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.min_interval || elapsed.is_zero() {
            return None;
        }

        let fps = self.frames_since_report as f64 / elapsed.as_secs_f64();
        self.frames_since_report = 0;
        self.last_report = Some(now);
        self.last_fps = Some(fps);

        Some(Status {
            fps,
            relative_time: timestamp - first,
        })
    }

    /// Most recently reported rate.
    pub fn last_fps(&self) -> Option<f64> {
        self.last_fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
