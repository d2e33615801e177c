//! Depth sensor abstraction.
//!
//! The pipeline only needs to poll for the latest frame. Sensor discovery
//! and connection lifecycle belong to the implementation behind the trait.

use super::{CaptureConfig, DepthFrame};
use thiserror::Error;

/// Errors that can occur while acquiring a frame.
///
/// The routine "no new frame yet" case is not an error; sources return
/// `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("depth sensor not available: {0}")]
    Unavailable(String),
    #[error("failed to read depth frame: {0}")]
    ReadFailed(String),
}

/// Trait for depth frame sources.
pub trait SensorSource {
    /// Returns the most recent frame if a new one is available.
    ///
    /// Never blocks waiting for a frame.
    fn try_acquire_frame(&mut self) -> Result<Option<DepthFrame>, AcquisitionError>;
}

/// Synthetic depth source for testing and demonstration.
///
/// Produces a radial depth bowl that drifts a little every frame, which
/// colorizes into concentric bands and yields nested contours.
#[derive(Debug)]
pub struct MockSensor {
    width: u32,
    height: u32,
    sequence: u64,
    /// Every `idle_every`-th poll reports no new frame (0 disables).
    idle_every: u64,
    polls: u64,
}

impl MockSensor {
    /// Creates a mock sensor producing frames of the configured size.
    pub fn new(config: &CaptureConfig) -> Self {
        Self::with_dimensions(config.width, config.height)
    }

    /// Creates a mock sensor with explicit dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sequence: 0,
            idle_every: 0,
            polls: 0,
        }
    }

    /// Makes every `n`-th poll report that no frame is available.
    pub fn idle_every(mut self, n: u64) -> Self {
        self.idle_every = n;
        self
    }

    /// Returns the number of frames produced so far.
    pub fn frames_produced(&self) -> u64 {
        self.sequence
    }

    fn synthesize(&self) -> Vec<u16> {
        let cx = self.width as f64 / 2.0;
        let cy = self.height as f64 / 2.0;
        let drift = (self.sequence % 200) as f64 * 5.0;

        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .map(|(x, y)| {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                let depth = 500.0 + (dx * dx + dy * dy).sqrt() * 10.0 + drift;
                depth.min(u16::MAX as f64) as u16
            })
            .collect()
    }
}

impl SensorSource for MockSensor {
    fn try_acquire_frame(&mut self) -> Result<Option<DepthFrame>, AcquisitionError> {
        self.polls += 1;
        if self.idle_every > 0 && self.polls % self.idle_every == 0 {
            tracing::trace!(poll = self.polls, "MockSensor has no new frame");
            return Ok(None);
        }

        let samples = self.synthesize();
        self.sequence += 1;

        // Timestamps advance in 100ns ticks at ~30 fps.
        let timestamp = self.sequence as i64 * 333_333;
        Ok(Some(
            DepthFrame::new(samples, self.width, self.height, timestamp)
                .with_reliable_range(500, 4500),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_sensor_produces_valid_frames() {
        let mut sensor = MockSensor::with_dimensions(16, 12);

        let frame = sensor.try_acquire_frame().unwrap().unwrap();
        assert!(frame.is_valid());
        assert_eq!(frame.width(), 16);
        assert_eq!(frame.height(), 12);

        let next = sensor.try_acquire_frame().unwrap().unwrap();
        assert!(next.timestamp() > frame.timestamp());
        assert_eq!(sensor.frames_produced(), 2);
    }

    #[test]
    fn test_mock_sensor_idle_polls() {
        let mut sensor = MockSensor::with_dimensions(4, 4).idle_every(2);

        assert!(sensor.try_acquire_frame().unwrap().is_some());
        assert!(sensor.try_acquire_frame().unwrap().is_none());
        assert!(sensor.try_acquire_frame().unwrap().is_some());
        assert_eq!(sensor.frames_produced(), 2);
    }
}
