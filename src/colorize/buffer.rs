//! Fixed-size frame buffer holding the most recent colorized frame.

use super::{Colorizer, Rgb};
use crate::capture::DepthFrame;
use thiserror::Error;

/// A depth frame whose geometry does not match the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "depth frame {got_width}x{got_height} ({got_samples} samples) does not match buffer {expected_width}x{expected_height}"
)]
pub struct DimensionMismatch {
    pub expected_width: u32,
    pub expected_height: u32,
    pub got_width: u32,
    pub got_height: u32,
    pub got_samples: usize,
}

/// The colorized frame shared by the display and the recorder.
///
/// Sized once at construction and overwritten in place by every accepted
/// frame. There is no double-buffering: readers must finish with
/// [`FrameBuffer::pixels`] before the next [`FrameBuffer::update`].
pub struct FrameBuffer {
    pixels: Vec<Rgb>,
    width: u32,
    height: u32,
    colorizer: Colorizer,
    /// Timestamp of the last accepted frame.
    last_timestamp: Option<i64>,
}

impl FrameBuffer {
    /// Creates a black buffer of the given size.
    pub fn new(width: u32, height: u32, colorizer: Colorizer) -> Self {
        Self {
            pixels: vec![Rgb::BLACK; (width as usize) * (height as usize)],
            width,
            height,
            colorizer,
            last_timestamp: None,
        }
    }

    /// Colorizes a depth frame into the buffer.
    ///
    /// Frames with mismatched geometry are rejected and leave the buffer
    /// untouched.
    pub fn update(&mut self, frame: &DepthFrame) -> Result<(), DimensionMismatch> {
        if frame.width() != self.width || frame.height() != self.height || !frame.is_valid() {
            return Err(DimensionMismatch {
                expected_width: self.width,
                expected_height: self.height,
                got_width: frame.width(),
                got_height: frame.height(),
                got_samples: frame.samples().len(),
            });
        }

        let colorizer = self.colorizer;
        for (pixel, &depth) in self.pixels.iter_mut().zip(frame.samples()) {
            *pixel = colorizer.colorize(depth);
        }
        self.last_timestamp = Some(frame.timestamp());

        tracing::trace!(
            timestamp = frame.timestamp(),
            range = ?frame.effective_range(),
            "Frame colorized"
        );
        Ok(())
    }

    /// Returns a read-only view of the pixels.
    #[inline]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Returns an owned copy of the pixels.
    pub fn snapshot(&self) -> Vec<Rgb> {
        self.pixels.clone()
    }

    /// Returns the pixels as packed B,G,R bytes.
    pub fn as_bgr_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| [p.b, p.g, p.r]).collect()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Timestamp of the last accepted frame, if any.
    pub fn last_timestamp(&self) -> Option<i64> {
        self.last_timestamp
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("mode", &self.colorizer.mode())
            .field("last_timestamp", &self.last_timestamp)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorize::colorize;

    #[test]
    fn test_update_colorizes_every_sample() {
        let mut buffer = FrameBuffer::new(2, 2, Colorizer::default());
        let frame = DepthFrame::new(vec![0, 1000, 32768, 65535], 2, 2, 1);

        buffer.update(&frame).unwrap();

        let expected: Vec<Rgb> = frame.samples().iter().map(|&d| colorize(d)).collect();
        assert_eq!(buffer.pixels(), expected.as_slice());
        assert_eq!(buffer.last_timestamp(), Some(1));
    }

    #[test]
    fn test_mismatched_width_leaves_buffer_unchanged() {
        let mut buffer = FrameBuffer::new(2, 2, Colorizer::default());
        buffer
            .update(&DepthFrame::new(vec![10, 20, 30, 40], 2, 2, 1))
            .unwrap();
        let before = buffer.snapshot();

        let wrong = DepthFrame::new(vec![0; 6], 3, 2, 2);
        let err = buffer.update(&wrong).unwrap_err();

        assert_eq!(err.got_width, 3);
        assert_eq!(buffer.snapshot(), before);
        assert_eq!(buffer.last_timestamp(), Some(1));
    }

    #[test]
    fn test_short_sample_buffer_rejected() {
        let mut buffer = FrameBuffer::new(2, 2, Colorizer::default());
        let before = buffer.snapshot();

        assert!(buffer.update(&DepthFrame::new(vec![1, 2, 3], 2, 2, 1)).is_err());
        assert_eq!(buffer.snapshot(), before);
    }

    #[test]
    fn test_bgr_byte_order() {
        let mut buffer = FrameBuffer::new(1, 1, Colorizer::default());
        buffer.update(&DepthFrame::new(vec![0], 1, 1, 0)).unwrap();

        // colorize(0) == (255, 66, 66)
        assert_eq!(buffer.as_bgr_bytes(), vec![66, 66, 255]);
    }
}
