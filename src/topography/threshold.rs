//! Luminance cut points and binarization.

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

/// Pixel value marking foreground in a binary image.
pub const FOREGROUND: u8 = 255;

/// Ordered luminance cut points.
///
/// Order is significant: contours of later levels are drawn over those of
/// earlier levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSet {
    levels: Vec<u8>,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            levels: vec![80, 100, 130, 140, 170],
        }
    }
}

impl ThresholdSet {
    /// Creates a set drawing levels in the given order.
    pub fn new(levels: Vec<u8>) -> Self {
        Self { levels }
    }

    /// A single cut point.
    pub fn single(level: u8) -> Self {
        Self {
            levels: vec![level],
        }
    }

    pub fn levels(&self) -> &[u8] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Binarizes a luminance image: white where luminance ≥ `level`.
pub fn binarize(gray: &GrayImage, level: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] >= level {
            Luma([FOREGROUND])
        } else {
            Luma([0])
        }
    })
}
