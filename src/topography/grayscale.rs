//! Color to luminance conversion.

use crate::bitmap::Bitmap;
use crate::colorize::Rgb;
use image::{GrayImage, Luma, RgbImage};

// ITU-R BT.601 weights in 14-bit fixed point.
const SHIFT: u32 = 14;
const R_WEIGHT: u32 = 4899; // 0.299
const G_WEIGHT: u32 = 9617; // 0.587
const B_WEIGHT: u32 = 1868; // 0.114

/// Perceptual luminance of one color, rounded to nearest.
#[inline]
pub fn luminance(c: Rgb) -> u8 {
    let y = c.r as u32 * R_WEIGHT + c.g as u32 * G_WEIGHT + c.b as u32 * B_WEIGHT;
    ((y + (1 << (SHIFT - 1))) >> SHIFT) as u8
}

/// Converts a decoded bitmap to a single-channel luminance image.
pub fn to_luminance(bitmap: &Bitmap) -> GrayImage {
    GrayImage::from_fn(bitmap.width, bitmap.height, |x, y| {
        let idx = y as usize * bitmap.width as usize + x as usize;
        Luma([luminance(bitmap.pixels[idx])])
    })
}

/// Copies a decoded bitmap into an RGB image buffer.
pub fn to_rgb_image(bitmap: &Bitmap) -> RgbImage {
    RgbImage::from_fn(bitmap.width, bitmap.height, |x, y| {
        let idx = y as usize * bitmap.width as usize + x as usize;
        image::Rgb(bitmap.pixels[idx].into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_unity() {
        assert_eq!(R_WEIGHT + G_WEIGHT + B_WEIGHT, 1 << SHIFT);
        assert_eq!(luminance(Rgb::WHITE), 255);
        assert_eq!(luminance(Rgb::BLACK), 0);
    }

    #[test]
    fn test_gray_input_is_preserved() {
        for v in [1u8, 50, 127, 200, 254] {
            assert_eq!(luminance(Rgb::new(v, v, v)), v);
        }
    }

    #[test]
    fn test_green_dominates() {
        assert_eq!(luminance(Rgb::new(255, 0, 0)), 76);
        assert_eq!(luminance(Rgb::new(0, 255, 0)), 150);
        assert_eq!(luminance(Rgb::new(0, 0, 255)), 29);
    }

    #[test]
    fn test_to_luminance_layout() {
        let bitmap = Bitmap {
            width: 2,
            height: 1,
            pixels: vec![Rgb::WHITE, Rgb::new(0, 255, 0)],
        };
        let gray = to_luminance(&bitmap);

        assert_eq!(gray.dimensions(), (2, 1));
        assert_eq!(gray.get_pixel(0, 0)[0], 255);
        assert_eq!(gray.get_pixel(1, 0)[0], 150);
    }
}
