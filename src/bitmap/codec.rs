//! In-memory bitmap encoding and decoding.

use super::header::{BitmapHeader, HEADER_LEN};
use crate::colorize::Rgb;
use thiserror::Error;

/// Malformed or unsupported bitmap data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("bitmap truncated: need {needed} bytes, have {actual}")]
    Truncated { needed: usize, actual: usize },
    #[error("bad bitmap signature {0:?}")]
    BadSignature([u8; 2]),
    #[error("unsupported info header size {0}")]
    UnsupportedHeader(u32),
    #[error("pixel data offset {0} overlaps the headers")]
    BadPixelOffset(u32),
    #[error("invalid bitmap dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("invalid plane count {0}")]
    InvalidPlanes(u16),
    #[error("unsupported bits per pixel {0}")]
    UnsupportedBitDepth(u16),
    #[error("unsupported compression {0}")]
    UnsupportedCompression(u32),
    #[error("declared image size {declared} does not match expected {expected}")]
    SizeMismatch { declared: u32, expected: u32 },
    #[error("pixel count {actual} does not match {width}x{height}")]
    PixelCountMismatch {
        width: u32,
        height: u32,
        actual: usize,
    },
}

/// A decoded bitmap in top-down row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgb>,
}

impl Bitmap {
    /// Color at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

/// Encodes pixels as an uncompressed, top-down bitmap.
///
/// Rows are written without padding; the header declares the exact
/// payload size. With 32 bits per pixel the fourth byte of each pixel
/// is zero.
pub fn encode(
    pixels: &[Rgb],
    width: u32,
    height: u32,
    bits_per_pixel: u16,
) -> Result<Vec<u8>, FormatError> {
    let header = BitmapHeader::top_down(width, height, bits_per_pixel)?;
    if pixels.len() != width as usize * height as usize {
        return Err(FormatError::PixelCountMismatch {
            width,
            height,
            actual: pixels.len(),
        });
    }

    let mut out = Vec::with_capacity(HEADER_LEN + header.image_size as usize);
    out.extend_from_slice(&header.to_bytes());
    write_payload(&mut out, pixels, bits_per_pixel);
    Ok(out)
}

/// Appends the raw pixel payload (B,G,R[,X] per pixel) to `out`.
pub(crate) fn write_payload(out: &mut Vec<u8>, pixels: &[Rgb], bits_per_pixel: u16) {
    if bits_per_pixel == 32 {
        out.extend(pixels.iter().flat_map(|p| [p.b, p.g, p.r, 0]));
    } else {
        out.extend(pixels.iter().flat_map(|p| [p.b, p.g, p.r]));
    }
}

/// Decodes an uncompressed 24- or 32-bit bitmap.
///
/// Bottom-up images are flipped so the returned pixels are always in
/// top-down row order.
pub fn decode(bytes: &[u8]) -> Result<Bitmap, FormatError> {
    let header = BitmapHeader::parse(bytes)?;
    let stride = header.stride()?;
    let rows = header.height as usize;
    let bpp = header.bytes_per_pixel();

    let start = header.pixel_offset as usize;
    let needed = start + stride * rows;
    if bytes.len() < needed {
        return Err(FormatError::Truncated {
            needed,
            actual: bytes.len(),
        });
    }
    let payload = &bytes[start..needed];

    let row_len = header.packed_stride();
    let mut pixels = Vec::with_capacity(header.width as usize * rows);
    for row in 0..rows {
        let stored = if header.top_down { row } else { rows - 1 - row };
        let line = &payload[stored * stride..stored * stride + row_len];
        pixels.extend(
            line.chunks_exact(bpp)
                .map(|px| Rgb::new(px[2], px[1], px[0])),
        );
    }

    Ok(Bitmap {
        width: header.width,
        height: header.height,
        pixels,
    })
}
