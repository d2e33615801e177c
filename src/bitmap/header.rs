//! Bitmap file and info headers.
//!
//! Layout (all fields little-endian):
//!
//! ```text
//! offset  size  field
//!      0     2  signature "BM"
//!      2     4  total file size
//!      6     4  reserved (0)
//!     10     4  offset of pixel data
//!     14     4  info header size (40)
//!     18     4  width
//!     22     4  height (negative = rows stored top-down)
//!     26     2  planes (1)
//!     28     2  bits per pixel
//!     30     4  compression (0 = uncompressed RGB)
//!     34     4  image size in bytes
//!     38    16  resolution and palette fields (0)
//! ```

use super::FormatError;

pub const SIGNATURE: [u8; 2] = *b"BM";
pub const FILE_HEADER_LEN: usize = 14;
pub const INFO_HEADER_LEN: usize = 40;
pub const HEADER_LEN: usize = FILE_HEADER_LEN + INFO_HEADER_LEN;

const BI_RGB: u32 = 0;

/// Parsed header metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapHeader {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u16,
    /// Rows are stored first-row-first (negative height on disk).
    pub top_down: bool,
    /// Declared pixel payload size in bytes.
    pub image_size: u32,
    /// Offset of the pixel payload from the start of the file.
    pub pixel_offset: u32,
}

impl BitmapHeader {
    /// Header for an unpadded, top-down image.
    pub fn top_down(width: u32, height: u32, bits_per_pixel: u16) -> Result<Self, FormatError> {
        check_bit_depth(bits_per_pixel)?;
        check_dimensions(width, height)?;

        let image_size = width as u64 * height as u64 * (bits_per_pixel as u64 / 8);
        let image_size = u32::try_from(image_size)
            .ok()
            .filter(|size| size.checked_add(HEADER_LEN as u32).is_some())
            .ok_or(FormatError::InvalidDimensions { width, height })?;

        Ok(Self {
            width,
            height,
            bits_per_pixel,
            top_down: true,
            image_size,
            pixel_offset: HEADER_LEN as u32,
        })
    }

    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        self.bits_per_pixel as usize / 8
    }

    /// Bytes per row when rows are tightly packed.
    #[inline]
    pub fn packed_stride(&self) -> usize {
        self.width as usize * self.bytes_per_pixel()
    }

    /// Bytes per row when rows are padded to 4-byte boundaries.
    #[inline]
    pub fn padded_stride(&self) -> usize {
        (self.packed_stride() + 3) & !3
    }

    /// Stride implied by the declared image size.
    ///
    /// A size equal to the packed payload means no padding. A zero size
    /// (allowed for uncompressed images) or the padded payload size means
    /// standard 4-byte row padding.
    pub fn stride(&self) -> Result<usize, FormatError> {
        let rows = self.height as usize;
        let declared = self.image_size as usize;
        let packed = self.packed_stride();
        let padded = self.padded_stride();

        if declared == packed * rows {
            Ok(packed)
        } else if declared == 0 || declared == padded * rows {
            Ok(padded)
        } else {
            Err(FormatError::SizeMismatch {
                declared: self.image_size,
                expected: (packed * rows) as u32,
            })
        }
    }

    /// Serializes the file and info headers.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        let height = if self.top_down {
            -(self.height as i32)
        } else {
            self.height as i32
        };

        out[0..2].copy_from_slice(&SIGNATURE);
        put_u32(&mut out, 2, self.pixel_offset + self.image_size);
        put_u32(&mut out, 10, self.pixel_offset);
        put_u32(&mut out, 14, INFO_HEADER_LEN as u32);
        put_u32(&mut out, 18, self.width);
        put_u32(&mut out, 22, height as u32);
        out[26..28].copy_from_slice(&1u16.to_le_bytes());
        out[28..30].copy_from_slice(&self.bits_per_pixel.to_le_bytes());
        put_u32(&mut out, 30, BI_RGB);
        put_u32(&mut out, 34, self.image_size);
        out
    }

    /// Parses and validates the headers at the start of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() < HEADER_LEN {
            return Err(FormatError::Truncated {
                needed: HEADER_LEN,
                actual: bytes.len(),
            });
        }
        if bytes[0..2] != SIGNATURE {
            return Err(FormatError::BadSignature([bytes[0], bytes[1]]));
        }

        let pixel_offset = get_u32(bytes, 10);
        let info_len = get_u32(bytes, 14);
        // Later header revisions extend the 40-byte layout.
        if (info_len as usize) < INFO_HEADER_LEN {
            return Err(FormatError::UnsupportedHeader(info_len));
        }
        if (pixel_offset as usize) < FILE_HEADER_LEN + info_len as usize {
            return Err(FormatError::BadPixelOffset(pixel_offset));
        }

        let raw_width = get_u32(bytes, 18) as i32;
        let raw_height = get_u32(bytes, 22) as i32;
        if raw_width <= 0 || raw_height == 0 || raw_height == i32::MIN {
            return Err(FormatError::InvalidDimensions {
                width: raw_width as u32,
                height: raw_height.unsigned_abs(),
            });
        }

        let planes = u16::from_le_bytes([bytes[26], bytes[27]]);
        if planes != 1 {
            return Err(FormatError::InvalidPlanes(planes));
        }

        let bits_per_pixel = u16::from_le_bytes([bytes[28], bytes[29]]);
        check_bit_depth(bits_per_pixel)?;

        let compression = get_u32(bytes, 30);
        if compression != BI_RGB {
            return Err(FormatError::UnsupportedCompression(compression));
        }

        Ok(Self {
            width: raw_width as u32,
            height: raw_height.unsigned_abs(),
            bits_per_pixel,
            top_down: raw_height < 0,
            image_size: get_u32(bytes, 34),
            pixel_offset,
        })
    }
}

fn check_bit_depth(bits_per_pixel: u16) -> Result<(), FormatError> {
    match bits_per_pixel {
        24 | 32 => Ok(()),
        other => Err(FormatError::UnsupportedBitDepth(other)),
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), FormatError> {
    if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
        return Err(FormatError::InvalidDimensions { width, height });
    }
    Ok(())
}

#[inline]
fn put_u32(out: &mut [u8], at: usize, value: u32) {
    out[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

#[inline]
fn get_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_fields_for_sensor_frame() {
        let header = BitmapHeader::top_down(512, 424, 32).unwrap();
        let bytes = header.to_bytes();

        assert_eq!(&bytes[0..2], b"BM");
        assert_eq!(get_u32(&bytes, 2), 54 + 512 * 424 * 4);
        assert_eq!(get_u32(&bytes, 10), 54);
        assert_eq!(get_u32(&bytes, 14), 40);
        assert_eq!(get_u32(&bytes, 18), 512);
        assert_eq!(get_u32(&bytes, 22) as i32, -424);
        assert_eq!(u16::from_le_bytes([bytes[28], bytes[29]]), 32);
        assert_eq!(get_u32(&bytes, 30), 0);
        assert_eq!(get_u32(&bytes, 34), 512 * 424 * 4);
    }

    #[test]
    fn test_parse_inverts_to_bytes() {
        let header = BitmapHeader::top_down(7, 3, 24).unwrap();
        assert_eq!(BitmapHeader::parse(&header.to_bytes()).unwrap(), header);
    }

    #[test]
    fn test_stride_detection() {
        let mut header = BitmapHeader::top_down(5, 2, 24).unwrap();
        assert_eq!(header.stride().unwrap(), 15);

        header.image_size = 0;
        assert_eq!(header.stride().unwrap(), 16);

        header.image_size = 32;
        assert_eq!(header.stride().unwrap(), 16);

        header.image_size = 31;
        assert!(matches!(
            header.stride(),
            Err(FormatError::SizeMismatch { declared: 31, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_signature() {
        let mut bytes = BitmapHeader::top_down(1, 1, 24).unwrap().to_bytes();
        bytes[0] = b'P';
        assert!(matches!(
            BitmapHeader::parse(&bytes),
            Err(FormatError::BadSignature([b'P', b'M']))
        ));
    }

    #[test]
    fn test_rejects_compression_and_depth() {
        let mut bytes = BitmapHeader::top_down(1, 1, 24).unwrap().to_bytes();
        bytes[30] = 1;
        assert!(matches!(
            BitmapHeader::parse(&bytes),
            Err(FormatError::UnsupportedCompression(1))
        ));

        assert!(matches!(
            BitmapHeader::top_down(1, 1, 8),
            Err(FormatError::UnsupportedBitDepth(8))
        ));
    }

    #[test]
    fn test_rejects_short_input() {
        assert!(matches!(
            BitmapHeader::parse(&[b'B', b'M', 0, 0]),
            Err(FormatError::Truncated { needed: 54, actual: 4 })
        ));
    }
}
