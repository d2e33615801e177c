//! Reading and writing bitmap files.

use super::codec::{self, Bitmap, FormatError};
use super::header::BitmapHeader;
use crate::colorize::Rgb;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from bitmap file operations.
///
/// A failed write may leave a partial file on disk; it must be treated as
/// corrupt.
#[derive(Debug, Error)]
pub enum BitmapIoError {
    #[error("cannot create {}: {source}", path.display())]
    Create { path: PathBuf, source: io::Error },
    #[error("failed writing {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("bitmap not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("failed reading {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("malformed bitmap {}: {source}", path.display())]
    Format { path: PathBuf, source: FormatError },
}

/// Writes pixels to `path` as a top-down bitmap, replacing any existing
/// file. Returns the number of bytes written.
pub fn save_bitmap(
    path: impl AsRef<Path>,
    pixels: &[Rgb],
    width: u32,
    height: u32,
    bits_per_pixel: u16,
) -> Result<u64, BitmapIoError> {
    let path = path.as_ref();
    let format_err = |source| BitmapIoError::Format {
        path: path.to_path_buf(),
        source,
    };

    let header = BitmapHeader::top_down(width, height, bits_per_pixel).map_err(format_err)?;
    if pixels.len() != width as usize * height as usize {
        return Err(format_err(FormatError::PixelCountMismatch {
            width,
            height,
            actual: pixels.len(),
        }));
    }

    let file = File::create(path).map_err(|source| BitmapIoError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let write_err = |source| BitmapIoError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut payload = Vec::with_capacity(header.image_size as usize);
    codec::write_payload(&mut payload, pixels, bits_per_pixel);

    let mut writer = BufWriter::new(file);
    writer.write_all(&header.to_bytes()).map_err(write_err)?;
    writer.write_all(&payload).map_err(write_err)?;
    writer.flush().map_err(write_err)?;

    let written = (header.pixel_offset + header.image_size) as u64;
    tracing::debug!(path = %path.display(), bytes = written, "Bitmap written");
    Ok(written)
}

/// Reads and decodes a bitmap file.
pub fn load_bitmap(path: impl AsRef<Path>) -> Result<Bitmap, BitmapIoError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            BitmapIoError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            BitmapIoError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    codec::decode(&bytes).map_err(|source| BitmapIoError::Format {
        path: path.to_path_buf(),
        source,
    })
}
