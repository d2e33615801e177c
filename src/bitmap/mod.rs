//! Uncompressed bitmap serialization.
//!
//! Captures are stored as plain BMP files: a 14-byte file header, a
//! 40-byte info header declaring top-down row order, and the raw pixel
//! payload with no compression.

mod codec;
mod file;
mod header;

pub use codec::{decode, encode, Bitmap, FormatError};
pub use file::{load_bitmap, save_bitmap, BitmapIoError};
pub use header::{BitmapHeader, HEADER_LEN};
