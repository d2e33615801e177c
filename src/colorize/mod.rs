//! Depth colorization and the shared frame buffer.
//!
//! Each incoming depth frame is mapped sample by sample to false color
//! and written into a single long-lived buffer that the display and the
//! recorder read from.

mod buffer;
mod phase;

pub use buffer::{DimensionMismatch, FrameBuffer};
pub use phase::{colorize, Colorizer, PhaseMode, Rgb, SPECTRUM_WIDTH};
