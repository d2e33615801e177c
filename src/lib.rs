//! Depth Topography Library
//!
//! Turns a live stream of 16-bit depth frames into false-color images,
//! archives them as uncompressed bitmaps on a fixed interval, and derives
//! topographic contour maps from on-demand captures.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! sensor → colorize → frame buffer → display
//!                          ↓
//!                      recording → bitmap files
//!                          ↓
//!                      topography → contour maps
//! ```
//!
//! [`pipeline::Pipeline`] drives one cooperative iteration of this flow
//! per call; every stage runs to completion before the next poll.
//!
//! # Example
//!
//! ```no_run
//! use depth_topography::{
//!     capture::{FileConfig, MockSensor},
//!     pipeline::{NullDisplay, Pipeline},
//! };
//! use std::time::Instant;
//!
//! let config = FileConfig::default();
//! let sensor = MockSensor::new(&config.capture);
//! let mut pipeline = Pipeline::new(&config, sensor, NullDisplay::new(), Instant::now()).unwrap();
//!
//! pipeline.request_capture();
//! for _ in 0..100 {
//!     let report = pipeline.run_cycle(Instant::now());
//!     if let Some(Ok(maps)) = report.extraction {
//!         println!("topography written to {}", maps.topography_path.display());
//!     }
//! }
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod bitmap;
pub mod capture;
pub mod colorize;
pub mod metrics;
pub mod pipeline;
pub mod recording;
pub mod topography;

// Re-export commonly used types at crate root
pub use bitmap::{load_bitmap, save_bitmap, Bitmap};
pub use capture::{DepthFrame, FileConfig, MockSensor, SensorSource};
pub use colorize::{colorize, Colorizer, FrameBuffer, PhaseMode, Rgb};
pub use pipeline::{DisplaySink, NullDisplay, Pipeline};
pub use recording::{OutputLayout, Recorder};
pub use topography::{TopographyExtractor, TopographyReport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
