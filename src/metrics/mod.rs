//! Prometheus metrics for the depth pipeline.
//!
//! # Metrics Exposed
//!
//! ## Frames
//! - `depth_topography_frames_rendered_total` - Frames colorized and rendered
//! - `depth_topography_frames_dropped_total` - Frames with mismatched dimensions
//! - `depth_topography_empty_polls_total` - Polls without a new frame
//! - `depth_topography_acquisition_failures_total` - Failed polls
//! - `depth_topography_frames_per_second` - Latest measured frame rate
//!
//! ## Recording
//! - `depth_topography_captures_written_total` - Periodic captures written
//! - `depth_topography_capture_failures_total` - Periodic captures that failed
//! - `depth_topography_next_frame_number` - Number of the next periodic capture
//!
//! ## Topography
//! - `depth_topography_extractions_completed_total` - Completed extractions
//! - `depth_topography_extractions_failed_total` - Failed extractions
//!
//! # Example
//!
//! ```no_run
//! use depth_topography::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot {
//!     frames_rendered: 120,
//!     captures_written: 2,
//!     next_frame_number: 3,
//!     fps: Some(30.0),
//!     ..Default::default()
//! };
//!
//! registry.update(&snapshot);
//! println!("{}", registry.encode().unwrap());
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
