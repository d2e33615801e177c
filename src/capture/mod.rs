//! Depth input and session configuration.
//!
//! This module provides the sensor abstraction that delivers depth frames
//! and the configuration that fixes the session's frame geometry, recording
//! policy and extraction settings.

mod config;
mod frame;
mod sensor;

pub use config::{
    CaptureConfig, ConfigError, FileConfig, OutputConfig, RecorderConfig, TopographyConfig,
};
pub use frame::DepthFrame;
pub use sensor::{AcquisitionError, MockSensor, SensorSource};
