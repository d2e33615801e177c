//! Depth frame type representing one sensor acquisition with metadata.

/// A single depth frame delivered by a sensor source.
///
/// Holds one unsigned 16-bit distance measurement per pixel, row-major,
/// along with the reliability bounds reported by the sensor.
#[derive(Clone)]
pub struct DepthFrame {
    /// Raw depth samples.
    samples: Vec<u16>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Minimum reliable depth reported by the sensor.
    min_reliable: u16,
    /// Maximum reliable depth reported by the sensor.
    max_reliable: u16,
    /// Sensor-relative timestamp.
    timestamp: i64,
}

impl DepthFrame {
    /// Creates a new frame with the given parameters.
    pub fn new(samples: Vec<u16>, width: u32, height: u32, timestamp: i64) -> Self {
        Self {
            samples,
            width,
            height,
            min_reliable: 0,
            max_reliable: u16::MAX,
            timestamp,
        }
    }

    /// Sets the reliability bounds reported by the sensor.
    pub fn with_reliable_range(mut self, min: u16, max: u16) -> Self {
        self.min_reliable = min;
        self.max_reliable = max;
        self
    }

    /// Returns the raw depth samples.
    #[inline]
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the sensor-relative timestamp.
    #[inline]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Returns the reliability bounds as reported by the sensor.
    #[inline]
    pub fn reported_range(&self) -> (u16, u16) {
        (self.min_reliable, self.max_reliable)
    }

    /// Returns the depth range used for coloring.
    ///
    /// The maximum is widened to the full 16-bit range so that far-field
    /// samples the sensor marks as unreliable are still visualized.
    #[inline]
    pub fn effective_range(&self) -> (u16, u16) {
        (self.min_reliable, u16::MAX)
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Validates that the sample buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.samples.len() == self.pixel_count()
    }
}

impl std::fmt::Debug for DepthFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepthFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("timestamp", &self.timestamp)
            .field("reliable", &(self.min_reliable, self.max_reliable))
            .field("samples", &self.samples.len())
            .finish()
    }
}
