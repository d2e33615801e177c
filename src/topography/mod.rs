//! Topographic contour extraction from a captured frame.
//!
//! The pipeline runs strictly in order and stops at the first failing
//! stage:
//!
//! ```text
//! load bitmap → luminance → binarize per level → trace borders
//!     → draw overlay + topography map → persist
//! ```
//!
//! Files written by stages that completed before a failure stay on disk.

mod contour;
mod draw;
mod grayscale;
mod threshold;

pub use contour::{find_contours, BoundingBox, Contour, Point};
pub use draw::{draw_closed_polyline, draw_contours};
pub use grayscale::{luminance, to_luminance, to_rgb_image};
pub use threshold::{binarize, ThresholdSet, FOREGROUND};

use crate::bitmap::{load_bitmap, Bitmap, BitmapIoError};
use crate::capture::TopographyConfig;
use crate::recording::OutputLayout;
use image::{GrayImage, Luma, RgbImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Overlay stroke on the color image.
pub const OVERLAY_STROKE: image::Rgb<u8> = image::Rgb([0, 0, 0]);
/// Stroke on the blank topography canvas.
pub const MAP_STROKE: Luma<u8> = Luma([255]);

const TOPOGRAPHY_STEM: &str = "topography";
const OVERLAY_STEM: &str = "contours_with_image";
const UNEDITED_NAME: &str = "unedited_image.png";
const GRAY_NAME: &str = "img_gray.png";

/// Errors that abort an extraction.
#[derive(Debug, Error)]
pub enum TopographyError {
    #[error("failed to load capture: {0}")]
    Load(#[from] BitmapIoError),
    #[error("failed to save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Contours found at one threshold level.
#[derive(Debug, Clone)]
pub struct ContourLevel {
    pub level: u8,
    pub contours: Vec<Contour>,
}

/// In-memory extraction result.
pub struct TopographyMaps {
    /// Luminance of the source image.
    pub gray: GrayImage,
    /// Source image with contours drawn over it.
    pub overlay: RgbImage,
    /// Contours alone on a black canvas.
    pub topography: GrayImage,
    /// Per-level contours in drawing order.
    pub levels: Vec<ContourLevel>,
}

impl TopographyMaps {
    /// Total number of contours across all levels.
    pub fn contour_count(&self) -> usize {
        self.levels.iter().map(|l| l.contours.len()).sum()
    }
}

/// Summary of a persisted extraction.
#[derive(Debug, Clone)]
pub struct TopographyReport {
    pub source: PathBuf,
    pub topography_path: PathBuf,
    pub overlay_path: PathBuf,
    /// `(level, contour count)` in drawing order.
    pub contour_counts: Vec<(u8, usize)>,
}

/// Derives contour maps from captured frames.
#[derive(Debug, Clone)]
pub struct TopographyExtractor {
    thresholds: ThresholdSet,
    stroke_width: u8,
    extension: String,
    save_intermediates: bool,
    layout: OutputLayout,
}

impl TopographyExtractor {
    pub fn new(config: &TopographyConfig, layout: OutputLayout) -> Self {
        Self {
            thresholds: ThresholdSet::new(config.thresholds.clone()),
            stroke_width: config.stroke_width.max(1),
            extension: config.artifact_extension.to_ascii_lowercase(),
            save_intermediates: config.save_intermediates,
            layout,
        }
    }

    pub fn thresholds(&self) -> &ThresholdSet {
        &self.thresholds
    }

    /// Path the topography map is written to.
    pub fn topography_path(&self) -> PathBuf {
        self.layout
            .result_path(&format!("{TOPOGRAPHY_STEM}.{}", self.extension))
    }

    /// Path the overlay is written to.
    pub fn overlay_path(&self) -> PathBuf {
        self.layout
            .result_path(&format!("{OVERLAY_STEM}.{}", self.extension))
    }

    /// Runs the full pipeline on a bitmap file and persists the results.
    pub fn extract(&self, source: impl AsRef<Path>) -> Result<TopographyReport, TopographyError> {
        let source = source.as_ref();
        let bitmap = load_bitmap(source)?;
        tracing::debug!(
            path = %source.display(),
            width = bitmap.width,
            height = bitmap.height,
            "Capture loaded"
        );

        let color = to_rgb_image(&bitmap);
        if self.save_intermediates {
            save(&color, self.layout.result_path(UNEDITED_NAME))?;
        }

        let gray = to_luminance(&bitmap);
        if self.save_intermediates {
            save(&gray, self.layout.result_path(GRAY_NAME))?;
        }

        let maps = self.render(color, gray);

        let topography_path = self.topography_path();
        save(&maps.topography, topography_path.clone())?;
        let overlay_path = self.overlay_path();
        save(&maps.overlay, overlay_path.clone())?;

        let contour_counts: Vec<(u8, usize)> = maps
            .levels
            .iter()
            .map(|l| (l.level, l.contours.len()))
            .collect();
        tracing::info!(
            source = %source.display(),
            contours = maps.contour_count(),
            levels = ?contour_counts,
            "Contour maps saved to {}",
            self.layout.results_dir().display()
        );

        Ok(TopographyReport {
            source: source.to_path_buf(),
            topography_path,
            overlay_path,
            contour_counts,
        })
    }

    /// Runs the in-memory stages on a decoded bitmap.
    pub fn extract_bitmap(&self, bitmap: &Bitmap) -> TopographyMaps {
        self.render(to_rgb_image(bitmap), to_luminance(bitmap))
    }

    fn render(&self, color: RgbImage, gray: GrayImage) -> TopographyMaps {
        let levels: Vec<ContourLevel> = self
            .thresholds
            .levels()
            .iter()
            .map(|&level| {
                let contours = find_contours(&binarize(&gray, level));
                tracing::trace!(level, contours = contours.len(), "Level traced");
                ContourLevel { level, contours }
            })
            .collect();

        let mut overlay = color;
        let mut topography = GrayImage::new(gray.width(), gray.height());
        // Later levels paint over earlier ones.
        for level in &levels {
            draw_contours(&mut overlay, &level.contours, OVERLAY_STROKE, self.stroke_width);
            draw_contours(&mut topography, &level.contours, MAP_STROKE, self.stroke_width);
        }

        TopographyMaps {
            gray,
            overlay,
            topography,
            levels,
        }
    }
}

fn save<P, C>(image: &image::ImageBuffer<P, C>, path: PathBuf) -> Result<(), TopographyError>
where
    P: image::PixelWithColorType,
    [P::Subpixel]: image::EncodableLayout,
    C: std::ops::Deref<Target = [P::Subpixel]>,
{
    image
        .save(&path)
        .map_err(|source| TopographyError::Save { path, source })
}
