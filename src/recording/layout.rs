//! Output directory layout.
//!
//! ```text
//! <root>/frames/frame_<N>.bmp               periodic captures
//! <root>/results/<label>-<HH-MM-SS>.bmp     on-demand captures
//! <root>/results/topography.<ext>           derived artifacts
//! <root>/results/contours_with_image.<ext>
//! ```

use chrono::Timelike;
use std::io;
use std::path::{Path, PathBuf};

const FRAMES_DIR: &str = "frames";
const RESULTS_DIR: &str = "results";

/// Deterministic paths under an injected root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.root.join(FRAMES_DIR)
    }

    pub fn results_dir(&self) -> PathBuf {
        self.root.join(RESULTS_DIR)
    }

    /// Creates the `frames/` and `results/` directories if missing.
    pub fn prepare(&self) -> io::Result<()> {
        std::fs::create_dir_all(self.frames_dir())?;
        std::fs::create_dir_all(self.results_dir())
    }

    /// Path of periodic capture number `n`.
    pub fn frame_path(&self, n: u64) -> PathBuf {
        self.frames_dir().join(format!("frame_{n}.bmp"))
    }

    /// Path of an on-demand capture taken at wall-clock time `at`.
    pub fn capture_path(&self, label: &str, at: &impl Timelike) -> PathBuf {
        self.results_dir().join(format!(
            "{label}-{:02}-{:02}-{:02}.bmp",
            at.hour(),
            at.minute(),
            at.second()
        ))
    }

    /// Path of a named artifact in `results/`.
    pub fn result_path(&self, name: &str) -> PathBuf {
        self.results_dir().join(name)
    }
}
