//! Depth Topography CLI
//!
//! Runs the colorize/record/extract loop against the mock depth sensor,
//! or extracts contour maps from an existing capture.

use clap::{Parser, Subcommand};
use depth_topography::{
    capture::{FileConfig, MockSensor},
    metrics::{MetricsRegistry, MetricsSnapshot},
    pipeline::{NullDisplay, Pipeline},
    recording::OutputLayout,
    topography::TopographyExtractor,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Mock sensor frame period (~30 fps).
const FRAME_PERIOD: Duration = Duration::from_millis(33);

#[derive(Parser)]
#[command(name = "depth-topography", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the capture loop against the mock sensor
    Run {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Stop after this many cycles (runs until Ctrl-C otherwise)
        #[arg(short, long)]
        frames: Option<u64>,
        /// Request an on-demand capture and extraction at this cycle
        #[arg(long)]
        capture_at: Option<u64>,
    },
    /// Extract contour maps from an existing bitmap capture
    Extract {
        /// Bitmap to process
        bitmap: PathBuf,
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    info!("Depth Topography v{}", depth_topography::VERSION);

    match cli.command {
        Command::Run {
            config,
            frames,
            capture_at,
        } => run(&load_config(config.as_deref()), frames, capture_at),
        Command::Extract { bitmap, config } => extract(&load_config(config.as_deref()), &bitmap),
    }
}

fn load_config(path: Option<&Path>) -> FileConfig {
    let Some(path) = path else {
        return FileConfig::default();
    };
    match FileConfig::from_file(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn run(config: &FileConfig, frames: Option<u64>, capture_at: Option<u64>) {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    if let Err(e) = ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst)) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }

    let sensor = MockSensor::new(&config.capture);
    let mut pipeline = match Pipeline::new(config, sensor, NullDisplay::new(), Instant::now()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to start pipeline: {}", e);
            std::process::exit(1);
        }
    };

    info!("Processing frames from mock sensor...");

    let mut cycle = 0u64;
    while running.load(Ordering::SeqCst) && frames.map_or(true, |n| cycle < n) {
        if capture_at == Some(cycle) {
            pipeline.request_capture();
        }

        let report = pipeline.run_cycle(Instant::now());
        if let Some(Ok(maps)) = &report.extraction {
            info!(
                topography = %maps.topography_path.display(),
                overlay = %maps.overlay_path.display(),
                "Topography extracted"
            );
        }

        cycle += 1;
        std::thread::sleep(FRAME_PERIOD);
    }

    let stats = pipeline.stats();
    info!(
        "Processed {} cycles: {} frames rendered, {} captures written, {} failed",
        cycle, stats.frames_rendered, stats.captures_written, stats.capture_failures
    );

    match MetricsRegistry::new() {
        Ok(registry) => {
            registry.update(&MetricsSnapshot::from_pipeline(
                stats,
                pipeline.recorder().state(),
            ));
            match registry.encode() {
                Ok(text) => println!("{}", text),
                Err(e) => warn!("Failed to encode metrics: {}", e),
            }
        }
        Err(e) => warn!("Failed to create metrics registry: {}", e),
    }
}

fn extract(config: &FileConfig, bitmap: &Path) {
    let layout = OutputLayout::new(&config.output.root);
    if let Err(e) = layout.prepare() {
        eprintln!(
            "Failed to create output directories under {}: {}",
            layout.root().display(),
            e
        );
        std::process::exit(1);
    }

    let extractor = TopographyExtractor::new(&config.topography, layout);
    match extractor.extract(bitmap) {
        Ok(report) => {
            for (level, count) in &report.contour_counts {
                println!("level {:>3}: {} contours", level, count);
            }
            println!("topography: {}", report.topography_path.display());
            println!("overlay:    {}", report.overlay_path.display());
        }
        Err(e) => {
            eprintln!("Extraction failed: {}", e);
            std::process::exit(1);
        }
    }
}
