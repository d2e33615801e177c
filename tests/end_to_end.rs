use depth_topography::{
    bitmap::{decode, encode},
    capture::{FileConfig, MockSensor},
    colorize, load_bitmap,
    pipeline::{FrameStatus, NullDisplay, Pipeline},
    recording::TickOutcome,
    Colorizer, DepthFrame, FrameBuffer,
};
use std::time::{Duration, Instant};

#[test]
fn two_by_two_frame_survives_encode_and_decode() {
    let samples = vec![0, 1000, 32768, 65535];
    let mut buffer = FrameBuffer::new(2, 2, Colorizer::default());
    buffer
        .update(&DepthFrame::new(samples.clone(), 2, 2, 0))
        .unwrap();

    let bytes = encode(buffer.pixels(), 2, 2, 24).unwrap();
    assert_eq!(bytes.len(), 54 + 12);

    let bitmap = decode(&bytes).unwrap();
    assert_eq!((bitmap.width, bitmap.height), (2, 2));
    let expected: Vec<_> = samples.into_iter().map(colorize).collect();
    assert_eq!(bitmap.pixels, expected);
}

#[test]
fn pipeline_records_and_extracts() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = FileConfig::default();
    config.capture.width = 64;
    config.capture.height = 48;
    config.recorder.interval_secs = 1.0;
    config.topography.artifact_extension = "png".to_string();
    config.output.root = dir.path().to_path_buf();

    let start = Instant::now();
    let sensor = MockSensor::new(&config.capture).idle_every(4);
    let mut pipeline = Pipeline::new(&config, sensor, NullDisplay::new(), start).unwrap();

    let mut captured = Vec::new();
    let mut extractions = Vec::new();
    for cycle in 0..12u32 {
        if cycle == 5 {
            pipeline.request_capture();
        }
        let report = pipeline.run_cycle(start + Duration::from_millis(500) * cycle);
        if let TickOutcome::Captured { frame, .. } = report.tick {
            captured.push(frame);
        }
        if let Some(result) = report.extraction {
            extractions.push(result.unwrap());
        }
        if cycle % 4 == 3 {
            assert!(matches!(report.frame, FrameStatus::NoFrame));
        }
    }

    assert!(!captured.is_empty());
    let expected: Vec<u64> = (1..=captured.len() as u64).collect();
    assert_eq!(captured, expected);
    for frame in &captured {
        let path = dir.path().join(format!("frames/frame_{frame}.bmp"));
        let bitmap = load_bitmap(&path).unwrap();
        assert_eq!((bitmap.width, bitmap.height), (64, 48));
    }

    assert_eq!(extractions.len(), 1);
    let report = &extractions[0];
    assert!(report.topography_path.is_file());
    assert!(report.overlay_path.is_file());
    assert!(dir.path().join("results/img_gray.png").is_file());
    assert!(dir.path().join("results/unedited_image.png").is_file());

    assert_eq!(pipeline.stats().empty_polls, 3);
}
