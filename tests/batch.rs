use std::fs;
use std::path::PathBuf;

use grain_counter::batch::{BatchOptions, Outcome, run_batch};
use grain_counter::config::GrainConfig;
use grain_counter::synth::synthetic_grains;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("grain_counter_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("failed to create scratch dir");
    dir
}

fn write_fixture(dir: &PathBuf, name: &str) -> PathBuf {
    let img = synthetic_grains(
        200,
        200,
        40,
        220,
        &[(40, 40, 10), (100, 100, 10), (160, 160, 10)],
        5,
        12345,
    );
    let path = dir.join(name);
    img.save(&path).expect("failed to save fixture");
    path
}

#[test]
fn bad_path_does_not_abort_the_batch() {
    let dir = scratch_dir("continue");
    let good = write_fixture(&dir, "good.png");
    let paths = vec![dir.join("missing.png"), good];

    let summary = run_batch(&paths, &GrainConfig::default(), &BatchOptions::default());

    assert_eq!(summary.images.len(), 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.processed, 1);
    assert!(matches!(summary.images[0].outcome, Outcome::Failed { .. }));
    match &summary.images[1].outcome {
        Outcome::Counted { grains, render_error } => {
            assert_eq!(*grains, 3);
            assert!(render_error.is_none());
        }
        other => panic!("expected a counted image, got {other:?}"),
    }
    assert_eq!(summary.total_grains, 3);
}

#[test]
fn report_and_stage_files_are_written() {
    let dir = scratch_dir("outputs");
    let good = write_fixture(&dir, "good.png");
    let options = BatchOptions {
        write_report: true,
        write_stages: true,
        out_dir: dir.join("out"),
    };

    let summary = run_batch(&[good], &GrainConfig::default(), &options);
    assert_eq!(summary.failed, 0);

    for name in [
        "grain_0_report.png",
        "grain_0_original.png",
        "grain_0_blurred.png",
        "grain_0_thresholded.png",
        "grain_0_opened.png",
        "grain_0_closed.png",
        "grain_0_valid_mask.png",
        "grain_0_contours.png",
        "grain_0_centroids.png",
    ] {
        assert!(options.out_dir.join(name).is_file(), "missing {name}");
    }
}

#[test]
fn render_failure_is_recorded_next_to_the_count() {
    let dir = scratch_dir("render_fail");
    let good = write_fixture(&dir, "good.png");

    // Output directory collides with an existing file, so every write
    // must fail while the count itself stays valid.
    let blocker = dir.join("blocked");
    fs::write(&blocker, b"not a directory").expect("failed to create blocker file");
    let options = BatchOptions {
        write_report: true,
        write_stages: false,
        out_dir: blocker,
    };

    let summary = run_batch(&[good], &GrainConfig::default(), &options);

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.total_grains, 3);
    match &summary.images[0].outcome {
        Outcome::Counted { grains, render_error } => {
            assert_eq!(*grains, 3);
            assert!(
                render_error.is_some(),
                "render failure must be recorded alongside the count"
            );
        }
        other => panic!("render failure must not replace the count, got {other:?}"),
    }
}

#[test]
fn summary_serializes_with_typed_outcomes() {
    let dir = scratch_dir("json");
    let good = write_fixture(&dir, "good.png");
    let paths = vec![good, dir.join("missing.png")];

    let summary = run_batch(&paths, &GrainConfig::default(), &BatchOptions::default());
    let json = serde_json::to_string_pretty(&summary).expect("serialization failed");

    assert!(json.contains("\"status\": \"counted\""));
    assert!(json.contains("\"status\": \"failed\""));
    assert!(json.contains("\"total_grains\": 3"));
}
