//! Batch driver: runs the pipeline over a list of paths one at a time,
//! with a per-image error boundary so one bad image never aborts the
//! rest, and aggregates a serializable summary.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::GrainConfig;
use crate::pipeline::{self, LoadError, PipelineResult};
use crate::render::{self, RenderError};

/// What to write per successfully counted image.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Write the 8-panel report PNG.
    pub write_report: bool,
    /// Write every intermediate stage and overlay as its own PNG.
    pub write_stages: bool,
    /// Directory receiving all output files.
    pub out_dir: PathBuf,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            write_report: false,
            write_stages: false,
            out_dir: PathBuf::from("output"),
        }
    }
}

/// Typed per-image outcome. A render failure is reported alongside the
/// count rather than replacing it: the count is already computed and
/// stays valid.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Counted {
        grains: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        render_error: Option<String>,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    pub path: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Aggregate result of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub images: Vec<ImageReport>,
    pub processed: usize,
    pub failed: usize,
    pub total_grains: usize,
}

/// Processes `paths` strictly in order. Each image's count goes to
/// stdout; each failure goes to stderr with the offending path and is
/// recorded in the summary, after which the batch continues.
pub fn run_batch(paths: &[PathBuf], config: &GrainConfig, options: &BatchOptions) -> BatchSummary {
    let mut images = Vec::with_capacity(paths.len());

    for (index, path) in paths.iter().enumerate() {
        let outcome = match process_image(path, config) {
            Ok(result) => {
                println!("{}: {} grains", path.display(), result.count);
                let render_error = match write_outputs(&result, index, options) {
                    Ok(()) => None,
                    Err(e) => {
                        eprintln!("rendering failed for {}: {e}", path.display());
                        Some(e.to_string())
                    }
                };
                Outcome::Counted { grains: result.count, render_error }
            }
            Err(e) => {
                eprintln!("error processing {}: {e}", path.display());
                Outcome::Failed { error: e.to_string() }
            }
        };
        images.push(ImageReport {
            path: path.display().to_string(),
            outcome,
        });
    }

    let processed = images
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Counted { .. }))
        .count();
    let total_grains = images
        .iter()
        .filter_map(|r| match r.outcome {
            Outcome::Counted { grains, .. } => Some(grains),
            Outcome::Failed { .. } => None,
        })
        .sum();
    let failed = images.len() - processed;

    BatchSummary {
        images,
        processed,
        failed,
        total_grains,
    }
}

fn process_image(path: &Path, config: &GrainConfig) -> Result<PipelineResult, LoadError> {
    let image = pipeline::load_image(path)?;
    pipeline::count_grains(&image, config)
}

fn write_outputs(
    result: &PipelineResult,
    index: usize,
    options: &BatchOptions,
) -> Result<(), RenderError> {
    if !options.write_report && !options.write_stages {
        return Ok(());
    }
    fs::create_dir_all(&options.out_dir).map_err(|source| RenderError::Io {
        path: options.out_dir.clone(),
        source,
    })?;

    if options.write_report {
        let report = render::render_report(result)?;
        save_rgb(&report, &options.out_dir.join(format!("grain_{index}_report.png")))?;
    }

    if options.write_stages {
        let stages = [
            ("original", &result.original),
            ("blurred", &result.blurred),
            ("thresholded", &result.thresholded),
            ("opened", &result.opened),
            ("closed", &result.closed),
        ];
        for (name, stage) in stages {
            let out = options.out_dir.join(format!("grain_{index}_{name}.png"));
            stage
                .save(&out)
                .map_err(|source| RenderError::Encode { path: out, source })?;
        }

        let mask = render::valid_grain_mask(&result.labels, &result.regions, &result.valid);
        let out = options.out_dir.join(format!("grain_{index}_valid_mask.png"));
        mask.save(&out)
            .map_err(|source| RenderError::Encode { path: out, source })?;

        let contours = render::contour_overlay(&result.closed);
        save_rgb(&contours, &options.out_dir.join(format!("grain_{index}_contours.png")))?;

        let centroids = render::centroid_overlay(&result.closed, &result.regions, &result.valid)?;
        save_rgb(&centroids, &options.out_dir.join(format!("grain_{index}_centroids.png")))?;
    }

    Ok(())
}

fn save_rgb(image: &image::RgbImage, path: &Path) -> Result<(), RenderError> {
    image.save(path).map_err(|source| RenderError::Encode {
        path: path.to_path_buf(),
        source,
    })
}
