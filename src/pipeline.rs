//! The grain-counting pipeline: denoise, adaptive threshold, morphological
//! cleanup, component labeling, area filter.

use std::path::{Path, PathBuf};

use image::GrayImage;
use imageproc::filter::median_filter;

use crate::config::GrainConfig;
use crate::filters;
use crate::labeling::{self, LabelMap, RegionStats};

/// Failure to obtain a usable grayscale image. Fatal for the affected
/// image only; the batch driver continues with the next path.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot load image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("empty image ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

/// Every artifact of one pipeline run, by name.
///
/// All rasters share the source image's dimensions. `regions` is indexed
/// by label (0 is background), `valid` holds the labels whose area
/// exceeds the configured minimum, and `count == valid.len()`.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub original: GrayImage,
    pub blurred: GrayImage,
    pub thresholded: GrayImage,
    pub opened: GrayImage,
    pub closed: GrayImage,
    pub labels: LabelMap,
    pub regions: Vec<RegionStats>,
    pub valid: Vec<u32>,
    pub count: usize,
}

/// Decodes the image at `path` as 8-bit grayscale.
pub fn load_image(path: &Path) -> Result<GrayImage, LoadError> {
    let img = image::open(path)
        .map_err(|source| LoadError::Decode { path: path.to_path_buf(), source })?
        .to_luma8();
    if img.width() == 0 || img.height() == 0 {
        return Err(LoadError::Empty {
            width: img.width(),
            height: img.height(),
        });
    }
    Ok(img)
}

/// Runs the full pipeline on one grayscale image.
///
/// The stage sequence is fixed: 5x5 median denoise, Gaussian-weighted
/// local threshold, morphological opening then closing, 8-connected
/// labeling, strict area filter (all sizes per `config`). Every stage is
/// total over a non-empty image; only an empty input fails.
pub fn count_grains(image: &GrayImage, config: &GrainConfig) -> Result<PipelineResult, LoadError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(LoadError::Empty {
            width: image.width(),
            height: image.height(),
        });
    }

    let radius = config.median_kernel_size / 2;
    let blurred = median_filter(image, radius, radius);

    let thresholded = filters::adaptive_threshold_gaussian(
        &blurred,
        config.adaptive_window_size,
        config.adaptive_constant,
    );

    // Opening first: speckle removed before closing can enlarge it.
    let opened = filters::open(&thresholded, config.morph_kernel_size);
    let closed = filters::close(&opened, config.morph_kernel_size);

    let (labels, regions) = labeling::label_regions(&closed, config.connectivity);
    let valid = labeling::filter_by_area(&regions, config.min_area);
    let count = valid.len();

    Ok(PipelineResult {
        original: image.clone(),
        blurred,
        thresholded,
        opened,
        closed,
        labels,
        regions,
        valid,
        count,
    })
}
