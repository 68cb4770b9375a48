//! Pipeline parameters. Every constant the counting pipeline embeds lives
//! here so tests and the CLI can override them without touching the stages.

use imageproc::region_labelling::Connectivity;

const MEDIAN_KERNEL_SIZE: u32 = 5;
const ADAPTIVE_WINDOW_SIZE: u32 = 11;
const ADAPTIVE_CONSTANT: f32 = 2.0;
const MORPH_KERNEL_SIZE: u32 = 2;
const MIN_AREA: u32 = 50;

/// Configuration for one run of the grain-counting pipeline.
///
/// Defaults reproduce the reference parameter set: 5x5 median window,
/// 11x11 adaptive threshold window with offset 2, 2x2 structuring element,
/// 8-connectivity, 50-pixel minimum area.
#[derive(Debug, Clone)]
pub struct GrainConfig {
    /// Side length of the median denoise window.
    pub median_kernel_size: u32,
    /// Side length of the Gaussian-weighted threshold neighborhood.
    /// Even sizes behave as the next odd size.
    pub adaptive_window_size: u32,
    /// A pixel is foreground only if it exceeds its local weighted mean
    /// by more than this offset.
    pub adaptive_constant: f32,
    /// Side length of the square structuring element for open/close.
    pub morph_kernel_size: u32,
    /// Adjacency rule for component labeling.
    pub connectivity: Connectivity,
    /// Regions must strictly exceed this pixel area to count as grains.
    pub min_area: u32,
}

impl Default for GrainConfig {
    fn default() -> Self {
        Self {
            median_kernel_size: MEDIAN_KERNEL_SIZE,
            adaptive_window_size: ADAPTIVE_WINDOW_SIZE,
            adaptive_constant: ADAPTIVE_CONSTANT,
            morph_kernel_size: MORPH_KERNEL_SIZE,
            connectivity: Connectivity::Eight,
            min_area: MIN_AREA,
        }
    }
}
