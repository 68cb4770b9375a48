//! Connected-component labeling and per-region statistics.

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};

/// Region identifiers per pixel; 0 is background, 1..N are components.
pub type LabelMap = ImageBuffer<Luma<u32>, Vec<u32>>;

/// Area, bounding box, and centroid of one labeled region.
///
/// Stored in a `Vec` indexed by label so that the label map, the stats,
/// and the centroids share one identifier space. Index 0 is an inert
/// background entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionStats {
    pub area: u32,
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub centroid: (f32, f32),
}

impl RegionStats {
    fn empty() -> Self {
        Self {
            area: 0,
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
            centroid: (0.0, 0.0),
        }
    }
}

/// Labels the foreground of a binary image and computes each region's
/// area, bounding box, and centroid in a single accumulation pass.
pub fn label_regions(binary: &GrayImage, connectivity: Connectivity) -> (LabelMap, Vec<RegionStats>) {
    let labels = connected_components(binary, connectivity, Luma([0u8]));

    let max_label = labels.pixels().map(|p| p.0[0]).max().unwrap_or(0);
    let mut stats = vec![RegionStats::empty(); max_label as usize + 1];
    let mut sums = vec![(0u64, 0u64); max_label as usize + 1];

    for (x, y, label) in labels.enumerate_pixels() {
        let id = label.0[0] as usize;
        if id == 0 {
            continue;
        }
        let s = &mut stats[id];
        if s.area == 0 {
            s.left = x;
            s.top = y;
            s.right = x;
            s.bottom = y;
        } else {
            s.left = s.left.min(x);
            s.top = s.top.min(y);
            s.right = s.right.max(x);
            s.bottom = s.bottom.max(y);
        }
        s.area += 1;
        sums[id].0 += x as u64;
        sums[id].1 += y as u64;
    }

    for (s, &(sx, sy)) in stats.iter_mut().zip(&sums).skip(1) {
        if s.area > 0 {
            s.centroid = (sx as f32 / s.area as f32, sy as f32 / s.area as f32);
        }
    }

    (labels, stats)
}

/// Labels whose area strictly exceeds `min_area`, in ascending label
/// order. Background (label 0) is never included.
pub fn filter_by_area(stats: &[RegionStats], min_area: u32) -> Vec<u32> {
    stats
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, s)| s.area > min_area)
        .map(|(id, _)| id as u32)
        .collect()
}
