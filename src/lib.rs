//! Counts discrete grain-shaped objects in grayscale images.
//!
//! The pipeline is a fixed linear sequence: median denoise, local
//! adaptive thresholding, morphological opening and closing, 8-connected
//! component labeling, and a strict minimum-area filter. [`pipeline`]
//! produces the count plus every intermediate artifact; [`render`] turns
//! those artifacts into overlays and a multi-panel report without ever
//! touching the count; [`batch`] drives both over a list of paths with a
//! per-image error boundary.

pub mod batch;
pub mod config;
pub mod filters;
pub mod labeling;
pub mod pipeline;
pub mod render;
pub mod synth;
