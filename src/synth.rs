//! Deterministic synthetic grain images for the demo flag and the test
//! suite. No RNG dependency; the noise comes from a fixed-seed LCG so
//! runs are reproducible byte-for-byte.

use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_circle_mut;

/// A filled disk standing in for one grain: center and radius in pixels.
pub type Disk = (i32, i32, i32);

/// Renders filled disks of intensity `grain_value` on a flat `background`,
/// then adds uniform noise in `[-noise_amplitude, +noise_amplitude]` to
/// every pixel.
pub fn synthetic_grains(
    width: u32,
    height: u32,
    background: u8,
    grain_value: u8,
    disks: &[Disk],
    noise_amplitude: u8,
    seed: u32,
) -> GrayImage {
    let mut img = GrayImage::from_pixel(width, height, Luma([background]));
    for &(cx, cy, radius) in disks {
        draw_filled_circle_mut(&mut img, (cx, cy), radius, Luma([grain_value]));
    }

    if noise_amplitude > 0 {
        let span = 2 * noise_amplitude as u32 + 1;
        let mut state = seed;
        for pixel in img.pixels_mut() {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            let noise = ((state >> 16) % span) as i16 - noise_amplitude as i16;
            pixel.0[0] = (pixel.0[0] as i16 + noise).clamp(0, 255) as u8;
        }
    }
    img
}
