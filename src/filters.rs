//! Local adaptive thresholding and square-kernel morphology on grayscale
//! buffers.

use image::GrayImage;

/// 1D Gaussian weights for a window of `ksize` taps, normalized to sum 1.
/// Sigma follows the conventional rule for deriving it from the window
/// size: `0.3 * ((ksize - 1) * 0.5 - 1) + 0.8`.
fn gaussian_kernel(ksize: u32) -> Vec<f32> {
    let sigma = 0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (ksize as f32 - 1.0) / 2.0;
    let mut taps: Vec<f32> = (0..ksize)
        .map(|i| {
            let d = i as f32 - center;
            (-d * d / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = taps.iter().sum();
    for t in taps.iter_mut() {
        *t /= sum;
    }
    taps
}

/// Binarizes `src` against a per-pixel threshold: the Gaussian-weighted
/// mean of the surrounding `window`x`window` neighborhood plus `offset`.
///
/// A pixel becomes foreground (255) only if it is brighter than its local
/// mean by more than `offset`, so flat regions produce no foreground at
/// all. Neighborhoods that extend past the image replicate the edge
/// pixel. Even `window` sizes behave as the next odd size.
pub fn adaptive_threshold_gaussian(src: &GrayImage, window: u32, offset: f32) -> GrayImage {
    let (width, height) = src.dimensions();
    let radius = (window / 2) as i64;
    let taps = gaussian_kernel(2 * (window / 2) + 1);

    // Separable filter: horizontal pass into f32, then vertical pass
    // fused with the comparison.
    let mut rows = vec![0f32; width as usize * height as usize];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0f32;
            for (i, t) in taps.iter().enumerate() {
                let sx = (x as i64 + i as i64 - radius).clamp(0, width as i64 - 1);
                acc += t * src.get_pixel(sx as u32, y).0[0] as f32;
            }
            rows[y as usize * width as usize + x as usize] = acc;
        }
    }

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut mean = 0f32;
            for (i, t) in taps.iter().enumerate() {
                let sy = (y as i64 + i as i64 - radius).clamp(0, height as i64 - 1);
                mean += t * rows[sy as usize * width as usize + x as usize];
            }
            let value = src.get_pixel(x, y).0[0] as f32;
            out.put_pixel(x, y, image::Luma([if value > mean + offset { 255 } else { 0 }]));
        }
    }
    out
}

/// Erosion with a `ksize`x`ksize` square element anchored at
/// `(ksize - 1) / 2`. Pixels whose window leaves the image erode to
/// background.
pub fn erode(src: &GrayImage, ksize: u32) -> GrayImage {
    let (width, height) = src.dimensions();
    let anchor = (ksize as i64 - 1) / 2;
    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut keep = true;
            'window: for dy in -anchor..(ksize as i64 - anchor) {
                for dx in -anchor..(ksize as i64 - anchor) {
                    let sx = x as i64 + dx;
                    let sy = y as i64 + dy;
                    if sx < 0
                        || sy < 0
                        || sx >= width as i64
                        || sy >= height as i64
                        || src.get_pixel(sx as u32, sy as u32).0[0] == 0
                    {
                        keep = false;
                        break 'window;
                    }
                }
            }
            out.put_pixel(x, y, image::Luma([if keep { 255 } else { 0 }]));
        }
    }
    out
}

/// Dilation with the reflection of the `ksize`x`ksize` element used by
/// [`erode`], so that opening and closing are translation-free even for
/// even-sized elements.
pub fn dilate(src: &GrayImage, ksize: u32) -> GrayImage {
    let (width, height) = src.dimensions();
    let anchor = (ksize as i64 - 1) / 2;
    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut hit = false;
            'window: for dy in -(ksize as i64 - 1 - anchor)..=anchor {
                for dx in -(ksize as i64 - 1 - anchor)..=anchor {
                    let sx = x as i64 + dx;
                    let sy = y as i64 + dy;
                    if sx >= 0
                        && sy >= 0
                        && sx < width as i64
                        && sy < height as i64
                        && src.get_pixel(sx as u32, sy as u32).0[0] != 0
                    {
                        hit = true;
                        break 'window;
                    }
                }
            }
            out.put_pixel(x, y, image::Luma([if hit { 255 } else { 0 }]));
        }
    }
    out
}

/// Erosion followed by dilation. Removes speckles smaller than the
/// structuring element.
pub fn open(src: &GrayImage, ksize: u32) -> GrayImage {
    dilate(&erode(src, ksize), ksize)
}

/// Dilation followed by erosion. Fills holes smaller than the structuring
/// element.
pub fn close(src: &GrayImage, ksize: u32) -> GrayImage {
    erode(&dilate(src, ksize), ksize)
}
