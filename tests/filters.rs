use grain_counter::filters::adaptive_threshold_gaussian;
use image::{GrayImage, Luma};

/// A horizontal band on a non-square image: every row is constant along
/// x, so the thresholded output must be too. Any error in the row-buffer
/// stride arithmetic scrambles columns and breaks this exactly.
#[test]
fn threshold_preserves_row_constancy_on_non_square_images() {
    let (width, height) = (9u32, 40u32);
    let mut img = GrayImage::from_pixel(width, height, Luma([20]));
    for y in 15..25 {
        for x in 0..width {
            img.put_pixel(x, y, Luma([220]));
        }
    }

    let out = adaptive_threshold_gaussian(&img, 11, 2.0);
    assert_eq!(out.dimensions(), (width, height));

    for y in 0..height {
        let first = out.get_pixel(0, y).0[0];
        for x in 1..width {
            assert_eq!(
                out.get_pixel(x, y).0[0],
                first,
                "row {y} is not constant along x"
            );
        }
    }

    // Band edges stand out against their local mean; far rows do not.
    assert_eq!(out.get_pixel(0, 0).0[0], 0);
    assert_eq!(out.get_pixel(0, height - 1).0[0], 0);
    assert!(
        out.pixels().any(|p| p.0[0] != 0),
        "band edges should be foreground"
    );
}
