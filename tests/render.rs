use grain_counter::config::GrainConfig;
use grain_counter::pipeline::{PipelineResult, count_grains};
use grain_counter::render::{centroid_overlay, contour_overlay, render_report, valid_grain_mask};
use grain_counter::synth::synthetic_grains;
use image::{GrayImage, Luma, Rgb};

fn counted_disks() -> PipelineResult {
    let img = synthetic_grains(
        160,
        120,
        30,
        200,
        &[(40, 40, 12), (110, 70, 14)],
        0,
        0,
    );
    count_grains(&img, &GrainConfig::default()).expect("pipeline failed")
}

#[test]
fn mask_matches_valid_regions_exactly() {
    let result = counted_disks();
    assert!(result.count > 0, "fixture should detect grains");

    let mask = valid_grain_mask(&result.labels, &result.regions, &result.valid);
    assert_eq!(mask.dimensions(), result.labels.dimensions());

    let expected_area: u32 = result
        .valid
        .iter()
        .map(|&id| result.regions[id as usize].area)
        .sum();
    let mask_area = mask.pixels().filter(|p| p.0[0] != 0).count() as u32;
    assert_eq!(mask_area, expected_area);

    for (x, y, label) in result.labels.enumerate_pixels() {
        let in_valid = result.valid.contains(&label.0[0]);
        let lit = mask.get_pixel(x, y).0[0] != 0;
        assert_eq!(in_valid, lit, "mask mismatch at ({x}, {y})");
    }
}

#[test]
fn contour_overlay_marks_region_boundaries() {
    let result = counted_disks();
    let overlay = contour_overlay(&result.closed);
    assert_eq!(overlay.dimensions(), result.closed.dimensions());

    let green = overlay
        .pixels()
        .filter(|p| **p == Rgb([0, 255, 0]))
        .count();
    assert!(green > 0, "expected green contour pixels");
}

#[test]
fn centroid_overlay_marks_each_valid_centroid() {
    let result = counted_disks();
    let overlay = centroid_overlay(&result.closed, &result.regions, &result.valid)
        .expect("overlay failed");
    assert_eq!(overlay.dimensions(), result.closed.dimensions());

    for &id in &result.valid {
        let (cx, cy) = result.regions[id as usize].centroid;
        let px = overlay.get_pixel(cx.round() as u32, cy.round() as u32);
        assert_eq!(*px, Rgb([255, 0, 0]), "no marker at centroid of region {id}");
    }
}

#[test]
fn report_has_expected_layout_and_caption() {
    let result = counted_disks();
    let report = render_report(&result).expect("report failed");

    let (w, h) = result.original.dimensions();
    let margin = 8;
    let footer = 7 * 2 + 2 * margin;
    assert_eq!(report.width(), 4 * w + 5 * margin);
    assert_eq!(report.height(), 2 * h + 3 * margin + footer);

    // Footer band carries the stamped caption.
    let footer_top = 2 * h + 3 * margin;
    let white = (footer_top..report.height())
        .flat_map(|y| (0..report.width()).map(move |x| (x, y)))
        .filter(|&(x, y)| *report.get_pixel(x, y) == Rgb([255, 255, 255]))
        .count();
    assert!(white > 0, "caption was not stamped into the footer");
}

#[test]
fn caption_tracks_the_rendered_result() {
    let with_grains = counted_disks();
    let blank_image = GrayImage::from_pixel(160, 120, Luma([90]));
    let blank = count_grains(&blank_image, &GrainConfig::default()).expect("pipeline failed");
    assert_ne!(with_grains.count, blank.count, "fixtures must disagree on count");

    let a = render_report(&with_grains).expect("report failed");
    let b = render_report(&blank).expect("report failed");
    assert_eq!(a.dimensions(), b.dimensions());

    // Same layout, different counts: the footer stamps must differ.
    let footer_top = 2 * 120 + 3 * 8;
    let differing = (footer_top..a.height())
        .flat_map(|y| (0..a.width()).map(move |x| (x, y)))
        .filter(|&(x, y)| a.get_pixel(x, y) != b.get_pixel(x, y))
        .count();
    assert!(differing > 0, "footer caption did not change with the count");
}
