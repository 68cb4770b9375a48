//! Presentation layer: turns pipeline artifacts into overlay images and
//! the multi-panel report. Nothing here can change the count.

use std::path::PathBuf;

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::contours::{BorderType, find_contours};
use plotters::prelude::*;

use crate::labeling::{LabelMap, RegionStats};
use crate::pipeline::PipelineResult;

const CONTOUR_GREEN: Rgb<u8> = Rgb([0, 255, 0]);
const CENTROID_RED: RGBColor = RGBColor(255, 0, 0);
const CENTROID_RADIUS: i32 = 4;
const PANEL_MARGIN: u32 = 8;
const TEXT_SCALE: u32 = 2;

/// Failure while drawing or encoding a visualization. Never affects the
/// computed count; the batch driver logs it and moves on.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("drawing failed: {0}")]
    Draw(String),
    #[error("could not write {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("could not create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn gray_to_rgb(src: &GrayImage) -> RgbImage {
    let mut out = RgbImage::new(src.width(), src.height());
    for (x, y, p) in src.enumerate_pixels() {
        let v = p.0[0];
        out.put_pixel(x, y, Rgb([v, v, v]));
    }
    out
}

/// Binary image that is foreground exactly where the label map holds a
/// valid grain identifier.
pub fn valid_grain_mask(labels: &LabelMap, regions: &[RegionStats], valid: &[u32]) -> GrayImage {
    let mut keep = vec![false; regions.len()];
    for &id in valid {
        if let Some(flag) = keep.get_mut(id as usize) {
            *flag = true;
        }
    }
    let mut mask = GrayImage::new(labels.width(), labels.height());
    for (x, y, label) in labels.enumerate_pixels() {
        if keep.get(label.0[0] as usize).copied().unwrap_or(false) {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
    mask
}

/// External contours of the cleaned binary image drawn in green over a
/// color copy of it.
pub fn contour_overlay(closed: &GrayImage) -> RgbImage {
    let mut canvas = gray_to_rgb(closed);
    for contour in find_contours::<i32>(closed) {
        if contour.border_type != BorderType::Outer {
            continue;
        }
        for point in &contour.points {
            if point.x >= 0
                && point.y >= 0
                && (point.x as u32) < canvas.width()
                && (point.y as u32) < canvas.height()
            {
                canvas.put_pixel(point.x as u32, point.y as u32, CONTOUR_GREEN);
            }
        }
    }
    canvas
}

/// Filled red marker at each valid grain's centroid over a color copy of
/// the cleaned binary image.
pub fn centroid_overlay(
    closed: &GrayImage,
    regions: &[RegionStats],
    valid: &[u32],
) -> Result<RgbImage, RenderError> {
    let (width, height) = closed.dimensions();
    let mut rgb = gray_to_rgb(closed).into_raw();
    {
        let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
        for &id in valid {
            let Some(stats) = regions.get(id as usize) else {
                continue;
            };
            let x = (stats.centroid.0.round() as i32).clamp(0, width.saturating_sub(1) as i32);
            let y = (stats.centroid.1.round() as i32).clamp(0, height.saturating_sub(1) as i32);
            root.draw(&Circle::new((x, y), CENTROID_RADIUS, CENTROID_RED.filled()))
                .map_err(|e| RenderError::Draw(e.to_string()))?;
        }
        root.present().map_err(|e| RenderError::Draw(e.to_string()))?;
    }
    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| RenderError::Draw("overlay buffer size mismatch".to_string()))
}

/// Arranges the eight artifacts of one run into a 2x4 montage with a
/// `GRAINS: n` footer. The count stamped is always the one belonging to
/// the rendered result, never a value carried over from another image.
pub fn render_report(result: &PipelineResult) -> Result<RgbImage, RenderError> {
    let mask = valid_grain_mask(&result.labels, &result.regions, &result.valid);
    let contours = contour_overlay(&result.closed);
    let centroids = centroid_overlay(&result.closed, &result.regions, &result.valid)?;

    let panels: [RgbImage; 8] = [
        gray_to_rgb(&result.original),
        gray_to_rgb(&result.blurred),
        gray_to_rgb(&result.thresholded),
        gray_to_rgb(&result.opened),
        gray_to_rgb(&result.closed),
        gray_to_rgb(&mask),
        contours,
        centroids,
    ];

    let (pw, ph) = result.original.dimensions();
    let footer = GLYPH_HEIGHT * TEXT_SCALE + 2 * PANEL_MARGIN;
    let width = 4 * pw + 5 * PANEL_MARGIN;
    let height = 2 * ph + 3 * PANEL_MARGIN + footer;

    let mut report = RgbImage::from_pixel(width, height, Rgb([24, 24, 24]));
    for (i, panel) in panels.iter().enumerate() {
        let col = (i % 4) as u32;
        let row = (i / 4) as u32;
        let ox = PANEL_MARGIN + col * (pw + PANEL_MARGIN);
        let oy = PANEL_MARGIN + row * (ph + PANEL_MARGIN);
        for (x, y, p) in panel.enumerate_pixels() {
            report.put_pixel(ox + x, oy + y, *p);
        }
    }

    let caption = format!("GRAINS: {}", result.count);
    stamp_text(
        &mut report,
        &caption,
        PANEL_MARGIN,
        2 * ph + 3 * PANEL_MARGIN,
        TEXT_SCALE,
        Rgb([255, 255, 255]),
    );
    Ok(report)
}

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

// 5x7 glyphs, one byte per row, bit 4 leftmost. Only the characters the
// footer caption needs.
fn glyph(ch: char) -> [u8; 7] {
    match ch {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        ':' => [0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b00000, 0b00000],
        _ => [0; 7],
    }
}

fn stamp_text(canvas: &mut RgbImage, text: &str, x: u32, y: u32, scale: u32, color: Rgb<u8>) {
    let mut cursor = x;
    for ch in text.chars() {
        let rows = glyph(ch);
        for (gy, row) in rows.iter().copied().enumerate() {
            for gx in 0..GLYPH_WIDTH {
                if row & (1u8 << (GLYPH_WIDTH - 1 - gx)) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let px = cursor + gx * scale + sx;
                        let py = y + gy as u32 * scale + sy;
                        if px < canvas.width() && py < canvas.height() {
                            canvas.put_pixel(px, py, color);
                        }
                    }
                }
            }
        }
        cursor += (GLYPH_WIDTH + 1) * scale;
    }
}
