// src/render.rs
//
// Pure presentation. Consumes the frame, the mask, and the decision
// record; never touches detector state.

use crate::types::{DecisionInfo, Direction};
use anyhow::{Context, Result};
use chrono::Local;
use image::{Rgb, RgbImage};
use ndarray::{Array2, Array3};
use std::path::Path;
use tracing::info;

// ============================================================================
// RENDER CONSTANTS
// ============================================================================

/// Zone centroid markers drawn on the overlay, largest zones first.
const MARKED_ZONES: usize = 3;

const ZONE_MARKER_RADIUS: i64 = 8;

/// Height of the heading strip along the bottom edge, pixels.
const HEADING_STRIP_PX: u32 = 12;

const COLOR_OBSTACLE: Rgb<u8> = Rgb([220, 30, 30]);
const COLOR_ZONE: Rgb<u8> = Rgb([40, 200, 60]);
const COLOR_INVALID: Rgb<u8> = Rgb([20, 20, 20]);

/// Map a cleaned depth frame to a JET-style false-color image.
/// Depth is normalized by `far`; invalid (NaN) pixels render dark.
pub fn render_depth(depth: &Array2<f32>, far: f32) -> RgbImage {
    let (rows, cols) = depth.dim();
    let mut img = RgbImage::new(cols as u32, rows as u32);
    for ((row, col), &d) in depth.indexed_iter() {
        let pixel = if d.is_finite() {
            jet((d / far).clamp(0.0, 1.0))
        } else {
            COLOR_INVALID
        };
        img.put_pixel(col as u32, row as u32, pixel);
    }
    img
}

/// Depth colormap with the decision painted on top: red obstacle
/// pixels, green markers on the largest zones, and a heading strip
/// along the bottom edge.
pub fn render_overlay(
    depth: &Array2<f32>,
    mask: &Array2<u8>,
    info: &DecisionInfo,
    far: f32,
) -> RgbImage {
    let mut img = render_depth(depth, far);
    for ((row, col), &m) in mask.indexed_iter() {
        if m == 1 {
            img.put_pixel(col as u32, row as u32, COLOR_OBSTACLE);
        }
    }
    for zone in info.navigable_zones.iter().take(MARKED_ZONES) {
        fill_circle(
            &mut img,
            zone.centroid.0 as i64,
            zone.centroid.1 as i64,
            ZONE_MARKER_RADIUS,
            COLOR_ZONE,
        );
    }
    draw_heading_strip(&mut img, info.suggested_direction);
    img
}

/// Convert an interleaved RGB array to an image buffer.
pub fn color_to_image(color: &Array3<u8>) -> RgbImage {
    let (rows, cols, _) = color.dim();
    let mut img = RgbImage::new(cols as u32, rows as u32);
    for row in 0..rows {
        for col in 0..cols {
            img.put_pixel(
                col as u32,
                row as u32,
                Rgb([
                    color[[row, col, 0]],
                    color[[row, col, 1]],
                    color[[row, col, 2]],
                ]),
            );
        }
    }
    img
}

/// Write the current views to `dir` as
/// `depth_<YYYYmmdd_HHMMSS>_<n>.png` (and `obstacles_`, `color_`
/// siblings). `count` disambiguates shots taken within one second.
pub fn save_screenshots(
    dir: &Path,
    depth_img: &RgbImage,
    overlay_img: &RgbImage,
    color_img: Option<&RgbImage>,
    count: u32,
) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating screenshot directory {}", dir.display()))?;
    let stamp = Local::now().format("%Y%m%d_%H%M%S");

    let depth_path = dir.join(format!("depth_{}_{}.png", stamp, count));
    depth_img
        .save(&depth_path)
        .with_context(|| format!("writing {}", depth_path.display()))?;

    let overlay_path = dir.join(format!("obstacles_{}_{}.png", stamp, count));
    overlay_img
        .save(&overlay_path)
        .with_context(|| format!("writing {}", overlay_path.display()))?;

    if let Some(color) = color_img {
        let color_path = dir.join(format!("color_{}_{}.png", stamp, count));
        color
            .save(&color_path)
            .with_context(|| format!("writing {}", color_path.display()))?;
    }

    info!("📸 Screenshot #{} saved to {}", count, dir.display());
    Ok(())
}

// JET approximation: blue -> cyan -> yellow -> red over [0, 1].
fn jet(t: f32) -> Rgb<u8> {
    let r = (1.5 - (4.0 * t - 3.0).abs()).clamp(0.0, 1.0);
    let g = (1.5 - (4.0 * t - 2.0).abs()).clamp(0.0, 1.0);
    let b = (1.5 - (4.0 * t - 1.0).abs()).clamp(0.0, 1.0);
    Rgb([(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8])
}

fn fill_circle(img: &mut RgbImage, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let (x, y) = (cx + dx, cy + dy);
            if x >= 0 && x < w && y >= 0 && y < h {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

fn draw_heading_strip(img: &mut RgbImage, direction: Direction) {
    let w = img.width();
    let h = img.height();
    if h < HEADING_STRIP_PX {
        return;
    }
    // The lit third of the strip shows the heading; STOP lights the
    // whole strip red.
    let (x0, x1, color) = match direction {
        Direction::Left => (0, w / 3, COLOR_ZONE),
        Direction::Forward => (w / 3, 2 * w / 3, COLOR_ZONE),
        Direction::Right => (2 * w / 3, w, COLOR_ZONE),
        Direction::Stop => (0, w, COLOR_OBSTACLE),
    };
    for y in (h - HEADING_STRIP_PX)..h {
        for x in x0..x1 {
            img.put_pixel(x, y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NavigableZone;

    fn info_with(direction: Direction, zones: Vec<NavigableZone>) -> DecisionInfo {
        DecisionInfo {
            suggested_direction: direction,
            navigable_zones: zones,
            obstacle_count: 0,
            min_depth: f32::INFINITY,
            processing_time: 0.0,
            frame_index: 0,
        }
    }

    #[test]
    fn depth_image_matches_frame_shape() {
        let depth = Array2::from_elem((40, 64), 2.0f32);
        let img = render_depth(&depth, 5.0);
        assert_eq!((img.width(), img.height()), (64, 40));
    }

    #[test]
    fn invalid_pixels_render_dark() {
        let depth = Array2::from_elem((10, 10), f32::NAN);
        let img = render_depth(&depth, 5.0);
        assert_eq!(*img.get_pixel(5, 5), COLOR_INVALID);
    }

    #[test]
    fn mask_pixels_are_painted_red() {
        let depth = Array2::from_elem((40, 64), 2.0f32);
        let mut mask = Array2::<u8>::zeros((40, 64));
        mask[[10, 20]] = 1;
        let info = info_with(Direction::Forward, vec![]);
        let img = render_overlay(&depth, &mask, &info, 5.0);
        assert_eq!(*img.get_pixel(20, 10), COLOR_OBSTACLE);
    }

    #[test]
    fn zone_centroids_get_markers() {
        let depth = Array2::from_elem((100, 100), 2.0f32);
        let mask = Array2::<u8>::zeros((100, 100));
        let zone = NavigableZone {
            id: 0,
            centroid: (50.0, 40.0),
            pixel_area: 1000,
            col_span: (0, 99),
        };
        let info = info_with(Direction::Forward, vec![zone]);
        let img = render_overlay(&depth, &mask, &info, 5.0);
        assert_eq!(*img.get_pixel(50, 40), COLOR_ZONE);
    }

    #[test]
    fn stop_lights_the_whole_strip() {
        let depth = Array2::from_elem((100, 90), 2.0f32);
        let mask = Array2::<u8>::zeros((100, 90));
        let info = info_with(Direction::Stop, vec![]);
        let img = render_overlay(&depth, &mask, &info, 5.0);
        assert_eq!(*img.get_pixel(0, 99), COLOR_OBSTACLE);
        assert_eq!(*img.get_pixel(89, 99), COLOR_OBSTACLE);
    }

    #[test]
    fn jet_endpoints() {
        assert_eq!(jet(0.0), Rgb([0, 0, 127]));
        assert_eq!(jet(1.0), Rgb([127, 0, 0]));
    }
}
