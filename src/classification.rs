// src/classification.rs
//
// Labels occupancy cells as obstacle / free / unknown and back-maps
// obstacle cells to the pixel-space mask.

use crate::projection::Projection;
use crate::types::{CellState, DetectorConfig, OccupancyGrid};
use ndarray::Array2;

// ============================================================================
// CLASSIFICATION THRESHOLDS
// ============================================================================

/// A cell must be nearer than the deepest reading along its bearings by
/// this much before it counts as standing in front of the background
/// surface. The deepest visible surface itself is ground/background,
/// never an obstacle.
const BACKGROUND_MARGIN_M: f32 = 0.30;

/// Free cells farther than a bearing's nearest obstacle by more than
/// this are unreachable and demoted to unknown.
const OCCLUSION_MARGIN_M: f32 = 0.15;

/// Everything the classifier derives from one projected frame.
pub struct Classification {
    pub grid: OccupancyGrid,
    /// Pixel-space obstacle mask, same shape as the depth frame.
    pub mask: Array2<u8>,
    pub obstacle_count: usize,
    /// Minimum cleaned depth among mask pixels, +inf when none.
    pub min_depth: f32,
}

pub fn classify(
    clean: &Array2<f32>,
    proj: &Projection,
    params: &DetectorConfig,
) -> Classification {
    let (rows, cols) = clean.dim();
    let lat_bins = proj.geometry.lat_bins;

    // Deepest valid reading per image column: the visible background
    // surface along that bearing.
    let mut background = vec![f32::NAN; cols];
    for ((_, col), &d) in clean.indexed_iter() {
        if d.is_finite() {
            // f32::max ignores the NaN initializer.
            background[col] = background[col].max(d);
        }
    }

    // First pass: obstacle vs free per occupied cell.
    let mut states = Array2::from_elem(proj.cells.dim(), CellState::Unknown);
    for ((iz, ix), agg) in proj.cells.indexed_iter() {
        if agg.count == 0 {
            continue;
        }
        let mean_depth = agg.mean_depth();
        let span_bg = deepest_in_span(&background, agg.col_min as usize, agg.col_max as usize);
        let is_foreground =
            span_bg.is_finite() && mean_depth < span_bg - BACKGROUND_MARGIN_M;
        let tall_enough =
            agg.vertical_extent_m(proj.intrinsics.focal_px) > params.obstacle_height_min;
        let in_range = mean_depth >= params.depth_threshold_near
            && mean_depth <= params.depth_threshold_far;

        states[[iz, ix]] = if is_foreground && tall_enough && in_range {
            CellState::Obstacle
        } else {
            CellState::Free
        };
    }

    // Back-map obstacle cells to the pixels that fed them.
    let mut mask = Array2::<u8>::zeros((rows, cols));
    let mut obstacle_count = 0usize;
    let mut min_depth = f32::INFINITY;
    let mut col_block = vec![f32::INFINITY; cols];
    for ((row, col), &flat) in proj.pixel_cells.indexed_iter() {
        if flat < 0 {
            continue;
        }
        let (iz, ix) = (flat as usize / lat_bins, flat as usize % lat_bins);
        if states[[iz, ix]] == CellState::Obstacle {
            mask[[row, col]] = 1;
            obstacle_count += 1;
            let d = clean[[row, col]];
            min_depth = min_depth.min(d);
            col_block[col] = col_block[col].min(d);
        }
    }

    // Reachability pass: free space behind a nearer obstacle on the
    // same bearings cannot be driven into.
    for ((iz, ix), agg) in proj.cells.indexed_iter() {
        if states[[iz, ix]] != CellState::Free {
            continue;
        }
        let nearest_block =
            nearest_in_span(&col_block, agg.col_min as usize, agg.col_max as usize);
        if nearest_block < agg.mean_depth() - OCCLUSION_MARGIN_M {
            states[[iz, ix]] = CellState::Unknown;
        }
    }

    Classification {
        grid: OccupancyGrid {
            states,
            resolution: params.grid_resolution,
        },
        mask,
        obstacle_count,
        min_depth,
    }
}

fn deepest_in_span(background: &[f32], col_min: usize, col_max: usize) -> f32 {
    background[col_min..=col_max.min(background.len() - 1)]
        .iter()
        .fold(f32::NAN, |a, &b| a.max(b))
}

fn nearest_in_span(col_block: &[f32], col_min: usize, col_max: usize) -> f32 {
    col_block[col_min..=col_max.min(col_block.len() - 1)]
        .iter()
        .fold(f32::INFINITY, |a, &b| a.min(b))
}
