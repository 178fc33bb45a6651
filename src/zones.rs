// src/zones.rs
//
// Clusters contiguous free cells into navigable zones. Connectivity is
// 4-way (lateral and depth neighbors, no diagonals), fixed.

use crate::projection::Projection;
use crate::types::{CellState, NavigableZone, OccupancyGrid};
use std::collections::VecDeque;

/// Components smaller than this many cells are grid noise, not
/// candidate heading targets.
const MIN_ZONE_CELLS: usize = 6;

/// Upper bound on reported zones. The full ordered sequence up to this
/// cap is kept; callers typically render only the top few.
const MAX_ZONES: usize = 32;

/// Extract navigable zones from the free cells of the grid, ordered by
/// descending pixel area with ties broken by smaller horizontal offset
/// from the image center.
pub fn extract_zones(grid: &OccupancyGrid, proj: &Projection) -> Vec<NavigableZone> {
    let (depth_bins, lat_bins) = grid.states.dim();
    let mut labels = vec![-1i32; depth_bins * lat_bins];
    let mut component_cells: Vec<usize> = Vec::new();

    // 4-connected flood fill over free cells.
    let mut queue = VecDeque::new();
    for iz in 0..depth_bins {
        for ix in 0..lat_bins {
            let flat = iz * lat_bins + ix;
            if grid.states[[iz, ix]] != CellState::Free || labels[flat] >= 0 {
                continue;
            }
            let label = component_cells.len() as i32;
            let mut cells = 0usize;
            labels[flat] = label;
            queue.push_back((iz, ix));
            while let Some((z, x)) = queue.pop_front() {
                cells += 1;
                let mut visit = |nz: usize, nx: usize| {
                    let nflat = nz * lat_bins + nx;
                    if grid.states[[nz, nx]] == CellState::Free && labels[nflat] < 0 {
                        labels[nflat] = label;
                        queue.push_back((nz, nx));
                    }
                };
                if z > 0 {
                    visit(z - 1, x);
                }
                if z + 1 < depth_bins {
                    visit(z + 1, x);
                }
                if x > 0 {
                    visit(z, x - 1);
                }
                if x + 1 < lat_bins {
                    visit(z, x + 1);
                }
            }
            component_cells.push(cells);
        }
    }

    // Back-project components to pixel space through the pixel->cell
    // map built by the projector.
    #[derive(Default, Clone)]
    struct PixelAccum {
        area: usize,
        sum_x: f64,
        sum_y: f64,
        col_min: usize,
        col_max: usize,
    }
    let mut accums = vec![
        PixelAccum {
            col_min: usize::MAX,
            ..Default::default()
        };
        component_cells.len()
    ];
    for ((row, col), &flat) in proj.pixel_cells.indexed_iter() {
        if flat < 0 {
            continue;
        }
        let label = labels[flat as usize];
        if label < 0 {
            continue;
        }
        let acc = &mut accums[label as usize];
        acc.area += 1;
        acc.sum_x += col as f64;
        acc.sum_y += row as f64;
        acc.col_min = acc.col_min.min(col);
        acc.col_max = acc.col_max.max(col);
    }

    let center_x = proj.intrinsics.center_x;
    let mut zones: Vec<NavigableZone> = component_cells
        .iter()
        .enumerate()
        .filter(|&(label, &cells)| cells >= MIN_ZONE_CELLS && accums[label].area > 0)
        .map(|(label, _)| {
            let acc = &accums[label];
            NavigableZone {
                id: label,
                centroid: (
                    (acc.sum_x / acc.area as f64) as f32,
                    (acc.sum_y / acc.area as f64) as f32,
                ),
                pixel_area: acc.area,
                col_span: (acc.col_min, acc.col_max),
            }
        })
        .collect();

    zones.sort_by(|a, b| {
        b.pixel_area.cmp(&a.pixel_area).then_with(|| {
            let da = (a.centroid.0 - center_x).abs();
            let db = (b.centroid.0 - center_x).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
    });
    zones.truncate(MAX_ZONES);
    for (rank, zone) in zones.iter_mut().enumerate() {
        zone.id = rank;
    }
    zones
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::classify;
    use crate::preprocessing::clean_depth;
    use crate::projection::{project, CameraIntrinsics, GridGeometry};
    use crate::types::DetectorConfig;
    use ndarray::{s, Array2};

    fn zones_for(depth: &Array2<f32>) -> Vec<NavigableZone> {
        let params = DetectorConfig::default();
        let clean = clean_depth(
            depth,
            params.depth_threshold_near,
            params.depth_threshold_far,
        );
        let (_, cols) = depth.dim();
        let intr = CameraIntrinsics::new(cols, 60.0);
        let geom = GridGeometry::new(params.grid_resolution, 60.0, params.depth_threshold_far);
        let proj = project(&clean, intr, geom);
        let c = classify(&clean, &proj, &params);
        extract_zones(&c.grid, &proj)
    }

    #[test]
    fn uniform_frame_yields_single_centered_zone() {
        let depth = Array2::from_elem((400, 640), 3.0f32);
        let zones = zones_for(&depth);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].pixel_area, 400 * 640);
        assert!((zones[0].centroid.0 - 320.0).abs() < 2.0);
        assert_eq!(zones[0].col_span, (0, 639));
    }

    #[test]
    fn no_free_cells_yields_empty_sequence() {
        let depth = Array2::from_elem((100, 100), 0.0f32);
        let zones = zones_for(&depth);
        assert!(zones.is_empty());
    }

    #[test]
    fn larger_region_is_ordered_first() {
        // An off-center obstacle splits the 2.0 m field into a narrow
        // left region and a wide right region.
        let mut depth = Array2::from_elem((400, 640), 2.0f32);
        depth.slice_mut(s![150..250, 200..280]).fill(1.2);

        let zones = zones_for(&depth);
        assert!(zones.len() >= 2, "got {} zones", zones.len());
        assert!(zones[0].pixel_area > zones[1].pixel_area);
        // The wide region lies right of center.
        assert!(zones[0].centroid.0 > 320.0);
        assert!(zones[1].centroid.0 < 320.0);
        // Ids follow the ordering.
        assert_eq!(zones[0].id, 0);
        assert_eq!(zones[1].id, 1);
    }

    #[test]
    fn zone_centroids_are_in_pixel_space() {
        let depth = Array2::from_elem((400, 640), 3.0f32);
        let zones = zones_for(&depth);
        let (cx, cy) = zones[0].centroid;
        assert!(cx >= 0.0 && cx < 640.0);
        assert!(cy >= 0.0 && cy < 400.0);
    }
}
