// src/projection.rs
//
// Projects valid depth samples into a fixed-span top-down grid using a
// pinhole horizontal model. Pure given the cleaned frame and the
// calibration; holds no state between frames.

use ndarray::Array2;

/// Pinhole intrinsics derived from the horizontal field of view.
/// Square pixels, principal point at the image center.
#[derive(Debug, Clone, Copy)]
pub struct CameraIntrinsics {
    pub focal_px: f32,
    pub center_x: f32,
}

impl CameraIntrinsics {
    pub fn new(width: usize, horizontal_fov_deg: f32) -> Self {
        let half_fov = (horizontal_fov_deg.to_radians() / 2.0).tan();
        Self {
            focal_px: (width as f32 / 2.0) / half_fov,
            center_x: width as f32 / 2.0,
        }
    }

    /// Lateral ground-plane offset (meters, +right) of a pixel column
    /// at the given depth.
    pub fn lateral_offset(&self, col: usize, depth: f32) -> f32 {
        depth * (col as f32 + 0.5 - self.center_x) / self.focal_px
    }
}

/// Fixed metric span of the grid: `[-half_width, +half_width]` lateral
/// by `[0, depth_span]` forward. Derived from the far threshold and the
/// FOV at construction, constant per detector.
#[derive(Debug, Clone, Copy)]
pub struct GridGeometry {
    pub resolution: f32,
    pub half_width_m: f32,
    pub depth_span_m: f32,
    pub lat_bins: usize,
    pub depth_bins: usize,
}

impl GridGeometry {
    pub fn new(resolution: f32, horizontal_fov_deg: f32, depth_span_m: f32) -> Self {
        let half_width_m = depth_span_m * (horizontal_fov_deg.to_radians() / 2.0).tan();
        let lat_bins = ((2.0 * half_width_m / resolution).ceil() as usize).max(1);
        let depth_bins = ((depth_span_m / resolution).ceil() as usize).max(1);
        Self {
            resolution,
            half_width_m,
            depth_span_m,
            lat_bins,
            depth_bins,
        }
    }

    /// Grid cell `(depth_bin, lat_bin)` for a ground-plane position, or
    /// None when it falls outside the covered span.
    pub fn cell_of(&self, lateral: f32, depth: f32) -> Option<(usize, usize)> {
        if depth < 0.0 || depth > self.depth_span_m {
            return None;
        }
        if lateral < -self.half_width_m || lateral > self.half_width_m {
            return None;
        }
        let iz = ((depth / self.resolution) as usize).min(self.depth_bins - 1);
        let ix = (((lateral + self.half_width_m) / self.resolution) as usize)
            .min(self.lat_bins - 1);
        Some((iz, ix))
    }

    pub fn flat(&self, iz: usize, ix: usize) -> usize {
        iz * self.lat_bins + ix
    }
}

/// Per-cell summary of the pixels that projected into it. Vertical
/// extent is summarized through the row span rather than kept
/// per-pixel, which is what keeps the grid 2D.
#[derive(Debug, Clone, Copy)]
pub struct CellAggregate {
    pub count: u32,
    pub row_min: u32,
    pub row_max: u32,
    pub col_min: u32,
    pub col_max: u32,
    pub depth_sum: f64,
}

impl Default for CellAggregate {
    fn default() -> Self {
        Self {
            count: 0,
            row_min: u32::MAX,
            row_max: 0,
            col_min: u32::MAX,
            col_max: 0,
            depth_sum: 0.0,
        }
    }
}

impl CellAggregate {
    fn absorb(&mut self, row: usize, col: usize, depth: f32) {
        self.count += 1;
        self.row_min = self.row_min.min(row as u32);
        self.row_max = self.row_max.max(row as u32);
        self.col_min = self.col_min.min(col as u32);
        self.col_max = self.col_max.max(col as u32);
        self.depth_sum += depth as f64;
    }

    pub fn mean_depth(&self) -> f32 {
        if self.count == 0 {
            return f32::NAN;
        }
        (self.depth_sum / self.count as f64) as f32
    }

    /// Physical vertical extent subtended by the contributing rows.
    pub fn vertical_extent_m(&self, focal_px: f32) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        (self.row_max - self.row_min + 1) as f32 * self.mean_depth() / focal_px
    }
}

/// Result of projecting one cleaned frame.
pub struct Projection {
    pub intrinsics: CameraIntrinsics,
    pub geometry: GridGeometry,
    /// Indexed `(depth_bin, lat_bin)`.
    pub cells: Array2<CellAggregate>,
    /// Flat grid index of each pixel's cell, -1 for invalid pixels.
    pub pixel_cells: Array2<i32>,
}

/// Map each valid pixel of the cleaned frame to exactly one grid cell.
pub fn project(
    clean: &Array2<f32>,
    intrinsics: CameraIntrinsics,
    geometry: GridGeometry,
) -> Projection {
    let mut cells =
        Array2::<CellAggregate>::default((geometry.depth_bins, geometry.lat_bins));
    let mut pixel_cells = Array2::<i32>::from_elem(clean.dim(), -1);

    for ((row, col), &depth) in clean.indexed_iter() {
        if !depth.is_finite() {
            continue;
        }
        let lateral = intrinsics.lateral_offset(col, depth);
        if let Some((iz, ix)) = geometry.cell_of(lateral, depth) {
            cells[[iz, ix]].absorb(row, col, depth);
            pixel_cells[[row, col]] = geometry.flat(iz, ix) as i32;
        }
    }

    Projection {
        intrinsics,
        geometry,
        cells,
        pixel_cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn intrinsics_640() -> CameraIntrinsics {
        CameraIntrinsics::new(640, 60.0)
    }

    #[test]
    fn center_column_has_zero_lateral_offset() {
        let intr = intrinsics_640();
        let offset = intr.lateral_offset(320, 3.0);
        assert!(offset.abs() < 0.01, "offset {offset}");
        // Left-half columns land left of the axis.
        assert!(intr.lateral_offset(100, 3.0) < 0.0);
        assert!(intr.lateral_offset(600, 3.0) > 0.0);
    }

    #[test]
    fn geometry_covers_fov_at_far_threshold() {
        let geom = GridGeometry::new(0.05, 60.0, 5.0);
        // half width = 5 * tan(30 deg) ~ 2.887 m
        assert!((geom.half_width_m - 2.887).abs() < 0.01);
        assert_eq!(geom.depth_bins, 100);

        // Extreme corners still land in the grid.
        assert!(geom.cell_of(-geom.half_width_m, 5.0).is_some());
        assert!(geom.cell_of(geom.half_width_m, 0.0).is_some());
        assert!(geom.cell_of(0.0, 5.01).is_none());
    }

    #[test]
    fn valid_pixels_land_in_exactly_one_cell() {
        let mut clean = Array2::from_elem((400, 640), f32::NAN);
        clean[[200, 320]] = 2.0;
        let geom = GridGeometry::new(0.05, 60.0, 5.0);
        let proj = project(&clean, intrinsics_640(), geom);

        let total: u32 = proj.cells.iter().map(|c| c.count).sum();
        assert_eq!(total, 1);
        assert!(proj.pixel_cells[[200, 320]] >= 0);
        assert_eq!(proj.pixel_cells[[0, 0]], -1);

        // The one occupied cell sits in the 2.0 m depth bin, centered
        // laterally.
        let iz = proj.pixel_cells[[200, 320]] as usize / geom.lat_bins;
        assert_eq!(iz, (2.0 / 0.05) as usize);
    }

    #[test]
    fn uniform_frame_occupies_a_single_depth_row() {
        let clean = Array2::from_elem((400, 640), 3.0f32);
        let geom = GridGeometry::new(0.05, 60.0, 5.0);
        let proj = project(&clean, intrinsics_640(), geom);

        for ((iz, _), agg) in proj.cells.indexed_iter() {
            if agg.count > 0 {
                assert_eq!(iz, (3.0 / 0.05) as usize);
            }
        }
        let total: u32 = proj.cells.iter().map(|c| c.count).sum();
        assert_eq!(total as usize, 400 * 640);
    }

    #[test]
    fn vertical_extent_scales_with_row_span() {
        let mut agg = CellAggregate::default();
        agg.absorb(150, 300, 1.5);
        agg.absorb(249, 300, 1.5);
        let intr = intrinsics_640();
        let extent = agg.vertical_extent_m(intr.focal_px);
        // 100 rows at 1.5 m with f ~ 554 px -> ~0.27 m
        assert!((extent - 0.27).abs() < 0.02, "extent {extent}");
    }
}
