// src/detector.rs

use crate::classification::classify;
use crate::decision::decide;
use crate::error::DetectorError;
use crate::perf::PerformanceTracker;
use crate::preprocessing::clean_depth;
use crate::projection::{project, CameraIntrinsics, GridGeometry};
use crate::types::{CameraConfig, DecisionInfo, DetectorConfig};
use crate::zones::extract_zones;
use ndarray::Array2;
use std::time::Instant;
use tracing::debug;

/// One frame in, one heading decision out.
///
/// Owns no shared state beyond its performance counters, so multiple
/// independent instances (e.g. against recorded frames) never
/// interfere. Not safe for concurrent calls on the same instance.
pub struct ObstacleDetector {
    params: DetectorConfig,
    horizontal_fov_deg: f32,
    geometry: GridGeometry,
    tracker: PerformanceTracker,
}

impl ObstacleDetector {
    /// Validates all parameters up front; an invalid combination
    /// produces no detector at all.
    pub fn new(params: DetectorConfig, camera: &CameraConfig) -> Result<Self, DetectorError> {
        params.validate()?;
        if !(camera.horizontal_fov_deg > 0.0 && camera.horizontal_fov_deg < 180.0) {
            return Err(DetectorError::InvalidFov {
                fov_deg: camera.horizontal_fov_deg,
            });
        }
        let geometry = GridGeometry::new(
            params.grid_resolution,
            camera.horizontal_fov_deg,
            params.depth_threshold_far,
        );
        Ok(Self {
            params,
            horizontal_fov_deg: camera.horizontal_fov_deg,
            geometry,
            tracker: PerformanceTracker::new(),
        })
    }

    /// Run the full pipeline on one depth frame.
    ///
    /// Deterministic given identical inputs and construction
    /// parameters, apart from `frame_index` and `processing_time`.
    /// A failed call leaves the frame index and timing sequence
    /// untouched.
    pub fn process(
        &mut self,
        depth: &Array2<f32>,
    ) -> Result<(Array2<u8>, DecisionInfo), DetectorError> {
        let started = Instant::now();
        let (rows, cols) = depth.dim();
        if rows == 0 || cols == 0 {
            return Err(DetectorError::EmptyFrame { rows, cols });
        }

        let clean = clean_depth(
            depth,
            self.params.depth_threshold_near,
            self.params.depth_threshold_far,
        );
        let intrinsics = CameraIntrinsics::new(cols, self.horizontal_fov_deg);
        let projection = project(&clean, intrinsics, self.geometry);
        let classification = classify(&clean, &projection, &self.params);
        let navigable_zones = extract_zones(&classification.grid, &projection);
        let suggested_direction = decide(&navigable_zones, cols);

        let processing_time = started.elapsed().as_secs_f64();
        let frame_index = self.tracker.record(processing_time);

        debug!(
            "frame {}: {} | obstacles={} | zones={} | min_depth={:.2} | {:.1}ms",
            frame_index,
            suggested_direction.as_str(),
            classification.obstacle_count,
            navigable_zones.len(),
            classification.min_depth,
            processing_time * 1000.0
        );

        let info = DecisionInfo {
            suggested_direction,
            navigable_zones,
            obstacle_count: classification.obstacle_count,
            min_depth: classification.min_depth,
            processing_time,
            frame_index,
        };
        Ok((classification.mask, info))
    }

    /// Number of successful `process` calls since construction.
    pub fn frame_index(&self) -> u64 {
        self.tracker.frame_index()
    }

    /// Per-frame latencies, seconds, for mean-FPS reporting.
    pub fn processing_times(&self) -> &[f64] {
        self.tracker.processing_times()
    }

    pub fn mean_processing_time(&self) -> Option<f64> {
        self.tracker.mean_processing_time()
    }

    pub fn mean_fps(&self) -> Option<f64> {
        self.tracker.mean_fps()
    }
}
