// src/types.rs

use ndarray::Array2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Core detection parameters. Validated at detector construction,
/// never clamped silently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Readings nearer than this are invalid (meters).
    pub depth_threshold_near: f32,
    /// Readings farther than this are invalid (meters).
    pub depth_threshold_far: f32,
    /// Minimum vertical extent above the ground surface for a cell
    /// to count as an obstacle (meters).
    pub obstacle_height_min: f32,
    /// Occupancy grid resolution (meters per cell).
    pub grid_resolution: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            depth_threshold_near: 0.5,
            depth_threshold_far: 5.0,
            obstacle_height_min: 0.1,
            grid_resolution: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CameraConfig {
    pub width: usize,
    pub height: usize,
    /// Horizontal field of view in degrees. Treated as a calibration
    /// input; the remaining intrinsics are derived from it.
    pub horizontal_fov_deg: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 400,
            horizontal_fov_deg: 60.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub target_fps: u32,
    pub enable_visualization: bool,
    /// Optional path for the per-frame decision journal (JSONL).
    pub journal_path: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            enable_visualization: true,
            journal_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// State of one top-down occupancy cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Free,
    Obstacle,
    /// No valid pixel projected into this cell, or the cell is
    /// unreachable behind a nearer obstacle.
    Unknown,
}

/// Top-down occupancy grid, rebuilt from scratch every frame.
/// Rows index depth bins (row 0 is at the camera), columns index
/// lateral bins (column 0 is leftmost).
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    pub states: Array2<CellState>,
    pub resolution: f32,
}

impl OccupancyGrid {
    pub fn count(&self, state: CellState) -> usize {
        self.states.iter().filter(|&&s| s == state).count()
    }
}

/// The closed set of headings one decision cycle can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Left,
    Right,
    Stop,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "FORWARD",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Stop => "STOP",
        }
    }
}

/// A connected cluster of free cells large enough to steer toward.
/// Centroid and area are reported in image pixel space so they line
/// up with the obstacle mask.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigableZone {
    pub id: usize,
    /// (x, y) centroid in pixel coordinates.
    pub centroid: (f32, f32),
    /// Number of image pixels backing this zone.
    pub pixel_area: usize,
    /// Inclusive image-column span covered by the zone.
    pub col_span: (usize, usize),
}

/// Fixed-field decision record for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionInfo {
    pub suggested_direction: Direction,
    /// Ordered by descending pixel area, ties broken by smaller
    /// horizontal offset from the image center.
    pub navigable_zones: Vec<NavigableZone>,
    /// Number of pixels set in the obstacle mask.
    pub obstacle_count: usize,
    /// Minimum depth among obstacle pixels, or +inf when the mask is
    /// empty.
    pub min_depth: f32,
    /// Wall-clock duration of this pipeline pass, seconds.
    pub processing_time: f64,
    /// 0 for the first successful call, +1 per successful call since.
    pub frame_index: u64,
}
