// src/error.rs

use thiserror::Error;

/// Errors produced by the perception core.
///
/// Configuration variants are fatal at construction; `EmptyFrame` fails a
/// single `process` call and the caller is expected to skip the frame.
#[derive(Debug, Error)]
pub enum DetectorError {
    /// Depth thresholds must satisfy `0 < near < far`.
    #[error("invalid depth range: near {near} m, far {far} m (need 0 < near < far)")]
    InvalidDepthRange {
        /// Configured near threshold.
        near: f32,
        /// Configured far threshold.
        far: f32,
    },

    /// Grid resolution must be strictly positive.
    #[error("grid resolution must be positive, got {resolution} m/cell")]
    NonPositiveResolution {
        /// Configured resolution.
        resolution: f32,
    },

    /// Minimum obstacle height must be non-negative.
    #[error("obstacle height minimum must be non-negative, got {height} m")]
    NegativeObstacleHeight {
        /// Configured minimum height.
        height: f32,
    },

    /// Camera field of view must be in (0, 180) degrees.
    #[error("horizontal FOV must be in (0, 180) degrees, got {fov_deg}")]
    InvalidFov {
        /// Configured field of view.
        fov_deg: f32,
    },

    /// The depth frame has a zero-sized dimension.
    #[error("depth frame has degenerate shape {rows}x{cols}")]
    EmptyFrame {
        /// Frame rows.
        rows: usize,
        /// Frame columns.
        cols: usize,
    },
}

impl DetectorError {
    /// True for errors that reject construction rather than a single call.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::EmptyFrame { .. })
    }
}
