// src/camera.rs
//
// Depth frame acquisition. The vendor driver is an opaque
// collaborator behind `DepthSource`; the synthetic source lets the
// full loop run without hardware attached.

use crate::types::CameraConfig;
use anyhow::Result;
use ndarray::{s, Array2, Array3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Frame supplier for the decision loop.
///
/// `get_depth_meters` returns `None` when no frame is available this
/// iteration; the loop skips that cycle without error.
pub trait DepthSource {
    fn initialize(&mut self) -> Result<()>;

    /// Latest depth frame in meters, row-major (rows, cols).
    fn get_depth_meters(&mut self) -> Option<Array2<f32>>;

    /// Latest color frame (rows, cols, rgb), if the source has one.
    fn get_frame(&mut self) -> Option<Array3<u8>>;

    fn release(&mut self);
}

// ============================================================================
// SYNTHETIC SOURCE
// ============================================================================

/// Deterministic-shape simulated scene: a noisy mid-range field with a
/// too-near block left of center and a waist-height block on the
/// right. Exercises every branch of the pipeline.
pub struct SyntheticCamera {
    width: usize,
    height: usize,
    rng: StdRng,
    initialized: bool,
}

impl SyntheticCamera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            rng: StdRng::seed_from_u64(0x5eed),
            initialized: false,
        }
    }
}

impl DepthSource for SyntheticCamera {
    fn initialize(&mut self) -> Result<()> {
        info!(
            "📷 Synthetic depth source ready ({}x{})",
            self.width, self.height
        );
        self.initialized = true;
        Ok(())
    }

    fn get_depth_meters(&mut self) -> Option<Array2<f32>> {
        if !self.initialized {
            return None;
        }
        let mut depth = Array2::zeros((self.height, self.width));
        for v in depth.iter_mut() {
            *v = self.rng.gen_range(0.5..4.5);
        }

        // Below-near block, left of center.
        let r0 = 150.min(self.height);
        let r1 = 250.min(self.height);
        let c0 = 250.min(self.width);
        let c1 = 350.min(self.width);
        depth.slice_mut(s![r0..r1, c0..c1]).fill(0.3);

        // In-range block on the right.
        let r0 = 50.min(self.height);
        let r1 = 120.min(self.height);
        let c0 = 450.min(self.width);
        let c1 = 550.min(self.width);
        depth.slice_mut(s![r0..r1, c0..c1]).fill(1.5);

        Some(depth)
    }

    fn get_frame(&mut self) -> Option<Array3<u8>> {
        None
    }

    fn release(&mut self) {
        self.initialized = false;
    }
}
