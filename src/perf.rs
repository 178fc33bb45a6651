// src/perf.rs
//
// Purely observational per-frame timing. No thresholds, no alerts.

/// Tracks per-frame processing latency and the monotonic frame index
/// for one detector instance. Reset only at construction.
#[derive(Debug)]
pub struct PerformanceTracker {
    frame_index: u64,
    processing_times: Vec<f64>,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self {
            frame_index: 0,
            processing_times: Vec::new(),
        }
    }

    /// Record one successful pipeline pass. Returns the frame index
    /// assigned to that pass (0 for the first).
    pub fn record(&mut self, seconds: f64) -> u64 {
        let index = self.frame_index;
        self.frame_index += 1;
        self.processing_times.push(seconds);
        index
    }

    /// Number of successful passes so far; also the index the next
    /// pass will receive.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn processing_times(&self) -> &[f64] {
        &self.processing_times
    }

    pub fn mean_processing_time(&self) -> Option<f64> {
        if self.processing_times.is_empty() {
            return None;
        }
        Some(self.processing_times.iter().sum::<f64>() / self.processing_times.len() as f64)
    }

    /// Mean pipeline throughput implied by the recorded latencies.
    pub fn mean_fps(&self) -> Option<f64> {
        self.mean_processing_time()
            .filter(|&t| t > 0.0)
            .map(|t| 1.0 / t)
    }
}

impl Default for PerformanceTracker {
    fn default() -> Self {
        Self::new()
    }
}
