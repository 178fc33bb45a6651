// src/journal.rs
//
// Per-frame decision journal, one JSON object per line. Append-only;
// each record is flushed so a crash loses at most the current line.

use crate::types::DecisionInfo;
use anyhow::{Context, Result};
use chrono::Local;
use serde_json::json;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct DecisionJournal {
    file: File,
    path: PathBuf,
}

impl DecisionJournal {
    /// Open the journal for appending, creating it if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating journal directory {}", parent.display()))?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening decision journal {}", path.display()))?;
        info!("📝 Decision journal: {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Append one decision record.
    pub fn append(&mut self, info: &DecisionInfo) -> Result<()> {
        let mut record = json!({
            "timestamp": Local::now().to_rfc3339(),
            "frame_index": info.frame_index,
            "direction": info.suggested_direction.as_str(),
            "obstacle_count": info.obstacle_count,
            "zone_count": info.navigable_zones.len(),
            "processing_time_ms": info.processing_time * 1000.0,
        });
        // JSON has no infinity; omit min_depth when the mask was empty.
        if info.min_depth.is_finite() {
            record["min_depth"] = json!(info.min_depth);
        }
        writeln!(self.file, "{}", record)
            .with_context(|| format!("writing to {}", self.path.display()))?;
        self.file.flush()?;
        Ok(())
    }
}
