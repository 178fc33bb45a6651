// src/config.rs

use crate::error::DetectorError;
use crate::types::{Config, DetectorConfig};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }
}

impl DetectorConfig {
    /// Reject invalid parameter combinations before any detector exists.
    pub fn validate(&self) -> Result<(), DetectorError> {
        if !(self.depth_threshold_near > 0.0
            && self.depth_threshold_far > 0.0
            && self.depth_threshold_near < self.depth_threshold_far)
        {
            return Err(DetectorError::InvalidDepthRange {
                near: self.depth_threshold_near,
                far: self.depth_threshold_far,
            });
        }
        if !(self.grid_resolution > 0.0) {
            return Err(DetectorError::NonPositiveResolution {
                resolution: self.grid_resolution,
            });
        }
        if !(self.obstacle_height_min >= 0.0) {
            return Err(DetectorError::NegativeObstacleHeight {
                height: self.obstacle_height_min,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = DetectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.depth_threshold_near, 0.5);
        assert_eq!(config.depth_threshold_far, 5.0);
        assert_eq!(config.obstacle_height_min, 0.1);
        assert_eq!(config.grid_resolution, 0.05);
    }

    #[test]
    fn inverted_depth_range_rejected() {
        let config = DetectorConfig {
            depth_threshold_near: 5.0,
            depth_threshold_far: 0.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DetectorError::InvalidDepthRange { .. })
        ));
    }

    #[test]
    fn non_positive_values_rejected() {
        let config = DetectorConfig {
            depth_threshold_near: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DetectorConfig {
            grid_resolution: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DetectorError::NonPositiveResolution { .. })
        ));

        let config = DetectorConfig {
            obstacle_height_min: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DetectorError::NegativeObstacleHeight { .. })
        ));
    }

    #[test]
    fn nan_parameters_rejected() {
        let config = DetectorConfig {
            grid_resolution: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn yaml_roundtrip_with_partial_sections() {
        let yaml = "detector:\n  depth_threshold_near: 0.4\n  depth_threshold_far: 6.0\n  obstacle_height_min: 0.15\n  grid_resolution: 0.1\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.detector.depth_threshold_far, 6.0);
        // Unspecified sections fall back to defaults.
        assert_eq!(config.runtime.target_fps, 30);
        assert_eq!(config.camera.width, 640);
    }
}
