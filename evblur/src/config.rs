//! Pipeline configuration loaded from JSON.
//!
//! ```json
//! { "statistic": "median", "ratio": 2.0, "min_area": 4, "normalize": false }
//! ```
//!
//! Every field is optional. A missing `ratio` falls back to the statistic's
//! own default (0.5 for mean, 2.0 for median).

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::image_proc::detection::RegionDetector;
use crate::image_proc::thresholding::{DetectionError, Statistic, ThresholdPolicy};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Grid statistic the threshold is derived from
    pub statistic: Statistic,
    /// Multiplier on the statistic; `None` uses the statistic's default
    pub ratio: Option<f64>,
    /// Regions with fewer cells are discarded before selection
    pub min_area: usize,
    /// Threshold the [0, 255]-normalized heatmap instead of raw counts
    pub normalize: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            statistic: Statistic::Mean,
            ratio: None,
            min_area: 1,
            normalize: false,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn policy(&self) -> ThresholdPolicy {
        ThresholdPolicy::from_statistic(self.statistic, self.ratio)
    }

    /// Validated detector for this configuration
    pub fn detector(&self) -> Result<RegionDetector, DetectionError> {
        Ok(RegionDetector::new(self.policy())?
            .with_min_area(self.min_area)
            .with_normalization(self.normalize))
    }
}
