//! Statistical thresholding of event heatmaps
//!
//! A threshold is a statistic of the grid (mean or median) scaled by a ratio.
//! Cells strictly greater than the threshold are foreground. The statistic is
//! always computed on the same grid that is thresholded.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use shared::stats_scan::{StatsError, StatsScan};
use std::fmt;
use thiserror::Error;

/// Default ratio applied to the grid mean
pub const DEFAULT_MEAN_RATIO: f64 = 0.5;

/// Default ratio applied to the grid median
pub const DEFAULT_MEDIAN_RATIO: f64 = 2.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("Threshold ratio must be finite and non-negative, got {0}")]
    InvalidRatio(f64),

    #[error("Cannot compute threshold statistic: {0}")]
    Statistic(#[from] StatsError),
}

/// Statistic a threshold is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Mean,
    Median,
}

impl Statistic {
    /// The ratio this statistic is paired with when none is given
    pub fn default_ratio(&self) -> f64 {
        match self {
            Statistic::Mean => DEFAULT_MEAN_RATIO,
            Statistic::Median => DEFAULT_MEDIAN_RATIO,
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Statistic::Mean => write!(f, "mean"),
            Statistic::Median => write!(f, "median"),
        }
    }
}

/// How the foreground threshold is computed from a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdPolicy {
    /// threshold = mean(grid) * ratio
    MeanRatio(f64),
    /// threshold = median(grid) * ratio
    MedianRatio(f64),
}

impl ThresholdPolicy {
    /// Mean policy with `DEFAULT_MEAN_RATIO`
    pub fn mean() -> Self {
        ThresholdPolicy::MeanRatio(DEFAULT_MEAN_RATIO)
    }

    /// Median policy with `DEFAULT_MEDIAN_RATIO`
    pub fn median() -> Self {
        ThresholdPolicy::MedianRatio(DEFAULT_MEDIAN_RATIO)
    }

    /// Build a policy from a statistic, falling back to that statistic's
    /// default ratio.
    pub fn from_statistic(statistic: Statistic, ratio: Option<f64>) -> Self {
        let ratio = ratio.unwrap_or_else(|| statistic.default_ratio());
        match statistic {
            Statistic::Mean => ThresholdPolicy::MeanRatio(ratio),
            Statistic::Median => ThresholdPolicy::MedianRatio(ratio),
        }
    }

    pub fn statistic(&self) -> Statistic {
        match self {
            ThresholdPolicy::MeanRatio(_) => Statistic::Mean,
            ThresholdPolicy::MedianRatio(_) => Statistic::Median,
        }
    }

    pub fn ratio(&self) -> f64 {
        match *self {
            ThresholdPolicy::MeanRatio(r) | ThresholdPolicy::MedianRatio(r) => r,
        }
    }

    pub fn validate(&self) -> Result<(), DetectionError> {
        let ratio = self.ratio();
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(DetectionError::InvalidRatio(ratio));
        }
        Ok(())
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::mean()
    }
}

impl fmt::Display for ThresholdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} x {}", self.statistic(), self.ratio())
    }
}

/// Compute the threshold value a policy yields for a grid.
pub fn threshold_value(
    grid: ArrayView2<f64>,
    policy: ThresholdPolicy,
) -> Result<f64, DetectionError> {
    policy.validate()?;

    let flat: Vec<f64> = grid.iter().copied().collect();
    let scan = StatsScan::new(&flat);
    let statistic = match policy.statistic() {
        Statistic::Mean => scan.mean()?,
        Statistic::Median => scan.median(&flat)?,
    };

    Ok(statistic * policy.ratio())
}

/// Apply thresholding to a grid and return a binary mask
///
/// A cell is foreground when its value is strictly greater than `threshold`.
pub fn apply_threshold(grid: ArrayView2<f64>, threshold: f64) -> Array2<bool> {
    grid.mapv(|v| v > threshold)
}
