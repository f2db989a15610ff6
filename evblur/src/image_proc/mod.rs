//! Image processing module for event-camera blur analysis
//!
//! This module covers the whole detection path: accumulating events into a
//! heatmap, thresholding it, extracting connected regions, and scoring image
//! patches under a region's bounding box.

pub mod detection;
pub mod heatmap;
pub mod image;
pub mod psnr;
pub mod thresholding;

// Re-export key functionality for easier access
pub use detection::{detect_regions, select_largest, BoundingBox, Region, RegionDetector};
pub use heatmap::{build_heatmap, Heatmap, HeatmapBuilder, HeatmapError};
pub use psnr::{crop_patch, crop_regions, psnr, score_patch, ScoreError};
pub use thresholding::{DetectionError, Statistic, ThresholdPolicy};
