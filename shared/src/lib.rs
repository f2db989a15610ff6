//! Shared components and utilities for evblur modules

pub mod image_size;
pub mod stats_scan;

pub use image_size::ImageSize;
pub use stats_scan::{StatsError, StatsScan};
