//! Offline blur-region analysis for event-camera deblurring datasets
//!
//! Event streams are accumulated into per-pixel frequency heatmaps, high
//! activity regions are found by statistical thresholding and 8-connected
//! labeling, and the largest region is scored by PSNR between a ground-truth
//! frame and its reconstruction.

pub mod config;
pub mod dataset;
pub mod events;
pub mod image_proc;
pub mod pipeline;

pub use config::PipelineConfig;
pub use events::Event;
pub use pipeline::{run, ImagePair, PipelineError, PipelineReport};
