//! One pass of the blur-region pipeline over a single dataset unit.
//!
//! events → heatmap → regions → largest region → PSNR of its patch

use ndarray::ArrayView2;
use serde::{Serialize, Serializer};
use shared::image_size::ImageSize;
use thiserror::Error;

use crate::events::Event;
use crate::image_proc::detection::{select_largest, Region, RegionDetector};
use crate::image_proc::heatmap::{build_heatmap, Heatmap, HeatmapError};
use crate::image_proc::psnr::{score_patch, ScoreError};
use crate::image_proc::thresholding::DetectionError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Heatmap(#[from] HeatmapError),

    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error("No region exceeded the detection threshold")]
    NoRegions,
}

/// Ground truth and reconstruction aligned to the heatmap's pixel grid.
#[derive(Debug, Clone, Copy)]
pub struct ImagePair<'a> {
    pub ground_truth: ArrayView2<'a, u8>,
    pub reconstruction: ArrayView2<'a, u8>,
}

fn serialize_psnr<S: Serializer>(psnr: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match psnr {
        Some(v) if v.is_infinite() => serializer.serialize_str("inf"),
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub event_count: usize,
    pub regions: Vec<Region>,
    pub selected: Region,
    /// PSNR in dB of the selected region; "inf" when the patches are identical
    #[serde(serialize_with = "serialize_psnr")]
    pub psnr: Option<f64>,
}

/// Detect regions on an already built heatmap and pick the largest.
pub fn analyze_heatmap(
    heatmap: &Heatmap,
    detector: &RegionDetector,
) -> Result<(Vec<Region>, Region), PipelineError> {
    let regions = detector.detect(heatmap)?;
    let selected = *select_largest(&regions).ok_or(PipelineError::NoRegions)?;
    Ok((regions, selected))
}

/// Run the full pipeline; scoring happens only when `images` is given.
pub fn run(
    events: &[Event],
    size: ImageSize,
    detector: &RegionDetector,
    images: Option<ImagePair>,
) -> Result<PipelineReport, PipelineError> {
    let heatmap = build_heatmap(events, size)?;
    run_heatmap(&heatmap, detector, images)
}

/// Pipeline stages after accumulation, for callers that keep the heatmap.
pub fn run_heatmap(
    heatmap: &Heatmap,
    detector: &RegionDetector,
    images: Option<ImagePair>,
) -> Result<PipelineReport, PipelineError> {
    let (regions, selected) = analyze_heatmap(heatmap, detector)?;

    log::debug!(
        "Selected region {} with area {} at {}",
        selected.label,
        selected.area,
        selected.bbox
    );

    let psnr = match images {
        Some(pair) => Some(score_patch(
            pair.ground_truth,
            pair.reconstruction,
            &selected.bbox,
        )?),
        None => None,
    };

    Ok(PipelineReport {
        event_count: heatmap.total() as usize,
        regions,
        selected,
        psnr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_proc::thresholding::ThresholdPolicy;
    use ndarray::Array2;

    fn detector() -> RegionDetector {
        RegionDetector::new(ThresholdPolicy::mean()).unwrap()
    }

    #[test]
    fn test_no_events_is_no_regions() {
        let result = run(&[], ImageSize::from_width_height(4, 4), &detector(), None);
        assert!(matches!(result, Err(PipelineError::NoRegions)));
    }

    #[test]
    fn test_out_of_bounds_event_propagates() {
        let events = [Event::at(9, 0)];
        let result = run(&events, ImageSize::from_width_height(4, 4), &detector(), None);
        assert!(matches!(
            result,
            Err(PipelineError::Heatmap(HeatmapError::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_report_json_marks_infinite_psnr() {
        let events = [Event::at(1, 1)];
        let image = Array2::<u8>::from_elem((4, 4), 9);
        let pair = ImagePair {
            ground_truth: image.view(),
            reconstruction: image.view(),
        };

        let report = run(&events, ImageSize::from_width_height(4, 4), &detector(), Some(pair))
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["psnr"], "inf");
        assert_eq!(json["event_count"], 1);
        assert_eq!(json["selected"]["area"], 1);
    }
}
