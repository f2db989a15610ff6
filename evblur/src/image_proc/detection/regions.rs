//! Connected foreground regions of a thresholded heatmap.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::aabb::BoundingBox;
use crate::image_proc::heatmap::Heatmap;
use crate::image_proc::thresholding::{
    apply_threshold, threshold_value, DetectionError, ThresholdPolicy,
};

/// A connected component of foreground mask cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Label in the component image, starting at 1
    pub label: u32,
    /// Number of member cells
    pub area: usize,
    /// Tight box around all member cells
    pub bbox: BoundingBox,
}

// 8-connectivity neighboring offsets
const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Find connected components in a binary mask
///
/// Uses an 8-connectivity flood fill. The mask is scanned in row-major order,
/// so labels 1, 2, ... follow the position of each component's first cell
/// (topmost row, then leftmost column). Area and bounding box are gathered
/// during the fill.
///
/// # Returns
///
/// The label image (0 = background) and one `Region` per label, in label order
pub fn connected_components(mask: ArrayView2<bool>) -> (Array2<u32>, Vec<Region>) {
    let (rows, cols) = mask.dim();
    let mut labels = Array2::<u32>::zeros((rows, cols));
    let mut regions = Vec::new();
    let mut stack = Vec::new();

    for i in 0..rows {
        for j in 0..cols {
            if !mask[[i, j]] || labels[[i, j]] != 0 {
                continue;
            }

            let label = regions.len() as u32 + 1;
            let mut area = 0;
            let mut bbox = BoundingBox::new();

            labels[[i, j]] = label;
            stack.push((i, j));

            while let Some((y, x)) = stack.pop() {
                area += 1;
                bbox.expand_to_include(y, x);

                for &(dy, dx) in &NEIGHBORS {
                    let ny = y as isize + dy;
                    let nx = x as isize + dx;

                    if ny < 0 || ny >= rows as isize || nx < 0 || nx >= cols as isize {
                        continue;
                    }
                    let (ny, nx) = (ny as usize, nx as usize);

                    if mask[[ny, nx]] && labels[[ny, nx]] == 0 {
                        labels[[ny, nx]] = label;
                        stack.push((ny, nx));
                    }
                }
            }

            regions.push(Region { label, area, bbox });
        }
    }

    (labels, regions)
}

/// Threshold a grid with `policy` and extract its foreground regions.
///
/// The threshold statistic is computed on `grid` itself, so callers pass
/// either raw counts or normalized values, never a mix.
pub fn detect_regions_in(
    grid: ArrayView2<f64>,
    policy: ThresholdPolicy,
) -> Result<Vec<Region>, DetectionError> {
    let threshold = threshold_value(grid, policy)?;
    let mask = apply_threshold(grid, threshold);
    let (_, regions) = connected_components(mask.view());

    log::debug!(
        "Threshold {:.6} ({}) produced {} regions",
        threshold,
        policy,
        regions.len()
    );

    Ok(regions)
}

/// Detect blur regions on a heatmap's raw event counts.
pub fn detect_regions(
    heatmap: &Heatmap,
    policy: ThresholdPolicy,
) -> Result<Vec<Region>, DetectionError> {
    detect_regions_in(heatmap.as_f64().view(), policy)
}

/// Drop regions with fewer than `min_area` member cells, keeping order.
pub fn filter_min_area(regions: Vec<Region>, min_area: usize) -> Vec<Region> {
    regions.into_iter().filter(|r| r.area >= min_area).collect()
}

/// Pick the region with the largest pixel area.
///
/// Ties go to the region that comes first in `regions`. Returns `None` for an
/// empty slice.
pub fn select_largest(regions: &[Region]) -> Option<&Region> {
    regions.iter().fold(None, |best: Option<&Region>, region| match best {
        Some(b) if b.area >= region.area => Some(b),
        _ => Some(region),
    })
}

/// Threshold policy plus region filtering, validated once up front.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionDetector {
    policy: ThresholdPolicy,
    min_area: usize,
    normalize: bool,
}

impl RegionDetector {
    pub fn new(policy: ThresholdPolicy) -> Result<Self, DetectionError> {
        policy.validate()?;
        Ok(Self {
            policy,
            min_area: 1,
            normalize: false,
        })
    }

    /// Discard regions smaller than `min_area` cells
    pub fn with_min_area(mut self, min_area: usize) -> Self {
        self.min_area = min_area;
        self
    }

    /// Threshold the [0, 255]-normalized heatmap instead of raw counts
    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn policy(&self) -> ThresholdPolicy {
        self.policy
    }

    pub fn detect(&self, heatmap: &Heatmap) -> Result<Vec<Region>, DetectionError> {
        let regions = if self.normalize {
            let grid = heatmap.normalized_u8().mapv(|v| v as f64);
            detect_regions_in(grid.view(), self.policy)?
        } else {
            detect_regions(heatmap, self.policy)?
        };
        Ok(filter_min_area(regions, self.min_area))
    }
}
