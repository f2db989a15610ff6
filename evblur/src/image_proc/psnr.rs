//! Patch extraction and PSNR scoring between aligned 8-bit images.
//!
//! PSNR = 10 · log10(MAX² / MSE) with MAX = 255. Identical patches have zero
//! MSE and score `f64::INFINITY`.

use ndarray::{s, ArrayView2};
use thiserror::Error;

use super::detection::{BoundingBox, Region};

/// Peak value of 8-bit imagery
pub const MAX_PIXEL_VALUE: f64 = 255.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("Bounding box ({bbox}) exceeds image of {rows}x{cols} (rows x cols)")]
    OutOfBounds {
        bbox: BoundingBox,
        rows: usize,
        cols: usize,
    },

    #[error("Bounding box ({0}) covers no pixels")]
    EmptyPatch(BoundingBox),

    #[error("Patch shapes differ: {left:?} vs {right:?}")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
}

/// Slice the pixels under `bbox` out of `image`.
pub fn crop_patch<'a, T>(
    image: ArrayView2<'a, T>,
    bbox: &BoundingBox,
) -> Result<ArrayView2<'a, T>, ScoreError> {
    if !bbox.is_valid() {
        return Err(ScoreError::EmptyPatch(*bbox));
    }

    let (rows, cols) = image.dim();
    if !bbox.fits_within(rows, cols) {
        return Err(ScoreError::OutOfBounds {
            bbox: *bbox,
            rows,
            cols,
        });
    }

    Ok(image.slice_move(s![bbox.row_range(), bbox.col_range()]))
}

/// Crop every region's bounding box from `image`, in region order.
pub fn crop_regions<'a, T>(
    image: ArrayView2<'a, T>,
    regions: &[Region],
) -> Result<Vec<ArrayView2<'a, T>>, ScoreError> {
    regions
        .iter()
        .map(|region| crop_patch(image, &region.bbox))
        .collect()
}

/// Mean squared error between two equally shaped patches.
///
/// Differences are taken in i64 so they never wrap.
pub fn mean_squared_error(a: ArrayView2<u8>, b: ArrayView2<u8>) -> Result<f64, ScoreError> {
    if a.dim() != b.dim() {
        return Err(ScoreError::ShapeMismatch {
            left: a.dim(),
            right: b.dim(),
        });
    }
    if a.is_empty() {
        return Err(ScoreError::EmptyPatch(BoundingBox::from_coords(
            0,
            0,
            a.nrows(),
            a.ncols(),
        )));
    }

    let sum_sq: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&p, &q)| {
            let diff = p as i64 - q as i64;
            (diff * diff) as f64
        })
        .sum();

    Ok(sum_sq / a.len() as f64)
}

/// Peak signal-to-noise ratio in dB between two equally shaped patches.
pub fn psnr(a: ArrayView2<u8>, b: ArrayView2<u8>) -> Result<f64, ScoreError> {
    let mse = mean_squared_error(a, b)?;
    if mse == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(10.0 * (MAX_PIXEL_VALUE * MAX_PIXEL_VALUE / mse).log10())
}

/// Crop `bbox` from both images and score the reconstruction against the
/// ground truth.
pub fn score_patch(
    ground_truth: ArrayView2<u8>,
    reconstruction: ArrayView2<u8>,
    bbox: &BoundingBox,
) -> Result<f64, ScoreError> {
    let gt_patch = crop_patch(ground_truth, bbox)?;
    let recon_patch = crop_patch(reconstruction, bbox)?;
    let score = psnr(gt_patch, recon_patch)?;
    log::debug!("PSNR over {}: {:.4} dB", bbox, score);
    Ok(score)
}
