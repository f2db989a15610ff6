//! Event frequency heatmaps
//!
//! A heatmap counts how many events landed on each sensor pixel. Cell
//! `[[y, x]]` holds the number of events reported at column `x`, row `y`.
//! Event coordinates are bounds-checked: an event outside the declared sensor
//! size is an error, never silently dropped.

use ndarray::{Array2, ArrayView2};
use shared::image_size::ImageSize;
use shared::stats_scan::StatsScan;
use thiserror::Error;

use crate::events::Event;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeatmapError {
    #[error("Heatmap dimensions must be positive, got {0}")]
    EmptyDimensions(ImageSize),

    #[error("Event at ({x}, {y}) lies outside the {width}x{height} sensor")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// Dense per-pixel event counts with shape (height, width).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heatmap {
    counts: Array2<u32>,
}

impl Heatmap {
    /// Wrap an existing dense frequency array.
    pub fn from_counts(counts: Array2<u32>) -> Result<Self, HeatmapError> {
        let size = ImageSize::from_dim(counts.dim());
        if size.is_empty() {
            return Err(HeatmapError::EmptyDimensions(size));
        }
        Ok(Self { counts })
    }

    /// Shape as (rows, cols)
    pub fn dim(&self) -> (usize, usize) {
        self.counts.dim()
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::from_dim(self.counts.dim())
    }

    /// Event count at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        self.counts.get((y, x)).copied()
    }

    /// Total number of events accumulated
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    pub fn counts(&self) -> ArrayView2<'_, u32> {
        self.counts.view()
    }

    pub fn into_counts(self) -> Array2<u32> {
        self.counts
    }

    /// Counts cast to f64 for thresholding
    pub fn as_f64(&self) -> Array2<f64> {
        self.counts.mapv(|c| c as f64)
    }

    /// Min-max normalize the counts into [0, 255].
    ///
    /// Each cell maps to `(v - min) / (max - min) * 255`, truncated to u8. A
    /// flat heatmap (max == min) maps to all zeros.
    pub fn normalized_u8(&self) -> Array2<u8> {
        let values = self.as_f64();
        let flat: Vec<f64> = values.iter().copied().collect();
        let (min, max) = match StatsScan::new(&flat).min_max() {
            Ok(bounds) => bounds,
            Err(_) => return Array2::zeros(self.dim()),
        };

        let range = max - min;
        if range <= 0.0 {
            return Array2::zeros(self.dim());
        }

        values.mapv(|v| ((v - min) / range * 255.0) as u8)
    }
}

/// Incrementally accumulates events into a heatmap.
pub struct HeatmapBuilder {
    counts: Array2<u32>,
    size: ImageSize,
}

impl HeatmapBuilder {
    pub fn new(size: ImageSize) -> Result<Self, HeatmapError> {
        if size.is_empty() {
            return Err(HeatmapError::EmptyDimensions(size));
        }
        Ok(Self {
            counts: size.zeros(),
            size,
        })
    }

    /// Count a single event. Out-of-range coordinates leave the grid untouched.
    pub fn accumulate(&mut self, event: &Event) -> Result<(), HeatmapError> {
        let x = event.x as usize;
        let y = event.y as usize;

        if !self.size.contains(x, y) {
            return Err(HeatmapError::OutOfBounds {
                x,
                y,
                width: self.size.width,
                height: self.size.height,
            });
        }

        self.counts[[y, x]] = self.counts[[y, x]].saturating_add(1);
        Ok(())
    }

    pub fn finish(self) -> Heatmap {
        Heatmap {
            counts: self.counts,
        }
    }
}

/// Build a heatmap from a full event sequence.
///
/// Fails on the first event outside `size`; no partial heatmap is returned.
pub fn build_heatmap<'a, I>(events: I, size: ImageSize) -> Result<Heatmap, HeatmapError>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut builder = HeatmapBuilder::new(size)?;
    for event in events {
        builder.accumulate(event)?;
    }
    let heatmap = builder.finish();
    log::debug!(
        "Built {} heatmap from {} events",
        heatmap.size(),
        heatmap.total()
    );
    Ok(heatmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn size(width: usize, height: usize) -> ImageSize {
        ImageSize::from_width_height(width, height)
    }

    #[test]
    fn test_counts_land_at_row_y_col_x() {
        let events = [Event::at(1, 0), Event::at(1, 0), Event::at(0, 2)];
        let heatmap = build_heatmap(&events, size(3, 3)).unwrap();

        assert_eq!(heatmap.get(1, 0), Some(2));
        assert_eq!(heatmap.get(0, 2), Some(1));
        assert_eq!(heatmap.counts()[[0, 1]], 2);
        assert_eq!(heatmap.total(), 3);
    }

    #[test]
    fn test_empty_event_list_gives_zero_grid() {
        let heatmap = build_heatmap(&Vec::<Event>::new(), size(4, 2)).unwrap();
        assert_eq!(heatmap.dim(), (2, 4));
        assert_eq!(heatmap.total(), 0);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert_eq!(
            build_heatmap(&Vec::<Event>::new(), size(0, 4)),
            Err(HeatmapError::EmptyDimensions(size(0, 4)))
        );
    }

    #[test]
    fn test_out_of_bounds_event_rejected() {
        let events = [Event::at(0, 0), Event::at(4, 1)];
        assert_eq!(
            build_heatmap(&events, size(4, 4)),
            Err(HeatmapError::OutOfBounds {
                x: 4,
                y: 1,
                width: 4,
                height: 4
            })
        );
    }

    #[test]
    fn test_builder_leaves_grid_untouched_on_error() {
        let mut builder = HeatmapBuilder::new(size(2, 2)).unwrap();
        builder.accumulate(&Event::at(1, 1)).unwrap();
        assert!(builder.accumulate(&Event::at(1, 2)).is_err());
        assert_eq!(builder.finish().total(), 1);
    }

    #[test]
    fn test_normalized_u8() {
        let heatmap = Heatmap::from_counts(arr2(&[[0, 2], [4, 1]])).unwrap();
        assert_eq!(heatmap.normalized_u8(), arr2(&[[0u8, 127], [255, 63]]));
    }

    #[test]
    fn test_normalized_flat_heatmap_is_zero() {
        let heatmap = Heatmap::from_counts(Array2::from_elem((3, 3), 7)).unwrap();
        assert!(heatmap.normalized_u8().iter().all(|&v| v == 0));
    }
}
