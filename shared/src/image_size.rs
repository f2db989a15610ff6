//! Grid dimensions shared by event sensors, heatmaps and images

use ndarray::Array2;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sensor or frame dimensions.
///
/// Width counts columns (the event `x` axis), height counts rows (the event
/// `y` axis). Arrays built from an `ImageSize` are row-major with shape
/// `(height, width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
}

impl ImageSize {
    /// Create a new ImageSize
    pub fn from_width_height(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Create from an ndarray shape `(rows, cols)`
    pub fn from_dim(dim: (usize, usize)) -> Self {
        Self {
            width: dim.1,
            height: dim.0,
        }
    }

    /// Create a zero-filled array with shape (height, width).
    pub fn zeros<T>(&self) -> Array2<T>
    where
        T: Clone + Zero,
    {
        Array2::zeros((self.height, self.width))
    }

    /// Shape as ndarray expects it: (rows, cols)
    pub fn dim(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Get total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// True when either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check whether pixel coordinate (x, y) lies inside the grid
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Convert to tuple (width, height)
    pub fn to_tuple(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

impl From<(usize, usize)> for ImageSize {
    fn from(dimensions: (usize, usize)) -> Self {
        Self::from_width_height(dimensions.0, dimensions.1)
    }
}

impl From<ImageSize> for (usize, usize) {
    fn from(size: ImageSize) -> Self {
        size.to_tuple()
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
