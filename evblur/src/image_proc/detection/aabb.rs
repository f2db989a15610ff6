//! Axis-aligned bounding boxes for detected blur regions.
//!
//! Boxes live in the heatmap's (row, column) space, which is also the pixel
//! space of the paired ground-truth and reconstruction images. Minimum bounds
//! are inclusive and maximum bounds are exclusive, so a box slices an array
//! directly with `min_row..max_row, min_col..max_col`.
//!
//! # Examples
//!
//! ```rust
//! use evblur::image_proc::detection::aabb::BoundingBox;
//!
//! // Grow a box from the member pixels of a region
//! let mut bbox = BoundingBox::new();
//! bbox.expand_to_include(2, 3);
//! bbox.expand_to_include(4, 1);
//!
//! assert_eq!(bbox.to_tuple(), (2, 1, 5, 4));
//! assert_eq!(bbox.height(), 3);
//! assert_eq!(bbox.width(), 3);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Axis-aligned bounding box in image coordinates (row, column).
///
/// # Coordinate System
/// - **Rows (y-axis)**: Increase downward from top of image
/// - **Columns (x-axis)**: Increase rightward from left of image
/// - **Bounds**: min coordinates inclusive, max coordinates exclusive
///
/// # Examples
///
/// ```rust
/// use evblur::image_proc::detection::aabb::BoundingBox;
///
/// // A 4x4 box covering a whole 4x4 image
/// let full = BoundingBox::from_coords(0, 0, 4, 4);
/// assert_eq!(full.area(), 16);
/// assert!(full.contains_point(3, 3));
/// assert!(!full.contains_point(4, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum row (y) coordinate (inclusive)
    pub min_row: usize,
    /// Minimum column (x) coordinate (inclusive)
    pub min_col: usize,
    /// Maximum row (y) coordinate (exclusive)
    pub max_row: usize,
    /// Maximum column (x) coordinate (exclusive)
    pub max_col: usize,
}

impl BoundingBox {
    /// Create a new empty box.
    ///
    /// Min coordinates start at `usize::MAX` and max coordinates at 0, so the
    /// box is invalid until a point is added with `expand_to_include()`.
    pub fn new() -> Self {
        Self {
            min_row: usize::MAX,
            min_col: usize::MAX,
            max_row: 0,
            max_col: 0,
        }
    }

    /// Create a box from explicit bounds (max bounds exclusive).
    pub fn from_coords(min_row: usize, min_col: usize, max_row: usize, max_col: usize) -> Self {
        Self {
            min_row,
            min_col,
            max_row,
            max_col,
        }
    }

    /// Create a box from a `(min_row, min_col, max_row, max_col)` tuple.
    pub fn from_tuple(coords: (usize, usize, usize, usize)) -> Self {
        Self::from_coords(coords.0, coords.1, coords.2, coords.3)
    }

    /// Convert to a `(min_row, min_col, max_row, max_col)` tuple.
    pub fn to_tuple(&self) -> (usize, usize, usize, usize) {
        (self.min_row, self.min_col, self.max_row, self.max_col)
    }

    /// Expand this box so it covers pixel (row, col).
    pub fn expand_to_include(&mut self, row: usize, col: usize) {
        self.min_row = self.min_row.min(row);
        self.min_col = self.min_col.min(col);
        self.max_row = self.max_row.max(row + 1);
        self.max_col = self.max_col.max(col + 1);
    }

    /// Smallest box containing both boxes.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_row: self.min_row.min(other.min_row),
            min_col: self.min_col.min(other.min_col),
            max_row: self.max_row.max(other.max_row),
            max_col: self.max_col.max(other.max_col),
        }
    }

    /// Check whether two boxes share at least one pixel.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_row < other.max_row
            && other.min_row < self.max_row
            && self.min_col < other.max_col
            && other.min_col < self.max_col
    }

    /// Width in pixels (number of columns)
    pub fn width(&self) -> usize {
        self.max_col.saturating_sub(self.min_col)
    }

    /// Height in pixels (number of rows)
    pub fn height(&self) -> usize {
        self.max_row.saturating_sub(self.min_row)
    }

    /// Area of the rectangle in square pixels.
    ///
    /// This is the box area, not the pixel count of the region it encloses.
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// True when the box covers at least one pixel.
    pub fn is_valid(&self) -> bool {
        self.min_row < self.max_row && self.min_col < self.max_col
    }

    /// Check whether the box fits inside an array of shape `(rows, cols)`.
    pub fn fits_within(&self, rows: usize, cols: usize) -> bool {
        self.max_row <= rows && self.max_col <= cols
    }

    /// Check if pixel (row, col) lies inside the box.
    pub fn contains_point(&self, row: usize, col: usize) -> bool {
        row >= self.min_row && row < self.max_row && col >= self.min_col && col < self.max_col
    }

    /// Row range for slicing
    pub fn row_range(&self) -> Range<usize> {
        self.min_row..self.max_row
    }

    /// Column range for slicing
    pub fn col_range(&self) -> Range<usize> {
        self.min_col..self.max_col
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "rows {}..{}, cols {}..{}",
            self.min_row, self.max_row, self.min_col, self.max_col
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_invalid() {
        let bbox = BoundingBox::new();
        assert!(!bbox.is_valid());
        assert_eq!(bbox.area(), 0);
    }

    #[test]
    fn test_expand_single_pixel() {
        let mut bbox = BoundingBox::new();
        bbox.expand_to_include(3, 3);
        assert!(bbox.is_valid());
        assert_eq!(bbox.to_tuple(), (3, 3, 4, 4));
        assert_eq!(bbox.width(), 1);
        assert_eq!(bbox.height(), 1);
    }

    #[test]
    fn test_expand_multiple_points() {
        let mut bbox = BoundingBox::new();
        bbox.expand_to_include(50, 100);
        bbox.expand_to_include(55, 95);
        bbox.expand_to_include(45, 105);

        assert_eq!(bbox.min_row, 45);
        assert_eq!(bbox.min_col, 95);
        assert_eq!(bbox.max_row, 56);
        assert_eq!(bbox.max_col, 106);
        assert_eq!(bbox.area(), 11 * 11);
    }

    #[test]
    fn test_ranges_match_bounds() {
        let bbox = BoundingBox::from_coords(1, 2, 4, 7);
        assert_eq!(bbox.row_range(), 1..4);
        assert_eq!(bbox.col_range(), 2..7);
    }

    #[test]
    fn test_fits_within() {
        let bbox = BoundingBox::from_coords(0, 0, 4, 4);
        assert!(bbox.fits_within(4, 4));
        assert!(!bbox.fits_within(3, 4));
        assert!(!bbox.fits_within(4, 3));
    }

    #[test]
    fn test_overlap_is_exclusive_at_max_edge() {
        let a = BoundingBox::from_coords(0, 0, 2, 2);
        let touching = BoundingBox::from_coords(2, 0, 4, 2);
        let inside = BoundingBox::from_coords(1, 1, 3, 3);

        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&inside));
        assert_eq!(a.merge(&touching).to_tuple(), (0, 0, 4, 2));
    }

    #[test]
    fn test_tuple_conversion_and_display() {
        let bbox = BoundingBox::from_tuple((10, 20, 30, 40));
        assert_eq!(bbox.min_row, 10);
        assert_eq!(bbox.max_col, 40);
        assert_eq!(bbox.to_string(), "rows 10..30, cols 20..40");
    }
}
