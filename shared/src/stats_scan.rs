//! Summary statistics over a flattened grid of samples.
//!
//! One pass over the input collects min, max and the running sum. The median
//! needs an ordered copy, so it takes the samples again instead of keeping
//! them inside the scan. A NaN anywhere stops the scan; every statistic then
//! reports where it was found.

use num_traits::float::Float;
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("NaN value encountered at index {0}")]
    NaNEncountered(usize),
    #[error("No data provided (empty slice)")]
    NoData,
}

/// Single-pass min / max / mean scanner
#[derive(Debug, Clone)]
pub struct StatsScan<T: Float> {
    bounds: Option<(T, T)>,
    total: T,
    samples: usize,
    nan_at: Option<usize>,
}

impl<T: Float> StatsScan<T> {
    pub fn new(data: &[T]) -> Self {
        let mut scan = Self {
            bounds: None,
            total: T::zero(),
            samples: 0,
            nan_at: None,
        };

        for (index, &value) in data.iter().enumerate() {
            if value.is_nan() {
                scan.nan_at = Some(index);
                break;
            }
            scan.total = scan.total + value;
            scan.samples += 1;
            scan.bounds = Some(match scan.bounds {
                Some((lo, hi)) => (lo.min(value), hi.max(value)),
                None => (value, value),
            });
        }

        scan
    }

    fn valid(&self) -> Result<(), StatsError> {
        if let Some(index) = self.nan_at {
            return Err(StatsError::NaNEncountered(index));
        }
        if self.samples == 0 {
            return Err(StatsError::NoData);
        }
        Ok(())
    }

    pub fn min(&self) -> Result<T, StatsError> {
        Ok(self.min_max()?.0)
    }

    pub fn max(&self) -> Result<T, StatsError> {
        Ok(self.min_max()?.1)
    }

    pub fn min_max(&self) -> Result<(T, T), StatsError> {
        self.valid()?;
        self.bounds.ok_or(StatsError::NoData)
    }

    /// Arithmetic mean of the scanned samples
    pub fn mean(&self) -> Result<T, StatsError> {
        self.valid()?;
        let n = T::from(self.samples).unwrap_or_else(T::max_value);
        Ok(self.total / n)
    }

    /// Number of samples scanned before the first NaN
    pub fn count(&self) -> usize {
        self.samples
    }

    pub fn has_nan(&self) -> bool {
        self.nan_at.is_some()
    }

    /// Median of `data`, which must be the slice given to [`StatsScan::new`].
    ///
    /// An even sample count yields the mean of the two middle values.
    pub fn median(&self, data: &[T]) -> Result<T, StatsError> {
        self.valid()?;

        let mut ordered = data[..self.samples.min(data.len())].to_vec();
        ordered.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let half = ordered.len() / 2;
        match ordered.len() {
            0 => Err(StatsError::NoData),
            n if n % 2 == 1 => Ok(ordered[half]),
            _ => Ok((ordered[half - 1] + ordered[half]) / (T::one() + T::one())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounds_and_mean() {
        let scan = StatsScan::<f64>::new(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]);

        assert_eq!(scan.min_max().unwrap(), (1.0, 9.0));
        assert_eq!(scan.min().unwrap(), 1.0);
        assert_eq!(scan.max().unwrap(), 9.0);
        assert_eq!(scan.count(), 8);
        // 31 / 8
        assert_relative_eq!(scan.mean().unwrap(), 3.875, epsilon = 1e-10);
    }

    #[test]
    fn test_median_odd_and_even() {
        let odd = [7.0_f64, 1.0, 3.0];
        assert_eq!(StatsScan::new(&odd).median(&odd).unwrap(), 3.0);

        let even = [4.0_f64, 1.0, 3.0, 2.0];
        assert_eq!(StatsScan::new(&even).median(&even).unwrap(), 2.5);
    }

    #[test]
    fn test_median_of_sparse_grid_is_zero() {
        let mut data = vec![0.0_f64; 16];
        data[0] = 3.0;
        data[15] = 2.0;
        let scan = StatsScan::new(&data);
        assert_eq!(scan.median(&data).unwrap(), 0.0);
        assert_relative_eq!(scan.mean().unwrap(), 0.3125);
    }

    #[test]
    fn test_empty_slice() {
        let scan = StatsScan::<f64>::new(&[]);
        assert_eq!(scan.mean(), Err(StatsError::NoData));
        assert_eq!(scan.median(&[]), Err(StatsError::NoData));
        assert_eq!(scan.min(), Err(StatsError::NoData));
    }

    #[test]
    fn test_nan_detection() {
        let data = [1.0_f64, 2.0, f64::NAN, 4.0];
        let scan = StatsScan::new(&data);
        assert!(scan.has_nan());
        assert_eq!(scan.count(), 2);
        assert_eq!(scan.mean(), Err(StatsError::NaNEncountered(2)));
        assert_eq!(scan.median(&data), Err(StatsError::NaNEncountered(2)));
    }
}
