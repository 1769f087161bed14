//! Series statistics for the Individual-MR chart.
//!
//! Computes the mean, population standard deviation, sigma zones, and the
//! control limits of both the individuals (I) chart and the moving-range
//! (MR) chart for one ordered series.
//!
//! # Control Chart Factors
//!
//! The MR chart uses moving ranges of span 2, so the D3/D4 factors for
//! subgroup size n=2 apply (ASTM E2587).
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - ASTM E2587 — Standard Practice for Use of Control Charts

use serde::{Deserialize, Serialize};
use u_numflow::stats;

use super::chart::{ControlLimits, SigmaLevels};
use crate::error::{validate_series, Result, SpcError};

/// D4 factor for MR chart (n=2 moving range).
///
/// UCL_MR = D4 * MR-bar.
pub const D4_MR: f64 = 3.267;

/// D3 factor for MR chart (n=2 moving range).
///
/// LCL_MR = D3 * MR-bar, which is always 0 for n=2.
pub const D3_MR: f64 = 0.0;

/// Statistics of one series.
///
/// # Examples
///
/// ```
/// use furnace_spc::spc::SeriesStatistics;
///
/// let stats = SeriesStatistics::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
/// assert!((stats.mean - 5.0).abs() < 1e-12);
/// assert!((stats.std - 2.0).abs() < 1e-12);
/// assert!((stats.i_chart.ucl - 11.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStatistics {
    /// Number of observations.
    pub n: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation (divides by n).
    pub std: f64,
    /// Mean ± kσ zone boundaries.
    pub sigma_levels: SigmaLevels,
    /// I chart limits: mean ± 3σ.
    pub i_chart: ControlLimits,
    /// MR chart limits from the average moving range.
    pub mr_chart: ControlLimits,
    /// `|x[i] - x[i-1]|` for i in 1..n.
    pub moving_ranges: Vec<f64>,
}

impl SeriesStatistics {
    /// Computes statistics for `series`.
    ///
    /// # Errors
    ///
    /// - [`SpcError::EmptySeries`] if `series` is empty
    /// - [`SpcError::InsufficientData`] if `series` has a single point
    /// - [`SpcError::NonFiniteValue`] if any value is NaN or infinite
    pub fn compute(series: &[f64]) -> Result<Self> {
        const OPERATION: &str = "series statistics";
        validate_series(series, OPERATION)?;

        let (mean, std) = mean_and_std_dev(series).ok_or(SpcError::EmptySeries {
            operation: OPERATION,
        })?;

        let moving_ranges = moving_ranges(series);
        let mr_bar = stats::mean(&moving_ranges).ok_or(SpcError::InsufficientData {
            operation: OPERATION,
            required: 2,
            actual: series.len(),
        })?;

        let sigma_levels = SigmaLevels::new(mean, std);
        let i_chart = ControlLimits {
            ucl: sigma_levels.sigma_plus_3,
            cl: mean,
            lcl: sigma_levels.sigma_minus_3,
        };
        let mr_chart = ControlLimits {
            ucl: D4_MR * mr_bar,
            cl: mr_bar,
            lcl: (D3_MR * mr_bar).max(0.0),
        };

        Ok(Self {
            n: series.len(),
            mean,
            std,
            sigma_levels,
            i_chart,
            mr_chart,
            moving_ranges,
        })
    }

    /// Average moving range (MR-bar).
    pub fn mr_mean(&self) -> f64 {
        self.mr_chart.cl
    }
}

/// Mean and population standard deviation of `series`, or `None` if empty.
///
/// A constant series reports its own value as the mean and a spread of
/// exactly 0, regardless of the rounding the summation picks up.
///
/// # Examples
///
/// ```
/// use furnace_spc::spc::mean_and_std_dev;
///
/// assert_eq!(mean_and_std_dev(&[0.35; 12]), Some((0.35, 0.0)));
/// assert_eq!(mean_and_std_dev(&[]), None);
/// ```
pub fn mean_and_std_dev(series: &[f64]) -> Option<(f64, f64)> {
    let first = *series.first()?;
    if series.iter().all(|&v| v == first) {
        return Some((first, 0.0));
    }
    let mean = stats::mean(series)?;
    Some((mean, population_std_dev(series, mean)))
}

/// Population standard deviation of `data` around a precomputed `mean`.
///
/// Divides the sum of squared deviations by `n`, not `n - 1`. Returns 0 for
/// an empty slice.
pub fn population_std_dev(data: &[f64], mean: f64) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let ss: f64 = data.iter().map(|&x| (x - mean) * (x - mean)).sum();
    (ss / data.len() as f64).sqrt()
}

/// Moving ranges of span 2. Empty for fewer than 2 points.
pub fn moving_ranges(series: &[f64]) -> Vec<f64> {
    series.windows(2).map(|w| (w[1] - w[0]).abs()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_statistics() {
        let stats = SeriesStatistics::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.n, 8);
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.std - 2.0).abs() < 1e-12, "population std, not sample std");
        assert!((stats.i_chart.cl - 5.0).abs() < 1e-12);
        assert!((stats.i_chart.ucl - 11.0).abs() < 1e-12);
        assert!((stats.i_chart.lcl + 1.0).abs() < 1e-12);
        assert!((stats.sigma_levels.sigma_plus_1 - 7.0).abs() < 1e-12);
        assert!((stats.sigma_levels.sigma_minus_2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_mr_chart_limits() {
        // MR = [2, 0, 0, 1, 0, 2, 2], MR-bar = 1.0
        let stats = SeriesStatistics::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.moving_ranges, vec![2.0, 0.0, 0.0, 1.0, 0.0, 2.0, 2.0]);
        assert!((stats.mr_mean() - 1.0).abs() < 1e-12);
        assert!((stats.mr_chart.ucl - 3.267).abs() < 1e-12);
        assert_eq!(stats.mr_chart.lcl, 0.0);
    }

    #[test]
    fn test_two_points_is_minimum() {
        let stats = SeriesStatistics::compute(&[10.0, 12.0]).unwrap();
        assert_eq!(stats.moving_ranges, vec![2.0]);
        assert!((stats.std - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_short_series() {
        assert!(matches!(
            SeriesStatistics::compute(&[]),
            Err(SpcError::EmptySeries { .. })
        ));
        assert!(matches!(
            SeriesStatistics::compute(&[5.0]),
            Err(SpcError::InsufficientData {
                required: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(matches!(
            SeriesStatistics::compute(&[1.0, 2.0, f64::NAN]),
            Err(SpcError::NonFiniteValue { index: 2, .. })
        ));
    }

    #[test]
    fn test_constant_series_collapses_limits() {
        let stats = SeriesStatistics::compute(&[10.0, 10.0, 10.0]).unwrap();
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.i_chart.ucl, 10.0);
        assert_eq!(stats.i_chart.lcl, 10.0);
        assert_eq!(stats.mr_chart.cl, 0.0);
        assert_eq!(stats.mr_chart.ucl, 0.0);
    }

    #[test]
    fn test_inexact_constant_series_has_zero_spread() {
        for value in [0.1, 0.35] {
            let stats = SeriesStatistics::compute(&[value; 12]).unwrap();
            assert_eq!(stats.mean, value);
            assert_eq!(stats.std, 0.0);
            assert_eq!(stats.i_chart.ucl, value);
            assert_eq!(stats.i_chart.lcl, value);
            assert_eq!(stats.mr_chart.ucl, 0.0);
        }
    }

    #[test]
    fn test_mean_and_std_dev() {
        assert_eq!(mean_and_std_dev(&[]), None);
        assert_eq!(mean_and_std_dev(&[0.1; 5]), Some((0.1, 0.0)));
        let (mean, std) = mean_and_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((mean - 5.0).abs() < 1e-12);
        assert!((std - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_moving_ranges_short() {
        assert!(moving_ranges(&[]).is_empty());
        assert!(moving_ranges(&[1.0]).is_empty());
        assert_eq!(moving_ranges(&[3.0, 1.0, 4.0]), vec![2.0, 3.0]);
    }

    #[test]
    fn test_population_std_dev_empty() {
        assert_eq!(population_std_dev(&[], 0.0), 0.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn i_chart_is_symmetric_three_sigma(
            data in proptest::collection::vec(-1e3_f64..1e3, 2..=60)
        ) {
            let stats = SeriesStatistics::compute(&data).unwrap();
            let tol = 1e-9 * (1.0 + stats.mean.abs() + stats.std);
            prop_assert!(stats.std >= 0.0);
            prop_assert_eq!(stats.i_chart.cl, stats.mean);
            prop_assert!((stats.i_chart.ucl - stats.i_chart.cl - 3.0 * stats.std).abs() < tol);
            prop_assert!((stats.i_chart.cl - stats.i_chart.lcl - 3.0 * stats.std).abs() < tol);
            prop_assert!(stats.mr_chart.lcl >= 0.0);
            prop_assert!(stats.mr_chart.ucl >= stats.mr_chart.cl);
            prop_assert_eq!(stats.moving_ranges.len(), data.len() - 1);
        }
    }
}
