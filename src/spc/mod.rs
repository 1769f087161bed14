//! Statistical Process Control (SPC) for individual observations.
//!
//! # Statistics
//!
//! - [`SeriesStatistics`] — Mean, population sigma, sigma zones, and the
//!   control limits of the Individual (I) and Moving Range (MR) charts
//!
//! # Run Rules
//!
//! - [`NelsonRuleEvaluator`] — Nelson Rules 1 (beyond limit), 2 (run on one
//!   side of the mean), and 3 (trend), each as a single-pass scan
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - ASTM E2587 — Standard Practice for Use of Control Charts
//! - Nelson, L.S. (1984). "The Shewhart Control Chart — Tests for Special Causes",
//!   *Journal of Quality Technology* 16(4), pp. 237-239.

mod chart;
mod rules;
mod statistics;

pub use chart::{ChartSpot, ControlLimits, NelsonRule, SigmaLevels};
pub use rules::{
    BeyondLimitResult, Direction, NelsonRuleEvaluator, RuleEvaluation, RuleOutcome, RunResult,
    RunSegment, Side, TrendResult, TrendSegment, RUN_LENGTH, RUN_MIN_SERIES, TREND_LENGTH,
};
pub use statistics::{
    mean_and_std_dev, moving_ranges, population_std_dev, SeriesStatistics, D3_MR, D4_MR,
};
