//! Core control chart types.
//!
//! Control limits, sigma zone boundaries, and the per-index chart spots that
//! carry rule annotations for a rendering layer.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - ASTM E2587 — Standard Practice for Use of Control Charts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Control limits for a chart.
///
/// Represents the upper control limit (UCL), center line (CL), and lower
/// control limit (LCL).
///
/// # Invariants
///
/// - `lcl <= cl <= ucl`
/// - All values are finite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlLimits {
    /// Upper control limit.
    pub ucl: f64,
    /// Center line.
    pub cl: f64,
    /// Lower control limit.
    pub lcl: f64,
}

impl ControlLimits {
    /// Whether `value` lies strictly above the UCL or strictly below the LCL.
    pub fn is_beyond(&self, value: f64) -> bool {
        value > self.ucl || value < self.lcl
    }
}

/// Sigma zone boundaries at mean ± kσ for k = 1, 2, 3.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SigmaLevels {
    pub sigma_minus_3: f64,
    pub sigma_minus_2: f64,
    pub sigma_minus_1: f64,
    pub sigma_plus_1: f64,
    pub sigma_plus_2: f64,
    pub sigma_plus_3: f64,
}

impl SigmaLevels {
    /// Zone boundaries around `mean` with spacing `sigma`.
    pub fn new(mean: f64, sigma: f64) -> Self {
        Self {
            sigma_minus_3: mean - 3.0 * sigma,
            sigma_minus_2: mean - 2.0 * sigma,
            sigma_minus_1: mean - sigma,
            sigma_plus_1: mean + sigma,
            sigma_plus_2: mean + 2.0 * sigma,
            sigma_plus_3: mean + 3.0 * sigma,
        }
    }

    /// Boundary at `k` sigma, for `k` in -3..=3 excluding 0.
    pub fn level(&self, k: i8) -> Option<f64> {
        match k {
            -3 => Some(self.sigma_minus_3),
            -2 => Some(self.sigma_minus_2),
            -1 => Some(self.sigma_minus_1),
            1 => Some(self.sigma_plus_1),
            2 => Some(self.sigma_plus_2),
            3 => Some(self.sigma_plus_3),
            _ => None,
        }
    }
}

/// Nelson rules evaluated by the engine.
///
/// # Reference
///
/// Nelson, L.S. (1984). "The Shewhart Control Chart — Tests for Special Causes",
/// *Journal of Quality Technology* 16(4), pp. 237-239.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NelsonRule {
    /// Point beyond a control or specification limit (Nelson Rule 1).
    BeyondLimit,

    /// 9 points in a row on same side of the mean (Nelson Rule 2).
    ///
    /// Indicates a sustained shift in the process mean.
    RunOneSide,

    /// 6 points in a row steadily increasing or decreasing (Nelson Rule 3).
    Trend,
}

/// A single point on an individuals chart with its rule annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpot {
    /// Zero-based index of this point in the series.
    pub index: usize,
    /// The measured value.
    pub value: f64,
    /// Collection time, when known.
    pub timestamp: Option<DateTime<Utc>>,
    pub beyond_ucl: bool,
    pub beyond_lcl: bool,
    pub beyond_usl: bool,
    pub beyond_lsl: bool,
    pub rule2: bool,
    pub rule3: bool,
}

impl ChartSpot {
    /// Rules violated at this point, in rule order.
    pub fn violations(&self) -> Vec<NelsonRule> {
        let mut rules = Vec::new();
        if self.beyond_ucl || self.beyond_lcl || self.beyond_usl || self.beyond_lsl {
            rules.push(NelsonRule::BeyondLimit);
        }
        if self.rule2 {
            rules.push(NelsonRule::RunOneSide);
        }
        if self.rule3 {
            rules.push(NelsonRule::Trend);
        }
        rules
    }

    pub fn is_violated(&self) -> bool {
        !self.violations().is_empty()
    }
}
