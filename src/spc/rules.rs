//! Nelson run rules for detecting non-random patterns on an individuals chart.
//!
//! Three rules are evaluated, each in a single left-to-right pass:
//!
//! 1. Any point beyond a control limit or a specification limit
//! 2. 9 or more consecutive points on the same side of the mean
//! 3. 6 or more consecutive points strictly increasing or decreasing
//!
//! Rules are independent: a point may be flagged by several rules and each
//! rule reports its own segments and indices. Violating indices are always
//! ascending, unique, and inside `[0, len)`.
//!
//! # References
//!
//! - Nelson, L.S. (1984). "The Shewhart Control Chart — Tests for Special Causes",
//!   *Journal of Quality Technology* 16(4), pp. 237-239.
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.

use serde::{Deserialize, Serialize};

use super::chart::ControlLimits;
use crate::model::SpecLimits;

/// Run length at which Rule 2 fires.
pub const RUN_LENGTH: usize = 9;

/// Series shorter than this skip the Rule 2 scan entirely.
pub const RUN_MIN_SERIES: usize = 4;

/// Number of points forming a Rule 3 trend.
pub const TREND_LENGTH: usize = 6;

/// Output shared by all rule results.
pub trait RuleOutcome {
    /// Ascending, unique violating indices.
    fn violating_indices(&self) -> &[usize];

    /// `mask[i]` is true iff index `i` violates the rule.
    fn mask(&self, len: usize) -> Vec<bool> {
        let mut mask = vec![false; len];
        for &i in self.violating_indices() {
            if let Some(m) = mask.get_mut(i) {
                *m = true;
            }
        }
        mask
    }

    fn any(&self) -> bool {
        !self.violating_indices().is_empty()
    }
}

/// Side of the mean a run lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Above,
    Below,
}

/// Direction of a trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

/// Inclusive index range of a qualifying Rule 2 run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSegment {
    pub start: usize,
    pub end: usize,
    pub side: Side,
}

/// Inclusive index range of a qualifying Rule 3 trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSegment {
    pub start: usize,
    pub end: usize,
    pub direction: Direction,
}

/// Rule 1 output: per-limit masks plus violating indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeyondLimitResult {
    pub beyond_ucl: Vec<bool>,
    pub beyond_lcl: Vec<bool>,
    pub beyond_usl: Vec<bool>,
    pub beyond_lsl: Vec<bool>,
    /// Indices beyond a control limit.
    pub control_indices: Vec<usize>,
    /// Indices beyond a specification limit.
    pub spec_indices: Vec<usize>,
    /// Indices beyond either kind of limit.
    pub violating_indices: Vec<usize>,
}

/// Rule 2 output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub segments: Vec<RunSegment>,
    pub violating_indices: Vec<usize>,
}

/// Rule 3 output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub segments: Vec<TrendSegment>,
    pub violating_indices: Vec<usize>,
}

impl RuleOutcome for BeyondLimitResult {
    fn violating_indices(&self) -> &[usize] {
        &self.violating_indices
    }
}

impl RuleOutcome for RunResult {
    fn violating_indices(&self) -> &[usize] {
        &self.violating_indices
    }
}

impl RuleOutcome for TrendResult {
    fn violating_indices(&self) -> &[usize] {
        &self.violating_indices
    }
}

/// All three rule outputs for one series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleEvaluation {
    pub rule1: BeyondLimitResult,
    pub rule2: RunResult,
    pub rule3: TrendResult,
}

/// Evaluates Nelson Rules 1-3 over an ordered series.
///
/// # Examples
///
/// ```
/// use furnace_spc::spc::{NelsonRuleEvaluator, RuleOutcome, Side};
///
/// let evaluator = NelsonRuleEvaluator::new();
/// let r2 = evaluator.rule2(&[1.0; 11], 0.0);
/// assert_eq!(r2.segments.len(), 1);
/// assert_eq!(r2.segments[0].side, Side::Above);
/// assert_eq!(r2.violating_indices(), &[8, 9, 10]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NelsonRuleEvaluator {
    eps: f64,
}

impl NelsonRuleEvaluator {
    /// Evaluator with a zero Rule 2 tolerance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Rule 2 tolerance around the mean.
    ///
    /// Points within `eps` of the mean are neutral and break runs. Negative
    /// or NaN tolerances are treated as 0.
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps.max(0.0);
        self
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Runs all three rules.
    pub fn evaluate(
        &self,
        values: &[f64],
        mean: f64,
        control: &ControlLimits,
        spec: Option<&SpecLimits>,
    ) -> RuleEvaluation {
        RuleEvaluation {
            rule1: self.rule1(values, control, spec),
            rule2: self.rule2(values, mean),
            rule3: self.rule3(values),
        }
    }

    /// Nelson Rule 1: point beyond a limit.
    ///
    /// Control and specification variants are evaluated independently. A
    /// point exactly on a limit is not a violation.
    pub fn rule1(
        &self,
        values: &[f64],
        control: &ControlLimits,
        spec: Option<&SpecLimits>,
    ) -> BeyondLimitResult {
        let n = values.len();
        let mut result = BeyondLimitResult {
            beyond_ucl: vec![false; n],
            beyond_lcl: vec![false; n],
            beyond_usl: vec![false; n],
            beyond_lsl: vec![false; n],
            ..BeyondLimitResult::default()
        };

        for (i, &v) in values.iter().enumerate() {
            result.beyond_ucl[i] = v > control.ucl;
            result.beyond_lcl[i] = v < control.lcl;
            if let Some(spec) = spec {
                result.beyond_usl[i] = v > spec.upper;
                result.beyond_lsl[i] = v < spec.lower;
            }

            let control_hit = result.beyond_ucl[i] || result.beyond_lcl[i];
            let spec_hit = result.beyond_usl[i] || result.beyond_lsl[i];
            if control_hit {
                result.control_indices.push(i);
            }
            if spec_hit {
                result.spec_indices.push(i);
            }
            if control_hit || spec_hit {
                result.violating_indices.push(i);
            }
        }
        result
    }

    /// Nelson Rule 2: 9 or more consecutive points on the same side of `mean`.
    ///
    /// Within a qualifying run, points from the 9th onward are flagged.
    pub fn rule2(&self, values: &[f64], mean: f64) -> RunResult {
        let n = values.len();
        if n < RUN_MIN_SERIES {
            return RunResult::default();
        }

        let mut segments = Vec::new();
        // (side, start) of the open run
        let mut open: Option<(Side, usize)> = None;

        for (i, &v) in values.iter().enumerate() {
            let side = self.side_of(v, mean);
            if let (Some((run_side, _)), Some(s)) = (open, side) {
                if run_side == s {
                    continue;
                }
            }
            if let Some((run_side, start)) = open.take() {
                close_run(&mut segments, start, i - 1, run_side);
            }
            open = side.map(|s| (s, i));
        }
        if let Some((run_side, start)) = open {
            close_run(&mut segments, start, n - 1, run_side);
        }

        // Segments are disjoint and ascending, so the indices are too.
        let violating_indices = segments
            .iter()
            .flat_map(|seg| seg.start + (RUN_LENGTH - 1)..=seg.end)
            .collect();

        RunResult {
            segments,
            violating_indices,
        }
    }

    /// Nelson Rule 3: 6 or more consecutive points strictly increasing or
    /// strictly decreasing. Every point of a qualifying trend is flagged.
    ///
    /// Equal consecutive values break a trend the same way a reversal does.
    pub fn rule3(&self, values: &[f64]) -> TrendResult {
        let n = values.len();
        let mut segments = Vec::new();
        // (direction, start) of the open trend
        let mut open: Option<(Direction, usize)> = None;

        for i in 1..n {
            let step = step_direction(values[i - 1], values[i]);
            if let (Some((dir, _)), Some(d)) = (open, step) {
                if dir == d {
                    continue;
                }
            }
            if let Some((dir, start)) = open.take() {
                close_trend(&mut segments, start, i - 1, dir);
            }
            open = step.map(|d| (d, i - 1));
        }
        if let Some((dir, start)) = open {
            close_trend(&mut segments, start, n - 1, dir);
        }

        // Adjacent trends of opposite direction share their turning point.
        let mut violating_indices: Vec<usize> = segments
            .iter()
            .flat_map(|seg| seg.start..=seg.end)
            .collect();
        violating_indices.dedup();

        TrendResult {
            segments,
            violating_indices,
        }
    }

    fn side_of(&self, value: f64, mean: f64) -> Option<Side> {
        let d = value - mean;
        if d > self.eps {
            Some(Side::Above)
        } else if d < -self.eps {
            Some(Side::Below)
        } else {
            None
        }
    }
}

fn step_direction(prev: f64, next: f64) -> Option<Direction> {
    if next > prev {
        Some(Direction::Up)
    } else if next < prev {
        Some(Direction::Down)
    } else {
        None
    }
}

fn close_run(segments: &mut Vec<RunSegment>, start: usize, end: usize, side: Side) {
    if end + 1 - start >= RUN_LENGTH {
        segments.push(RunSegment { start, end, side });
    }
}

fn close_trend(segments: &mut Vec<TrendSegment>, start: usize, end: usize, direction: Direction) {
    if end + 1 - start >= TREND_LENGTH {
        segments.push(TrendSegment {
            start,
            end,
            direction,
        });
    }
}
