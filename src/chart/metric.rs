//! Per-metric chart analysis.
//!
//! One generic builder runs statistics, rules, and capability for any
//! tracked metric, so every metric is analyzed by exactly the same code.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::capability::{CapabilityAnalyzer, CapabilityProcess};
use crate::config::AnalysisOptions;
use crate::error::{Result, SpcError};
use crate::model::{DataPoint, Metric, SpecLimits};
use crate::spc::{
    BeyondLimitResult, ChartSpot, ControlLimits, NelsonRuleEvaluator, RuleOutcome, RunResult,
    SeriesStatistics, SigmaLevels, TrendResult,
};

/// Analysis of one metric's series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricChartResult {
    pub metric: Metric,
    /// Number of points analyzed.
    pub sample_count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    /// Average moving range.
    pub mr_mean: f64,
    pub i_chart: ControlLimits,
    pub mr_chart: ControlLimits,
    pub sigma_levels: SigmaLevels,
    /// Limits the series was checked against, if configured.
    pub spec_limits: Option<SpecLimits>,
    /// Present only when spec limits are configured.
    pub capability: Option<CapabilityProcess>,
    /// I chart points with their rule flags.
    pub spots: Vec<ChartSpot>,
    /// MR chart points; `mr_spots[i]` belongs to series index `i + 1`.
    pub mr_spots: Vec<f64>,
    pub rule1: BeyondLimitResult,
    pub rule2: RunResult,
    pub rule3: TrendResult,
}

impl MetricChartResult {
    /// Raw values in series order.
    pub fn values(&self) -> Vec<f64> {
        self.spots.iter().map(|s| s.value).collect()
    }

    /// Whether no rule flagged any point.
    pub fn is_in_control(&self) -> bool {
        !self.rule1.any() && !self.rule2.any() && !self.rule3.any()
    }

    /// Number of points flagged by at least one rule.
    pub fn violation_count(&self) -> usize {
        self.spots.iter().filter(|s| s.is_violated()).count()
    }
}

/// Builds a [`MetricChartResult`] for one metric.
///
/// # Examples
///
/// ```
/// use furnace_spc::{AnalysisOptions, Metric, MetricChartBuilder, SpecLimits};
///
/// let builder = MetricChartBuilder::new(Metric::SurfaceHardness, &AnalysisOptions::default());
/// let spec = SpecLimits::new(550.0, 650.0).unwrap();
/// let chart = builder
///     .build_values(&[600.0, 604.0, 598.0, 601.0, 597.0], Some(spec))
///     .unwrap();
///
/// assert_eq!(chart.sample_count, 5);
/// assert!(chart.capability.is_some());
/// assert!(chart.is_in_control());
/// ```
#[derive(Debug, Clone)]
pub struct MetricChartBuilder {
    metric: Metric,
    evaluator: NelsonRuleEvaluator,
    min_points: usize,
}

impl MetricChartBuilder {
    pub fn new(metric: Metric, options: &AnalysisOptions) -> Self {
        Self {
            metric,
            evaluator: options.evaluator(),
            min_points: options.min_points(),
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Analyzes bare values.
    pub fn build_values(&self, values: &[f64], spec: Option<SpecLimits>) -> Result<MetricChartResult> {
        let points: Vec<DataPoint> = values.iter().map(|&v| DataPoint::new(v)).collect();
        self.build(&points, spec)
    }

    /// Analyzes time-ordered data points against optional spec limits.
    ///
    /// # Errors
    ///
    /// Any error from statistics, capability, or spec validation, wrapped in
    /// [`SpcError::Metric`] with this builder's metric. A series shorter than
    /// the configured minimum fails with [`SpcError::InsufficientData`].
    pub fn build(&self, points: &[DataPoint], spec: Option<SpecLimits>) -> Result<MetricChartResult> {
        self.analyze(points, spec)
            .map_err(|e| e.for_metric(self.metric))
    }

    fn analyze(&self, points: &[DataPoint], spec: Option<SpecLimits>) -> Result<MetricChartResult> {
        if !points.is_empty() && points.len() < self.min_points {
            return Err(SpcError::InsufficientData {
                operation: "metric chart",
                required: self.min_points,
                actual: points.len(),
            });
        }
        if let Some(limits) = &spec {
            limits.validate()?;
        }

        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let stats = SeriesStatistics::compute(&values)?;
        let capability = spec
            .as_ref()
            .map(|limits| CapabilityAnalyzer::compute(&values, limits))
            .transpose()?;

        let eval = self
            .evaluator
            .evaluate(&values, stats.mean, &stats.i_chart, spec.as_ref());
        let rule2_mask = eval.rule2.mask(values.len());
        let rule3_mask = eval.rule3.mask(values.len());

        let spots = points
            .iter()
            .enumerate()
            .map(|(i, p)| ChartSpot {
                index: i,
                value: p.value,
                timestamp: p.timestamp,
                beyond_ucl: eval.rule1.beyond_ucl[i],
                beyond_lcl: eval.rule1.beyond_lcl[i],
                beyond_usl: eval.rule1.beyond_usl[i],
                beyond_lsl: eval.rule1.beyond_lsl[i],
                rule2: rule2_mask[i],
                rule3: rule3_mask[i],
            })
            .collect();

        trace!(
            metric = %self.metric,
            n = stats.n,
            mean = stats.mean,
            std = stats.std,
            rule1 = eval.rule1.violating_indices.len(),
            rule2 = eval.rule2.violating_indices.len(),
            rule3 = eval.rule3.violating_indices.len(),
            "metric analyzed"
        );

        Ok(MetricChartResult {
            metric: self.metric,
            sample_count: stats.n,
            mean: stats.mean,
            std: stats.std,
            mr_mean: stats.mr_mean(),
            i_chart: stats.i_chart,
            mr_chart: stats.mr_chart,
            sigma_levels: stats.sigma_levels,
            spec_limits: spec,
            capability,
            spots,
            mr_spots: stats.moving_ranges,
            rule1: eval.rule1,
            rule2: eval.rule2,
            rule3: eval.rule3,
        })
    }
}
