//! Analysis options.
//!
//! Host applications typically deserialize these from their own settings
//! file; every field has a default so a partial document is accepted.

use serde::{Deserialize, Serialize};

use crate::spc::NelsonRuleEvaluator;

/// Default number of x-axis ticks.
pub const DEFAULT_MAX_TICKS: usize = 10;

/// Smallest series the engine can analyze.
pub const MIN_POINTS_FLOOR: usize = 2;

/// Tunables for one analysis request.
///
/// # Examples
///
/// ```
/// use furnace_spc::AnalysisOptions;
///
/// let options = AnalysisOptions::default().with_eps(1e-6).with_min_points(5);
/// assert_eq!(options.min_points(), 5);
///
/// // Below the floor of 2 is raised
/// assert_eq!(AnalysisOptions::default().with_min_points(0).min_points(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Rule 2 tolerance: points within `eps` of the mean break runs.
    pub eps: f64,
    /// Upper bound on shared x-axis ticks.
    pub max_ticks: usize,
    /// Minimum points each metric needs; never below 2.
    pub min_points: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            eps: 0.0,
            max_ticks: DEFAULT_MAX_TICKS,
            min_points: MIN_POINTS_FLOOR,
        }
    }
}

impl AnalysisOptions {
    /// Sets the Rule 2 tolerance; negative or NaN values act as 0.
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    /// Sets the x-axis tick bound; 0 is raised to 1.
    pub fn with_max_ticks(mut self, max_ticks: usize) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Sets the minimum series length per metric; values below 2 are raised to 2.
    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    /// Effective minimum series length.
    pub fn min_points(&self) -> usize {
        self.min_points.max(MIN_POINTS_FLOOR)
    }

    /// Effective tick bound; at least one tick.
    pub fn max_ticks(&self) -> usize {
        self.max_ticks.max(1)
    }

    /// Rule evaluator configured with these options.
    pub fn evaluator(&self) -> NelsonRuleEvaluator {
        NelsonRuleEvaluator::new().with_eps(self.eps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = AnalysisOptions::default();
        assert_eq!(options.eps, 0.0);
        assert_eq!(options.max_ticks(), DEFAULT_MAX_TICKS);
        assert_eq!(options.min_points(), 2);
        assert_eq!(options.evaluator().eps(), 0.0);
    }

    #[test]
    fn partial_document_uses_defaults() {
        let options: AnalysisOptions = serde_json::from_str(r#"{ "eps": 0.001 }"#).unwrap();
        assert_eq!(options.eps, 0.001);
        assert_eq!(options.max_ticks, DEFAULT_MAX_TICKS);
        assert_eq!(options.min_points, MIN_POINTS_FLOOR);
    }

    #[test]
    fn clamps() {
        let options = AnalysisOptions::default().with_max_ticks(0).with_eps(-2.0);
        assert_eq!(options.max_ticks(), 1);
        assert_eq!(options.evaluator().eps(), 0.0);
        assert_eq!(options.with_eps(f64::NAN).evaluator().eps(), 0.0);
        assert_eq!(options.with_min_points(1).min_points(), MIN_POINTS_FLOOR);
    }
}
