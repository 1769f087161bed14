//! Error types for the SPC analysis engine.
//!
//! Every fallible operation in the crate returns [`SpcError`]. Failures are
//! never logged and swallowed: they carry enough context (metric, index,
//! offending value) for the caller to render a diagnostic.

use thiserror::Error;

use crate::model::Metric;

/// Main error type for SPC analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpcError {
    /// Series too short for the requested statistic.
    #[error("Insufficient data: {operation} requires at least {required} points, but got {actual}")]
    InsufficientData {
        operation: &'static str,
        required: usize,
        actual: usize,
    },

    /// Zero-length series.
    #[error("Empty series: {operation} requires at least one value")]
    EmptySeries { operation: &'static str },

    /// Specification limits missing or contradictory.
    #[error("Invalid specification limits (lower={lower}, upper={upper}): {reason}")]
    InvalidSpecLimit {
        lower: f64,
        upper: f64,
        reason: &'static str,
    },

    /// Unknown period profile or material code, surfaced from a lookup.
    #[error("Unknown period or material: {0}")]
    UnknownPeriodOrMaterial(String),

    /// NaN or infinite value inside a series.
    #[error("Non-finite value {value} at index {index}")]
    NonFiniteValue { index: usize, value: f64 },

    /// A failure while analyzing one metric.
    #[error("{metric}: {source}")]
    Metric {
        metric: Metric,
        #[source]
        source: Box<SpcError>,
    },
}

/// Result type alias for SPC operations.
pub type Result<T> = std::result::Result<T, SpcError>;

impl SpcError {
    /// Wraps this error with the metric it was raised for.
    pub fn for_metric(self, metric: Metric) -> Self {
        SpcError::Metric {
            metric,
            source: Box::new(self),
        }
    }

    /// The metric this error was raised for, if any.
    pub fn metric(&self) -> Option<Metric> {
        match self {
            SpcError::Metric { metric, .. } => Some(*metric),
            _ => None,
        }
    }

    /// Short title for the error kind.
    pub fn title(&self) -> &'static str {
        match self {
            SpcError::InsufficientData { .. } => "Insufficient Data",
            SpcError::EmptySeries { .. } => "Empty Series",
            SpcError::InvalidSpecLimit { .. } => "Invalid Spec Limit",
            SpcError::UnknownPeriodOrMaterial(_) => "Unknown Period Or Material",
            SpcError::NonFiniteValue { .. } => "Non-finite Value",
            SpcError::Metric { source, .. } => source.title(),
        }
    }
}

/// Rejects series shorter than two points and series with non-finite values.
pub(crate) fn validate_series(values: &[f64], operation: &'static str) -> Result<()> {
    match values.len() {
        0 => return Err(SpcError::EmptySeries { operation }),
        1 => {
            return Err(SpcError::InsufficientData {
                operation,
                required: 2,
                actual: 1,
            })
        }
        _ => {}
    }
    if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(SpcError::NonFiniteValue { index, value });
    }
    Ok(())
}
