//! Axis metadata shared by the rendered charts.
//!
//! The x-axis is common to all metrics and derives from the period the
//! records span. Y-axis hints are per metric and wide enough that no data
//! point, control limit, sigma zone, or spec limit is clipped.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::metric::MetricChartResult;

/// Spans at least this long are labelled by date only.
const DATE_ONLY_SPAN_DAYS: i64 = 2;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%m-%d %H:%M";

/// Shared x-axis ticks and labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XAxis {
    pub tick_count: usize,
    /// One label per tick, evenly spaced from `start` to `end`.
    pub labels: Vec<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl XAxis {
    /// Builds ticks over the span of `timestamps`.
    ///
    /// The tick count is the number of timestamps capped at `max_ticks`;
    /// a span of a single instant gets one tick.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use furnace_spc::chart::XAxis;
    ///
    /// let days: Vec<_> = (1..=5)
    ///     .map(|d| Utc.with_ymd_and_hms(2025, 6, d, 0, 0, 0).unwrap())
    ///     .collect();
    /// let axis = XAxis::from_timestamps(days, 3);
    /// assert_eq!(axis.labels, vec!["2025-06-01", "2025-06-03", "2025-06-05"]);
    /// ```
    pub fn from_timestamps<I>(timestamps: I, max_ticks: usize) -> Self
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut count = 0_usize;
        let mut bounds: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
        for t in timestamps {
            count += 1;
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(t), hi.max(t)),
                None => (t, t),
            });
        }
        let Some((start, end)) = bounds else {
            return Self::default();
        };

        let span = end - start;
        let tick_count = if span == Duration::zero() {
            1
        } else {
            count.min(max_ticks.max(1))
        };
        let format = if span >= Duration::days(DATE_ONLY_SPAN_DAYS) {
            DATE_FORMAT
        } else {
            DATE_TIME_FORMAT
        };

        let labels = (0..tick_count)
            .map(|k| tick_at(start, span, k, tick_count).format(format).to_string())
            .collect();

        Self {
            tick_count,
            labels,
            start: Some(start),
            end: Some(end),
        }
    }
}

fn tick_at(start: DateTime<Utc>, span: Duration, k: usize, tick_count: usize) -> DateTime<Utc> {
    if tick_count < 2 {
        return start;
    }
    let offset = i128::from(span.num_milliseconds()) * k as i128 / (tick_count - 1) as i128;
    // offset never exceeds the span, which already fits in i64 milliseconds
    start + Duration::milliseconds(offset as i64)
}

/// Y-axis bounds for one metric's I chart and MR chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YAxisRange {
    pub i_chart_min: f64,
    pub i_chart_max: f64,
    pub mr_chart_min: f64,
    pub mr_chart_max: f64,
}

impl YAxisRange {
    /// Union of data, control limits, sigma zones, and spec limits.
    pub fn for_chart(chart: &MetricChartResult) -> Self {
        let values = chart.spots.iter().map(|s| s.value);
        let spec = chart.spec_limits;

        let i_chart_max = finite_max(
            values
                .clone()
                .chain([chart.i_chart.ucl, chart.sigma_levels.sigma_plus_3])
                .chain(spec.map(|s| s.upper)),
        );
        let i_chart_min = finite_min(
            values
                .chain([chart.i_chart.lcl, chart.sigma_levels.sigma_minus_3])
                .chain(spec.map(|s| s.lower)),
        );
        let mr_chart_max = finite_max(
            chart
                .mr_spots
                .iter()
                .copied()
                .chain([chart.mr_chart.ucl]),
        );
        let mr_chart_min = finite_min(chart.mr_spots.iter().copied().chain([0.0]));

        Self {
            i_chart_min,
            i_chart_max,
            mr_chart_min,
            mr_chart_max,
        }
    }
}

/// Largest finite value, or 0 if there is none.
fn finite_max(values: impl Iterator<Item = f64>) -> f64 {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
        .unwrap_or(0.0)
}

/// Smallest finite value, or 0 if there is none.
fn finite_min(values: impl Iterator<Item = f64>) -> f64 {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
        .unwrap_or(0.0)
}
