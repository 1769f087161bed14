//! Chart assembly for the furnace quality metrics.
//!
//! # Per metric
//!
//! - [`MetricChartBuilder`] — Statistics, Nelson rules, and capability for
//!   one metric's series, merged into per-point [`crate::spc::ChartSpot`]s
//!
//! # Across metrics
//!
//! - [`MultiMetricChartAssembler`] — Runs the builder for all four metrics
//!   of one request and attaches shared axis metadata
//! - [`XAxis`], [`YAxisRange`] — Tick labels and y-axis bounds hints
//! - [`select_second_chart`] — Which secondary metric to display

mod assembler;
mod axis;
mod metric;
mod selection;

pub use assembler::{ChartRequest, MultiMetricChartAssembler, MultiMetricChartResult};
pub use axis::{XAxis, YAxisRange};
pub use metric::{MetricChartBuilder, MetricChartResult};
pub use selection::{select_second_chart, SecondChart};
