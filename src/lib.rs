//! # furnace-spc
//!
//! Statistical process control (SPC) and process capability analysis for
//! heat-treatment furnace quality metrics.
//!
//! Each lot carries four metrics (surface hardness, compound layer depth,
//! CDE, and CDT). For every metric the engine derives I-MR control limits,
//! sigma zones, Nelson Rules 1-3, and, when specification limits are known,
//! Cp/Cpk. Results are plain serializable data for a charting front end.
//!
//! ## Modules
//!
//! - [`spc`] — Series statistics, control limits, and Nelson run rules
//! - [`capability`] — Process capability indices (Cp, Cpu, Cpl, Cpk)
//! - [`chart`] — Per-metric charts, multi-metric assembly, axis metadata
//! - [`model`] — Metrics, measurement records, and specification limits
//! - [`config`] — Analysis options
//! - [`error`] — Error type shared by every operation
//!
//! ## Example
//!
//! ```
//! use furnace_spc::{AnalysisOptions, Metric, MetricChartBuilder, SpecLimits};
//!
//! let hardness = [612.0, 608.0, 615.0, 610.0, 606.0, 611.0, 609.0];
//! let spec = SpecLimits::new(580.0, 640.0).unwrap();
//!
//! let chart = MetricChartBuilder::new(Metric::SurfaceHardness, &AnalysisOptions::default())
//!     .build_values(&hardness, Some(spec))
//!     .unwrap();
//!
//! assert!(chart.is_in_control());
//! assert!(chart.capability.unwrap().cpk > 1.0);
//! ```
//!
//! ## Features
//!
//! - `parallel` — Analyze the four metrics of a request on the rayon pool

pub mod capability;
pub mod chart;
pub mod config;
pub mod error;
pub mod model;
pub mod spc;

pub use chart::{
    ChartRequest, MetricChartBuilder, MetricChartResult, MultiMetricChartAssembler,
    MultiMetricChartResult,
};
pub use config::AnalysisOptions;
pub use error::{Result, SpcError};
pub use model::{DataPoint, MaterialSpec, MeasurementRecord, Metric, SpecCatalog, SpecLimits};
