//! Multi-metric chart assembly.
//!
//! Fans the same pre-filtered records out to one [`MetricChartBuilder`] per
//! tracked metric and merges the four results with shared axis metadata.
//! With the `parallel` feature the four analyses run on the rayon pool; the
//! result is identical to the sequential path because no metric reads
//! another's state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::axis::{XAxis, YAxisRange};
use super::metric::{MetricChartBuilder, MetricChartResult};
use super::selection::{select_second_chart, SecondChart};
use crate::config::AnalysisOptions;
use crate::error::Result;
use crate::model::{MaterialSpec, MeasurementRecord, Metric, SpecCatalog};

/// Input of one chart request.
///
/// `records` must already be filtered to the requested period, furnace,
/// and material, in chronological order.
#[derive(Debug, Clone, Copy)]
pub struct ChartRequest<'a> {
    pub records: &'a [MeasurementRecord],
    /// Material code whose spec limits apply; `None` charts without specs.
    pub material_no: Option<&'a str>,
    /// Furnace the records were filtered to, if any.
    pub furnace_no: Option<u32>,
}

impl<'a> ChartRequest<'a> {
    pub fn new(records: &'a [MeasurementRecord]) -> Self {
        Self {
            records,
            material_no: None,
            furnace_no: None,
        }
    }

    pub fn with_material(mut self, material_no: &'a str) -> Self {
        self.material_no = Some(material_no);
        self
    }

    pub fn with_furnace(mut self, furnace_no: u32) -> Self {
        self.furnace_no = Some(furnace_no);
        self
    }
}

/// The combined chart for all four metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiMetricChartResult {
    /// Records in the request, before per-metric filtering.
    pub record_count: usize,
    pub material_no: Option<String>,
    pub furnace_no: Option<u32>,
    pub surface_hardness: MetricChartResult,
    pub compound_layer: MetricChartResult,
    pub cde: MetricChartResult,
    pub cdt: MetricChartResult,
    pub x_axis: XAxis,
    pub y_axis: BTreeMap<Metric, YAxisRange>,
    pub second_chart: SecondChart,
}

impl MultiMetricChartResult {
    pub fn chart(&self, metric: Metric) -> &MetricChartResult {
        match metric {
            Metric::SurfaceHardness => &self.surface_hardness,
            Metric::CompoundLayer => &self.compound_layer,
            Metric::Cde => &self.cde,
            Metric::Cdt => &self.cdt,
        }
    }

    /// All four charts in [`Metric::ALL`] order.
    pub fn charts(&self) -> [&MetricChartResult; 4] {
        [
            &self.surface_hardness,
            &self.compound_layer,
            &self.cde,
            &self.cdt,
        ]
    }

    pub fn is_in_control(&self) -> bool {
        self.charts().iter().all(|c| c.is_in_control())
    }
}

/// Builds a [`MultiMetricChartResult`] from one request.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use furnace_spc::{
///     AnalysisOptions, ChartRequest, MaterialSpec, MeasurementRecord, Metric,
///     MultiMetricChartAssembler, SpecCatalog, SpecLimits,
/// };
///
/// let start = Utc.with_ymd_and_hms(2025, 5, 1, 6, 0, 0).unwrap();
/// let records: Vec<MeasurementRecord> = (0..6)
///     .map(|i| MeasurementRecord {
///         furnace_no: 5,
///         material_no: "CP-7".into(),
///         collected_at: start + Duration::days(i),
///         surface_hardness: Some(600.0 + (i % 3) as f64),
///         compound_layer: Some(10.0 + (i % 2) as f64),
///         cde: Some(0.30 + 0.01 * (i % 2) as f64),
///         cdt: Some(0.50 - 0.01 * (i % 3) as f64),
///     })
///     .collect();
///
/// let catalog = SpecCatalog::new().with_material(
///     "CP-7",
///     MaterialSpec {
///         surface_hardness: Some(SpecLimits::new(550.0, 650.0).unwrap()),
///         ..MaterialSpec::default()
///     },
/// );
///
/// let result = MultiMetricChartAssembler::new(AnalysisOptions::default())
///     .assemble(&ChartRequest::new(&records).with_material("CP-7"), &catalog)
///     .unwrap();
///
/// assert_eq!(result.record_count, 6);
/// assert!(result.chart(Metric::SurfaceHardness).capability.is_some());
/// assert!(result.chart(Metric::Cde).capability.is_none());
/// assert_eq!(result.x_axis.tick_count, 6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MultiMetricChartAssembler {
    options: AnalysisOptions,
}

impl MultiMetricChartAssembler {
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Analyzes every metric of the request.
    ///
    /// # Errors
    ///
    /// - [`crate::SpcError::UnknownPeriodOrMaterial`] if the material code is
    ///   not in `catalog`
    /// - The first failing metric's error (in [`Metric::ALL`] order),
    ///   wrapped in [`crate::SpcError::Metric`]; no partial result is returned
    pub fn assemble(
        &self,
        request: &ChartRequest<'_>,
        catalog: &SpecCatalog,
    ) -> Result<MultiMetricChartResult> {
        let no_spec = MaterialSpec::default();
        let spec = match request.material_no {
            Some(material_no) => catalog.lookup(material_no)?,
            None => &no_spec,
        };
        debug!(
            records = request.records.len(),
            material = request.material_no.unwrap_or("-"),
            furnace = ?request.furnace_no,
            "assembling multi-metric chart"
        );

        let build = |metric: Metric| self.build_metric(metric, request.records, spec);

        #[cfg(feature = "parallel")]
        let ((surface_hardness, compound_layer), (cde, cdt)) = rayon::join(
            || {
                rayon::join(
                    || build(Metric::SurfaceHardness),
                    || build(Metric::CompoundLayer),
                )
            },
            || rayon::join(|| build(Metric::Cde), || build(Metric::Cdt)),
        );

        #[cfg(not(feature = "parallel"))]
        let ((surface_hardness, compound_layer), (cde, cdt)) = (
            (build(Metric::SurfaceHardness), build(Metric::CompoundLayer)),
            (build(Metric::Cde), build(Metric::Cdt)),
        );

        let surface_hardness = surface_hardness?;
        let compound_layer = compound_layer?;
        let cde = cde?;
        let cdt = cdt?;

        let x_axis = XAxis::from_timestamps(
            request.records.iter().map(|r| r.collected_at),
            self.options.max_ticks(),
        );
        let y_axis = [&surface_hardness, &compound_layer, &cde, &cdt]
            .into_iter()
            .map(|chart| (chart.metric, YAxisRange::for_chart(chart)))
            .collect();
        let second_chart = select_second_chart(
            request.furnace_no,
            &compound_layer.values(),
            &cde.values(),
            &cdt.values(),
        );

        debug!(
            ?second_chart,
            ticks = x_axis.tick_count,
            "multi-metric chart assembled"
        );

        Ok(MultiMetricChartResult {
            record_count: request.records.len(),
            material_no: request.material_no.map(str::to_owned),
            furnace_no: request.furnace_no,
            surface_hardness,
            compound_layer,
            cde,
            cdt,
            x_axis,
            y_axis,
            second_chart,
        })
    }

    fn build_metric(
        &self,
        metric: Metric,
        records: &[MeasurementRecord],
        spec: &MaterialSpec,
    ) -> Result<MetricChartResult> {
        MetricChartBuilder::new(metric, &self.options)
            .build(&metric.series(records), spec.limits(metric))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpcError;
    use crate::model::SpecLimits;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn records(n: usize) -> Vec<MeasurementRecord> {
        (0..n)
            .map(|i| {
                let wobble = [0.0, 1.0, -1.0, 2.0, -2.0][i % 5];
                MeasurementRecord {
                    furnace_no: 6,
                    material_no: "CP-42".to_string(),
                    collected_at: start() + Duration::hours(12 * i as i64),
                    surface_hardness: Some(600.0 + wobble),
                    compound_layer: Some(10.0 + wobble * 0.1),
                    cde: Some(0.35 + wobble * 0.01),
                    cdt: Some(0.45 + wobble * 0.01),
                }
            })
            .collect()
    }

    fn catalog() -> SpecCatalog {
        SpecCatalog::new().with_material(
            "CP-42",
            MaterialSpec {
                surface_hardness: Some(SpecLimits::new(550.0, 650.0).unwrap()),
                compound_layer: Some(SpecLimits::new(5.0, 15.0).unwrap()),
                cde: Some(SpecLimits::new(0.3, 0.4).unwrap()),
                cdt: None,
            },
        )
    }

    #[test]
    fn assembles_all_four_metrics() {
        let records = records(20);
        let request = ChartRequest::new(&records).with_material("CP-42").with_furnace(6);
        let result = MultiMetricChartAssembler::default()
            .assemble(&request, &catalog())
            .unwrap();

        assert_eq!(result.record_count, 20);
        assert_eq!(result.material_no.as_deref(), Some("CP-42"));
        for (chart, metric) in result.charts().iter().zip(Metric::ALL) {
            assert_eq!(chart.metric, metric);
            assert_eq!(chart.sample_count, 20);
        }
        assert!(result.surface_hardness.capability.is_some());
        assert!(result.cde.capability.is_some());
        assert!(result.cdt.capability.is_none());
        assert_eq!(result.y_axis.len(), 4);
        assert_eq!(result.x_axis.tick_count, 10);
        // CDT averages above CDE
        assert_eq!(result.second_chart, SecondChart::Cdt);
    }

    #[test]
    fn results_match_standalone_builder() {
        let records = records(15);
        let request = ChartRequest::new(&records).with_material("CP-42");
        let result = MultiMetricChartAssembler::default()
            .assemble(&request, &catalog())
            .unwrap();

        let values: Vec<f64> = records.iter().filter_map(|r| r.cde).collect();
        let standalone = MetricChartBuilder::new(Metric::Cde, &AnalysisOptions::default())
            .build_values(&values, catalog().lookup("CP-42").unwrap().cde)
            .unwrap();
        assert_eq!(result.cde.values(), standalone.values());
        assert_eq!(result.cde.i_chart, standalone.i_chart);
        assert_eq!(result.cde.capability, standalone.capability);
        assert_eq!(result.cde.rule2, standalone.rule2);
    }

    #[test]
    fn no_material_means_no_specs() {
        let records = records(10);
        let result = MultiMetricChartAssembler::default()
            .assemble(&ChartRequest::new(&records), &SpecCatalog::new())
            .unwrap();
        assert!(result.charts().iter().all(|c| c.capability.is_none()));
        assert!(result.charts().iter().all(|c| c.spec_limits.is_none()));
    }

    #[test]
    fn unknown_material_is_propagated() {
        let records = records(10);
        let err = MultiMetricChartAssembler::default()
            .assemble(&ChartRequest::new(&records).with_material("CP-404"), &catalog())
            .unwrap_err();
        assert!(matches!(err, SpcError::UnknownPeriodOrMaterial(_)));
    }

    #[test]
    fn one_failing_metric_fails_the_request() {
        let mut records = records(10);
        for r in records.iter_mut().skip(1) {
            r.compound_layer = None;
        }
        let err = MultiMetricChartAssembler::default()
            .assemble(&ChartRequest::new(&records), &SpecCatalog::new())
            .unwrap_err();
        assert_eq!(err.metric(), Some(Metric::CompoundLayer));
    }

    #[test]
    fn first_failing_metric_is_reported() {
        let mut records = records(10);
        for r in records.iter_mut() {
            r.cde = None;
            r.cdt = None;
        }
        let err = MultiMetricChartAssembler::default()
            .assemble(&ChartRequest::new(&records), &SpecCatalog::new())
            .unwrap_err();
        assert_eq!(err.metric(), Some(Metric::Cde));
    }

    #[test]
    fn missing_values_only_affect_their_metric() {
        let mut records = records(12);
        records[3].cdt = None;
        records[7].cdt = Some(f64::NAN);
        let result = MultiMetricChartAssembler::default()
            .assemble(&ChartRequest::new(&records), &SpecCatalog::new())
            .unwrap();
        assert_eq!(result.cdt.sample_count, 10);
        assert_eq!(result.surface_hardness.sample_count, 12);
        assert_eq!(result.record_count, 12);
    }

    #[test]
    fn compound_layer_furnace_selects_compound_chart() {
        let records = records(8);
        let request = ChartRequest::new(&records).with_furnace(2);
        let result = MultiMetricChartAssembler::default()
            .assemble(&request, &SpecCatalog::new())
            .unwrap();
        assert_eq!(result.second_chart, SecondChart::CompoundLayer);
    }

    #[test]
    fn assembly_is_deterministic() {
        let records = records(25);
        let request = ChartRequest::new(&records).with_material("CP-42");
        let assembler = MultiMetricChartAssembler::new(AnalysisOptions::default().with_eps(0.5));
        let first = assembler.assemble(&request, &catalog()).unwrap();
        let second = assembler.assemble(&request, &catalog()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn serializes_to_json() {
        let records = records(10);
        let result = MultiMetricChartAssembler::default()
            .assemble(&ChartRequest::new(&records).with_material("CP-42"), &catalog())
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["record_count"], 10);
        assert_eq!(json["second_chart"], "cdt");
        assert!(json["y_axis"]["surface_hardness"]["i_chart_max"].is_number());
        assert_eq!(json["cde"]["spots"].as_array().map(Vec::len), Some(10));

        // Constant metrics inside spec carry infinite capability
        let flat: Vec<MeasurementRecord> = (0..3)
            .map(|i| MeasurementRecord {
                furnace_no: 6,
                material_no: "CP-42".to_string(),
                collected_at: start() + Duration::days(i),
                surface_hardness: Some(600.0),
                compound_layer: Some(10.0),
                cde: Some(0.35),
                cdt: Some(1.0),
            })
            .collect();
        let result = MultiMetricChartAssembler::default()
            .assemble(&ChartRequest::new(&flat).with_material("CP-42"), &catalog())
            .unwrap();
        let json = serde_json::to_string(&result).unwrap();
        let back: MultiMetricChartResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.chart(Metric::Cde).capability, result.cde.capability);
        assert_eq!(
            back.surface_hardness.capability.map(|c| c.cpk),
            Some(f64::INFINITY)
        );
        assert_eq!(back.y_axis, result.y_axis);
        assert_eq!(back.x_axis, result.x_axis);
        assert_eq!(back.second_chart, result.second_chart);
    }
}
