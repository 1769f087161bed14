//! Choice of the secondary chart shown beside surface hardness.

use serde::{Deserialize, Serialize};
use u_numflow::stats;

use crate::model::Metric;

/// Furnaces that produce a compound layer worth charting.
const COMPOUND_LAYER_FURNACES: std::ops::RangeInclusive<u32> = 1..=3;

/// Which secondary metric a rendering layer should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondChart {
    CompoundLayer,
    Cde,
    Cdt,
    /// No secondary metric has usable data.
    NotApplicable,
}

impl SecondChart {
    /// The metric to chart, if any.
    pub fn metric(self) -> Option<Metric> {
        match self {
            SecondChart::CompoundLayer => Some(Metric::CompoundLayer),
            SecondChart::Cde => Some(Metric::Cde),
            SecondChart::Cdt => Some(Metric::Cdt),
            SecondChart::NotApplicable => None,
        }
    }
}

/// Picks the secondary chart from the furnace filter and the metric series.
///
/// Rules, first match wins:
///
/// 1. Compound-layer furnaces (1-3) with compound-layer data chart the compound layer
/// 2. CDE and CDT both averaging exactly 0 means nothing to chart
/// 3. With both CDE and CDT data, the one with the larger mean (CDE on a tie)
/// 4. Whichever of CDE or CDT has data
/// 5. Compound layer, if it has data
///
/// Empty series are accepted so the choice can be made from partial data.
/// [`crate::MultiMetricChartAssembler`] only calls this after every metric
/// analyzed successfully, so through the assembler all four series hold at
/// least two points and rules 4 and 5 never apply.
///
/// # Examples
///
/// ```
/// use furnace_spc::chart::{select_second_chart, SecondChart};
///
/// let chart = select_second_chart(Some(7), &[], &[0.4, 0.5], &[0.6, 0.7]);
/// assert_eq!(chart, SecondChart::Cdt);
/// ```
pub fn select_second_chart(
    furnace_no: Option<u32>,
    compound_layer: &[f64],
    cde: &[f64],
    cdt: &[f64],
) -> SecondChart {
    let cde_mean = stats::mean(cde);
    let cdt_mean = stats::mean(cdt);
    let has_cl = !compound_layer.is_empty();

    if has_cl && furnace_no.is_some_and(|f| COMPOUND_LAYER_FURNACES.contains(&f)) {
        return SecondChart::CompoundLayer;
    }
    if cde_mean == Some(0.0) && cdt_mean == Some(0.0) {
        return SecondChart::NotApplicable;
    }
    match (cde.is_empty(), cdt.is_empty()) {
        (false, false) => match (cde_mean, cdt_mean) {
            (Some(e), Some(t)) if e < t => SecondChart::Cdt,
            _ => SecondChart::Cde,
        },
        (false, true) => SecondChart::Cde,
        (true, false) => SecondChart::Cdt,
        (true, true) if has_cl && stats::mean(compound_layer).is_some() => {
            SecondChart::CompoundLayer
        }
        (true, true) => SecondChart::NotApplicable,
    }
}
