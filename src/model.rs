//! Domain model: tracked metrics, measurement records, and specification limits.
//!
//! Everything here is plain data owned by the caller. The analysis engine
//! only reads it; lookups such as [`SpecCatalog`] are read-only snapshots
//! handed in per request.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpcError};

/// The four quality metrics tracked per lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Mean surface hardness.
    SurfaceHardness,
    /// Compound (white) layer depth.
    CompoundLayer,
    /// Effective case depth, X direction (CDE-X).
    Cde,
    /// Total case depth, X direction (CDT-X).
    Cdt,
}

impl Metric {
    /// All metrics in assembly order.
    pub const ALL: [Metric; 4] = [
        Metric::SurfaceHardness,
        Metric::CompoundLayer,
        Metric::Cde,
        Metric::Cdt,
    ];

    /// Extracts this metric's series from time-ordered records.
    ///
    /// Records whose value for this metric is missing or non-finite are
    /// skipped; they still contribute to the other metrics.
    pub fn series(self, records: &[MeasurementRecord]) -> Vec<DataPoint> {
        records.iter().filter_map(|r| r.data_point(self)).collect()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::SurfaceHardness => "surface hardness",
            Metric::CompoundLayer => "compound layer",
            Metric::Cde => "CDE",
            Metric::Cdt => "CDT",
        };
        f.write_str(name)
    }
}

/// A single measurement of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub value: f64,
    pub timestamp: Option<DateTime<Utc>>,
    pub furnace_no: Option<u32>,
    pub material_no: Option<String>,
}

impl DataPoint {
    /// A bare value with no lot metadata.
    pub fn new(value: f64) -> Self {
        Self {
            value,
            timestamp: None,
            furnace_no: None,
            material_no: None,
        }
    }
}

/// One lot's measurements as delivered by the upstream filtering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub furnace_no: u32,
    pub material_no: String,
    pub collected_at: DateTime<Utc>,
    pub surface_hardness: Option<f64>,
    pub compound_layer: Option<f64>,
    pub cde: Option<f64>,
    pub cdt: Option<f64>,
}

impl MeasurementRecord {
    /// Raw value for `metric`, if recorded.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::SurfaceHardness => self.surface_hardness,
            Metric::CompoundLayer => self.compound_layer,
            Metric::Cde => self.cde,
            Metric::Cdt => self.cdt,
        }
    }

    /// The record as a data point of `metric`, or `None` if the value is
    /// missing or non-finite.
    pub fn data_point(&self, metric: Metric) -> Option<DataPoint> {
        let value = self.value(metric).filter(|v| v.is_finite())?;
        Some(DataPoint {
            value,
            timestamp: Some(self.collected_at),
            furnace_no: Some(self.furnace_no),
            material_no: Some(self.material_no.clone()),
        })
    }
}

/// Two-sided specification limits for one metric.
///
/// # Invariants
///
/// - Both limits are finite
/// - `lower < upper`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecLimits {
    /// Lower specification limit (LSL).
    pub lower: f64,
    /// Upper specification limit (USL).
    pub upper: f64,
    /// Nominal target, informational only.
    #[serde(default)]
    pub target: Option<f64>,
}

impl SpecLimits {
    /// Creates validated specification limits.
    ///
    /// # Errors
    ///
    /// [`SpcError::InvalidSpecLimit`] if either limit is non-finite or
    /// `lower >= upper`.
    ///
    /// # Examples
    ///
    /// ```
    /// use furnace_spc::SpecLimits;
    ///
    /// assert!(SpecLimits::new(550.0, 650.0).is_ok());
    /// assert!(SpecLimits::new(650.0, 550.0).is_err());
    /// ```
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        let limits = Self {
            lower,
            upper,
            target: None,
        };
        limits.validate()?;
        Ok(limits)
    }

    /// Sets the nominal target.
    pub fn with_target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }

    /// Checks the invariants; deserialized limits bypass [`SpecLimits::new`].
    pub fn validate(&self) -> Result<()> {
        let reason = if !self.lower.is_finite() || !self.upper.is_finite() {
            Some("limits must be finite")
        } else if self.lower >= self.upper {
            Some("lower limit must be below upper limit")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(SpcError::InvalidSpecLimit {
                lower: self.lower,
                upper: self.upper,
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Whether `value` lies strictly between the limits.
    pub fn strictly_contains(&self, value: f64) -> bool {
        value > self.lower && value < self.upper
    }
}

/// Specification limits for every metric of one material code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    #[serde(default)]
    pub surface_hardness: Option<SpecLimits>,
    #[serde(default)]
    pub compound_layer: Option<SpecLimits>,
    #[serde(default)]
    pub cde: Option<SpecLimits>,
    #[serde(default)]
    pub cdt: Option<SpecLimits>,
}

impl MaterialSpec {
    /// Limits configured for `metric`.
    pub fn limits(&self, metric: Metric) -> Option<SpecLimits> {
        match metric {
            Metric::SurfaceHardness => self.surface_hardness,
            Metric::CompoundLayer => self.compound_layer,
            Metric::Cde => self.cde,
            Metric::Cdt => self.cdt,
        }
    }
}

/// Read-only snapshot of specification limits keyed by material code.
///
/// Owned by whatever cache or repository the host application uses and
/// passed into the assembler per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecCatalog {
    materials: HashMap<String, MaterialSpec>,
}

impl SpecCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the limits of one material code.
    pub fn with_material(mut self, material_no: impl Into<String>, spec: MaterialSpec) -> Self {
        self.materials.insert(material_no.into(), spec);
        self
    }

    /// Looks up a material code.
    ///
    /// # Errors
    ///
    /// [`SpcError::UnknownPeriodOrMaterial`] if the code is not in the snapshot.
    pub fn lookup(&self, material_no: &str) -> Result<&MaterialSpec> {
        self.materials
            .get(material_no)
            .ok_or_else(|| SpcError::UnknownPeriodOrMaterial(format!("material '{material_no}'")))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl FromIterator<(String, MaterialSpec)> for SpecCatalog {
    fn from_iter<I: IntoIterator<Item = (String, MaterialSpec)>>(iter: I) -> Self {
        Self {
            materials: iter.into_iter().collect(),
        }
    }
}
