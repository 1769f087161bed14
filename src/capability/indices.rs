//! Process capability indices (Cp, Cpk, Cpu, Cpl).
//!
//! Capability indices quantify how well a process output fits within its
//! specification limits. Sigma is the population standard deviation of the
//! series, the same estimate used for the individuals chart limits.
//!
//! # Zero variance
//!
//! When every value is identical the usual formulas divide by zero. The
//! result is then fixed rather than left to floating-point propagation:
//! all four indices are `+∞` when the mean lies strictly inside the limits,
//! and `0` when it lies on or outside a limit.
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 8.
//! - Kane (1986), "Process Capability Indices", *Journal of Quality Technology*
//!   18(1), pp. 41--52.

use serde::{Deserialize, Serialize};

use crate::error::{validate_series, Result, SpcError};
use crate::model::SpecLimits;
use crate::spc::mean_and_std_dev;

/// Decimal places kept in reported indices.
pub const CAPABILITY_DECIMALS: i32 = 3;

/// Computed capability indices, rounded to [`CAPABILITY_DECIMALS`] places.
///
/// # Index interpretation
///
/// | Index | Value | Interpretation |
/// |-------|-------|----------------|
/// | Cp | >= 1.33 | Process spread fits the tolerance |
/// | Cpk | >= 1.33 | Process is capable and centered |
///
/// Reference: Montgomery (2019), Chapter 8, Table 8.5.
///
/// Serialized indices that are not finite are written as the strings
/// `"Infinity"`, `"-Infinity"`, or `"NaN"` and read back the same way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapabilityProcess {
    /// Population standard deviation.
    pub std: f64,
    /// Cpu = (USL - mean) / (3 * std).
    #[serde(with = "extended_float")]
    pub cpu: f64,
    /// Cpl = (mean - LSL) / (3 * std).
    #[serde(with = "extended_float")]
    pub cpl: f64,
    /// Cp = (USL - LSL) / (6 * std).
    #[serde(with = "extended_float")]
    pub cp: f64,
    /// Cpk = min(Cpu, Cpl).
    #[serde(with = "extended_float")]
    pub cpk: f64,
}

impl CapabilityProcess {
    /// Whether both Cp and Cpk reach `threshold` (1.33 is customary).
    pub fn is_capable(&self, threshold: f64) -> bool {
        self.cp >= threshold && self.cpk >= threshold
    }
}

/// Computes [`CapabilityProcess`] from a series and two-sided limits.
///
/// # Examples
///
/// ```
/// use furnace_spc::capability::CapabilityAnalyzer;
/// use furnace_spc::SpecLimits;
///
/// let limits = SpecLimits::new(0.0, 20.0).unwrap();
///
/// let indices = CapabilityAnalyzer::compute(&[9.0, 11.0], &limits).unwrap();
/// assert_eq!(indices.std, 1.0);
/// assert_eq!(indices.cp, 3.333);
///
/// // Zero variance with the mean inside the limits
/// let flat = CapabilityAnalyzer::compute(&[10.0, 10.0, 10.0], &limits).unwrap();
/// assert_eq!(flat.cp, f64::INFINITY);
/// assert_eq!(flat.cpk, f64::INFINITY);
/// ```
pub struct CapabilityAnalyzer;

impl CapabilityAnalyzer {
    /// Computes capability indices.
    ///
    /// # Errors
    ///
    /// - [`SpcError::EmptySeries`] if `series` is empty
    /// - [`SpcError::InsufficientData`] if `series` has a single point
    /// - [`SpcError::NonFiniteValue`] if any value is NaN or infinite
    /// - [`SpcError::InvalidSpecLimit`] if `limits` violate their invariants
    pub fn compute(series: &[f64], limits: &SpecLimits) -> Result<CapabilityProcess> {
        const OPERATION: &str = "capability";
        validate_series(series, OPERATION)?;
        limits.validate()?;

        let (mean, std) = mean_and_std_dev(series).ok_or(SpcError::EmptySeries {
            operation: OPERATION,
        })?;

        if std == 0.0 {
            return Ok(zero_variance(mean, limits));
        }

        let cpu = round_to(
            (limits.upper - mean) / (3.0 * std),
            CAPABILITY_DECIMALS,
        );
        let cpl = round_to(
            (mean - limits.lower) / (3.0 * std),
            CAPABILITY_DECIMALS,
        );
        let cp = round_to(
            (limits.upper - limits.lower) / (6.0 * std),
            CAPABILITY_DECIMALS,
        );

        Ok(CapabilityProcess {
            std: round_to(std, CAPABILITY_DECIMALS),
            cpu,
            cpl,
            cp,
            cpk: cpu.min(cpl),
        })
    }
}

fn zero_variance(mean: f64, limits: &SpecLimits) -> CapabilityProcess {
    let index = if limits.strictly_contains(mean) {
        f64::INFINITY
    } else {
        0.0
    };
    CapabilityProcess {
        std: 0.0,
        cpu: index,
        cpl: index,
        cp: index,
        cpk: index,
    }
}

/// Serde adapter for `f64` fields that may hold `±∞` or NaN.
mod extended_float {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    const INFINITY: &str = "Infinity";
    const NEG_INFINITY: &str = "-Infinity";
    const NAN: &str = "NaN";

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str(NAN)
        } else if value.is_sign_positive() {
            serializer.serialize_str(INFINITY)
        } else {
            serializer.serialize_str(NEG_INFINITY)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => match text.as_str() {
                INFINITY => Ok(f64::INFINITY),
                NEG_INFINITY => Ok(f64::NEG_INFINITY),
                NAN => Ok(f64::NAN),
                other => Err(D::Error::custom(format!(
                    "expected a number, \"{INFINITY}\", \"{NEG_INFINITY}\", or \"{NAN}\", got \"{other}\""
                ))),
            },
        }
    }
}

/// Rounds half away from zero to `decimals` places. Non-finite input is
/// returned unchanged.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn cpk_is_min_of_cpu_cpl(
            data in proptest::collection::vec(-1e3_f64..1e3, 2..=50),
            lower in -2e3_f64..0.0,
            width in 1.0_f64..4e3,
        ) {
            let limits = SpecLimits::new(lower, lower + width).unwrap();
            let indices = CapabilityAnalyzer::compute(&data, &limits).unwrap();
            prop_assert!(indices.std >= 0.0);
            prop_assert_eq!(indices.cpk, indices.cpu.min(indices.cpl));
            prop_assert!(!indices.cp.is_nan() && !indices.cpk.is_nan());
        }
    }
}
