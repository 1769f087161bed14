//! Process capability analysis.
//!
//! Computes standard capability indices for assessing how well a process
//! meets its specification limits.
//!
//! # Indices
//!
//! - **Cp** — Potential capability (spread vs tolerance)
//! - **Cpu**, **Cpl** — One-sided capability against each limit
//! - **Cpk** — Actual capability (centering considered)
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.

mod indices;

pub use indices::{round_to, CapabilityAnalyzer, CapabilityProcess, CAPABILITY_DECIMALS};
