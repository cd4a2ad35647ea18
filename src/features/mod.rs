//! Time-binned spatial aggregation and risk labeling.
//!
//! This module filters AIS points against each port's radius, buckets them
//! into fixed-width time bins, computes per-bin congestion features, and
//! labels each bin relative to its own port's distribution.

pub mod aggregate;
pub mod builder;
pub mod label;
pub mod types;
pub mod utility;

pub use builder::{build, build_concurrent};
pub use types::{AisPoint, BinStats, BinWidth, PortDefinition, PortTimeSeriesRow};
