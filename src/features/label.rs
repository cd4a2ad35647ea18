//! Per-port risk labels from the upper quartile of congestion indicators.

use crate::features::types::BinStats;
use crate::features::utility::quantile;

/// Quantile a bin must reach on both vessels and anchored ratio to be labeled at risk.
pub const RISK_QUANTILE: f64 = 0.75;

/// Derives the binary risk label for each of one port's bins.
///
/// A bin is labeled 1 when its vessel count and its anchored ratio are both at
/// or above the port's own 75th percentile. Thresholds are computed over
/// `bins` only, so labels are relative to this port and this run.
pub fn risk_labels(bins: &[BinStats]) -> Vec<u8> {
    let vessels: Vec<f64> = bins.iter().map(|b| b.vessels as f64).collect();
    let anchored: Vec<f64> = bins.iter().map(|b| b.anchored_ratio).collect();

    let vessels_threshold = quantile(&vessels, RISK_QUANTILE);
    let anchored_threshold = quantile(&anchored, RISK_QUANTILE);

    bins.iter()
        .map(|b| {
            let congested = b.vessels as f64 >= vessels_threshold
                && b.anchored_ratio >= anchored_threshold;
            u8::from(congested)
        })
        .collect()
}
