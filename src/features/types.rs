//! Data types used by the aggregation pipeline.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single cleaned AIS position report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AisPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "mmsi")]
    pub vessel_id: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "sog")]
    pub speed_over_ground: f64,
}

/// A monitored port: center coordinate plus congestion-monitoring radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDefinition {
    pub port_name: String,
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
}

/// Fixed width of a time bin, stored in whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinWidth(i64);

impl BinWidth {
    pub const DEFAULT_MINUTES: i64 = 30;

    pub fn new(width: TimeDelta) -> Result<Self> {
        let ms = width.num_milliseconds();
        if ms <= 0 || TimeDelta::milliseconds(ms) != width {
            return Err(Error::InvalidBinWidth(format!("{width}")));
        }
        Ok(Self(ms))
    }

    pub fn from_minutes(minutes: i64) -> Result<Self> {
        let width = TimeDelta::try_minutes(minutes)
            .ok_or_else(|| Error::InvalidBinWidth(format!("{minutes} minutes")))?;
        Self::new(width)
    }

    pub fn as_delta(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.0)
    }

    /// Start of the bin containing `ts`: `ts` truncated down to the nearest
    /// multiple of the width since the Unix epoch.
    pub fn floor(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let ms = ts.timestamp_millis();
        let start = ms - ms.rem_euclid(self.0);
        // Only unrepresentable at the very bottom of chrono's range.
        DateTime::from_timestamp_millis(start).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl Default for BinWidth {
    fn default() -> Self {
        Self(Self::DEFAULT_MINUTES * 60 * 1000)
    }
}

/// Statistics for one non-empty time bin of one port.
#[derive(Debug, Clone, PartialEq)]
pub struct BinStats {
    pub tbin: DateTime<Utc>,
    pub vessels: usize,
    pub points: usize,
    pub mean_sog: f64,
    pub p10_sog: f64,
    pub anchored_ratio: f64,
}

/// One row of the output table, keyed by `(port_name, tbin)`.
///
/// Field order is the CSV column order consumed by training and the monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortTimeSeriesRow {
    pub tbin: DateTime<Utc>,
    pub vessels: usize,
    pub points: usize,
    pub mean_sog: f64,
    pub p10_sog: f64,
    pub anchored_ratio: f64,
    pub port_name: String,
    pub risk_label: u8,
}

impl PortTimeSeriesRow {
    pub fn from_stats(port_name: &str, stats: BinStats, risk_label: u8) -> Self {
        Self {
            tbin: stats.tbin,
            vessels: stats.vessels,
            points: stats.points,
            mean_sog: stats.mean_sog,
            p10_sog: stats.p10_sog,
            anchored_ratio: stats.anchored_ratio,
            port_name: port_name.to_string(),
            risk_label,
        }
    }
}
