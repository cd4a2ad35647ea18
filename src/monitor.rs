//! Per-port view over the time-series table.
//!
//! Selects one port's rows in time order, reports the latest bin and, given a
//! classifier, its 0–100 risk score and alert state. A port without rows is an
//! empty state rather than an error.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::features::types::PortTimeSeriesRow;
use crate::scoring::{Classifier, feature_vector, risk_score};

pub const DEFAULT_ALERT_THRESHOLD: f64 = 70.0;

/// Sorted, de-duplicated port names present in the table.
pub fn port_names(table: &[PortTimeSeriesRow]) -> Vec<String> {
    table
        .iter()
        .map(|r| r.port_name.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// The rows of a single port, ascending by `tbin`.
pub struct PortView<'a> {
    port: String,
    rows: Vec<&'a PortTimeSeriesRow>,
}

impl<'a> PortView<'a> {
    pub fn new(table: &'a [PortTimeSeriesRow], port: &str) -> Self {
        let mut rows: Vec<_> = table.iter().filter(|r| r.port_name == port).collect();
        rows.sort_by_key(|r| r.tbin);
        Self {
            port: port.to_string(),
            rows,
        }
    }

    pub fn rows(&self) -> &[&'a PortTimeSeriesRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn latest(&self) -> Option<&'a PortTimeSeriesRow> {
        self.rows.last().copied()
    }

    /// The last `n` rows, oldest first.
    pub fn tail(&self, n: usize) -> &[&'a PortTimeSeriesRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    /// Risk score (0–100) for every row of the port.
    pub fn scores(&self, classifier: &dyn Classifier) -> Vec<f64> {
        let features: Vec<_> = self.rows.iter().map(|r| feature_vector(r)).collect();
        classifier
            .predict_proba(&features)
            .into_iter()
            .map(risk_score)
            .collect()
    }

    /// Summarizes the latest bin. `classifier` is optional so a missing model
    /// still yields the raw features.
    pub fn status(&self, classifier: Option<&dyn Classifier>, threshold: f64) -> PortStatus {
        let Some(latest) = self.latest() else {
            return PortStatus::Empty {
                port: self.port.clone(),
            };
        };

        let risk_score = classifier.and_then(|c| self.scores(c).last().copied());

        PortStatus::Ready(PortSnapshot {
            port: self.port.clone(),
            tbin: latest.tbin,
            vessels: latest.vessels,
            anchored_ratio: latest.anchored_ratio,
            risk_score,
            alert: risk_score.map(|s| s >= threshold),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortSnapshot {
    pub port: String,
    pub tbin: DateTime<Utc>,
    pub vessels: usize,
    pub anchored_ratio: f64,
    pub risk_score: Option<f64>,
    pub alert: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PortStatus {
    Empty { port: String },
    Ready(PortSnapshot),
}
