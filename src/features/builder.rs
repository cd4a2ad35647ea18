//! Builds the labeled port time-series table, sequentially or across a
//! bounded pool of blocking tasks.

use crate::error::{Error, Result};
use crate::features::aggregate::aggregate;
use crate::features::label::risk_labels;
use crate::features::types::{AisPoint, BinWidth, PortDefinition, PortTimeSeriesRow};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// Builds the labeled port time-series table.
///
/// Ports are aggregated independently and concatenated in definition order,
/// bins ascending within each port. Ports with no in-radius points are
/// skipped. Fails with [`Error::NoData`] when no port contributes a row.
#[tracing::instrument(skip_all, fields(points = points.len(), ports = ports.len()))]
pub fn build(
    points: &[AisPoint],
    ports: &[PortDefinition],
    width: BinWidth,
) -> Result<Vec<PortTimeSeriesRow>> {
    let mut table = Vec::new();

    for port in ports {
        table.extend(port_rows(points, port, width));
    }

    finish(table)
}

/// Same contract as [`build`], with per-port aggregation spread over at most
/// `concurrency` blocking workers.
///
/// Join handles are awaited in port order, so the table is identical to the
/// sequential one.
#[tracing::instrument(skip_all, fields(points = points.len(), ports = ports.len(), concurrency = concurrency))]
pub async fn build_concurrent(
    points: Arc<Vec<AisPoint>>,
    ports: &[PortDefinition],
    width: BinWidth,
    concurrency: usize,
) -> Result<Vec<PortTimeSeriesRow>> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = Vec::with_capacity(ports.len());

    for port in ports {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| Error::Worker(e.to_string()))?;
        let points = points.clone();
        let port = port.clone();

        tasks.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            port_rows(&points, &port, width)
        }));
    }

    let mut table = Vec::new();
    for task in tasks {
        let rows = task.await.map_err(|e| Error::Worker(e.to_string()))?;
        table.extend(rows);
    }

    finish(table)
}

/// Aggregates, labels, and stamps the rows for a single port.
fn port_rows(points: &[AisPoint], port: &PortDefinition, width: BinWidth) -> Vec<PortTimeSeriesRow> {
    let bins = aggregate(points, port, width);
    if bins.is_empty() {
        debug!(port = %port.port_name, "No AIS points within port radius, skipping");
        return Vec::new();
    }

    let labels = risk_labels(&bins);
    let at_risk = labels.iter().filter(|&&l| l == 1).count();
    debug!(
        port = %port.port_name,
        bins = bins.len(),
        at_risk,
        "Port aggregated"
    );

    bins.into_iter()
        .zip(labels)
        .map(|(stats, label)| PortTimeSeriesRow::from_stats(&port.port_name, stats, label))
        .collect()
}

fn finish(table: Vec<PortTimeSeriesRow>) -> Result<Vec<PortTimeSeriesRow>> {
    if table.is_empty() {
        return Err(Error::NoData);
    }
    info!(rows = table.len(), "Port time series built");
    Ok(table)
}
