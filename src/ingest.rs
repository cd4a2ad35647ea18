//! Loading and cleaning of AIS reports and port definitions.
//!
//! Raw AIS files are schema-checked, coerced, stripped of unusable rows and
//! sorted by `(timestamp, mmsi)`. The cleaned file is what the builder reads.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{StringRecord, WriterBuilder};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::features::types::{AisPoint, PortDefinition};
use crate::spatial::validate_coordinates;

/// Columns the raw AIS input must provide.
pub const REQUIRED_AIS_COLUMNS: [&str; 5] = ["timestamp", "mmsi", "lat", "lon", "sog"];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Row counts from a cleaning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_rows: usize,
}

/// Reads and cleans a raw AIS CSV file.
pub fn load_raw_ais(path: impl AsRef<Path>) -> Result<(Vec<AisPoint>, IngestReport)> {
    let file = File::open(path.as_ref())?;
    read_raw_ais(file)
}

/// Reads raw AIS CSV data, validating the header and dropping unusable rows.
///
/// # Errors
///
/// Returns [`Error::Schema`] listing every required column the header lacks.
pub fn read_raw_ais<R: Read>(reader: R) -> Result<(Vec<AisPoint>, IngestReport)> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut missing = Vec::new();
    let mut idx = [0usize; 5];
    for (slot, name) in idx.iter_mut().zip(REQUIRED_AIS_COLUMNS) {
        match headers.iter().position(|h| h.trim() == name) {
            Some(i) => *slot = i,
            None => missing.push(name.to_string()),
        }
    }
    if !missing.is_empty() {
        missing.sort();
        return Err(Error::Schema { missing });
    }

    let mut report = IngestReport::default();
    let mut points = Vec::new();

    for record in rdr.records() {
        let record = record?;
        report.total_rows += 1;
        match parse_record(&record, &idx) {
            Some(p) => points.push(p),
            None => {
                report.dropped_rows += 1;
                debug!(row = report.total_rows, "Dropping unusable AIS row");
            }
        }
    }

    points.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.vessel_id.cmp(&b.vessel_id))
    });
    report.kept_rows = points.len();

    if report.dropped_rows > 0 {
        warn!(
            dropped = report.dropped_rows,
            total = report.total_rows,
            "Dropped AIS rows with missing or invalid values"
        );
    }
    info!(kept = report.kept_rows, "AIS rows cleaned");

    Ok((points, report))
}

fn parse_record(record: &StringRecord, idx: &[usize; 5]) -> Option<AisPoint> {
    let field = |i: usize| record.get(idx[i]).map(str::trim).filter(|s| !s.is_empty());

    let timestamp = parse_timestamp(field(0)?)?;
    let vessel_id = field(1)?.to_string();
    let lat: f64 = field(2)?.parse().ok()?;
    let lon: f64 = field(3)?.parse().ok()?;
    let sog: f64 = field(4)?.parse().ok()?;

    validate_coordinates(lat, lon).ok()?;
    if !sog.is_finite() || sog < 0.0 {
        return None;
    }

    Some(AisPoint {
        timestamp,
        vessel_id,
        lat,
        lon,
        speed_over_ground: sog,
    })
}

/// Parses an RFC 3339 timestamp, or a naive one interpreted as UTC.
///
/// Naive values may omit seconds, or the time entirely (midnight).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = s.parse::<DateTime<Utc>>() {
        return Some(ts);
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Writes cleaned AIS points as `timestamp,mmsi,lat,lon,sog`.
pub fn write_ais(path: impl AsRef<Path>, points: &[AisPoint]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_path(path.as_ref())?;
    for p in points {
        writer.serialize(p)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a cleaned AIS CSV file written by [`write_ais`].
pub fn load_ais(path: impl AsRef<Path>) -> Result<Vec<AisPoint>> {
    let file = File::open(path.as_ref())?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut points = Vec::new();

    for result in rdr.deserialize() {
        let point: AisPoint = result?;
        points.push(point);
    }

    Ok(points)
}

/// Reads and validates a port definitions CSV file.
pub fn load_ports(path: impl AsRef<Path>) -> Result<Vec<PortDefinition>> {
    let file = File::open(path.as_ref())?;
    read_ports(file)
}

/// Reads port definitions, rejecting invalid centers, non-positive radii and
/// duplicate names.
pub fn read_ports<R: Read>(reader: R) -> Result<Vec<PortDefinition>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut seen = HashSet::new();
    let mut ports = Vec::new();

    for result in rdr.deserialize() {
        let port: PortDefinition = result?;

        validate_coordinates(port.lat, port.lon)?;
        if !port.radius_km.is_finite() || port.radius_km <= 0.0 {
            return Err(Error::InvalidRadius {
                port: port.port_name,
                radius_km: port.radius_km,
            });
        }
        if !seen.insert(port.port_name.clone()) {
            return Err(Error::DuplicatePort(port.port_name));
        }

        ports.push(port);
    }

    debug!(ports = ports.len(), "Port definitions loaded");
    Ok(ports)
}
