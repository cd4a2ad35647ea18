//! Per-port time-bin aggregation of AIS points.
//!
//! Points inside a port's radius are bucketed by floored bin start and reduced
//! to vessel counts, speed statistics and the anchored ratio.

use crate::features::types::{AisPoint, BinStats, BinWidth, PortDefinition};
use crate::features::utility::{mean, quantile, ratio};
use crate::spatial::within_radius;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};

/// Reports at or below this speed (knots) count as anchored.
pub const ANCHORED_SOG_KNOTS: f64 = 0.5;

/// Quantile used for the low-speed feature (`p10_sog`).
pub const LOW_SPEED_QUANTILE: f64 = 0.10;

/// Aggregates the AIS points inside one port's radius into per-bin statistics.
///
/// Returns one [`BinStats`] per non-empty bin, ascending by bin start. A port
/// with no in-radius points yields an empty vector.
pub fn aggregate(points: &[AisPoint], port: &PortDefinition, width: BinWidth) -> Vec<BinStats> {
    let mut bins: BTreeMap<DateTime<Utc>, Vec<&AisPoint>> = BTreeMap::new();

    for p in points {
        if !within_radius(p.lat, p.lon, port.lat, port.lon, port.radius_km) {
            continue;
        }
        bins.entry(width.floor(p.timestamp)).or_default().push(p);
    }

    bins.into_iter()
        .map(|(tbin, group)| bin_stats(tbin, &group))
        .collect()
}

fn bin_stats(tbin: DateTime<Utc>, group: &[&AisPoint]) -> BinStats {
    let vessels = group
        .iter()
        .map(|p| p.vessel_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    let speeds: Vec<f64> = group.iter().map(|p| p.speed_over_ground).collect();
    let anchored = speeds.iter().filter(|&&s| s <= ANCHORED_SOG_KNOTS).count();

    BinStats {
        tbin,
        vessels,
        points: group.len(),
        mean_sog: mean(&speeds),
        p10_sog: quantile(&speeds, LOW_SPEED_QUANTILE),
        anchored_ratio: ratio(anchored, group.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_bin_scenario() {
        let port = create_port("A", 10.0, 20.0, 5.0);
        let points = vec![
            create_point("V1", "2024-01-01T10:00:00Z", 10.0, 20.0, 0.2),
            create_point("V1", "2024-01-01T10:05:00Z", 10.0, 20.0, 0.3),
            create_point("V2", "2024-01-01T10:10:00Z", 10.0, 20.0, 10.0),
        ];

        let bins = aggregate(&points, &port, BinWidth::default());

        assert_eq!(bins.len(), 1);
        let b = &bins[0];
        assert_eq!(b.tbin, ts("2024-01-01T10:00:00Z"));
        assert_eq!(b.vessels, 2);
        assert_eq!(b.points, 3);
        assert!((b.anchored_ratio - 2.0 / 3.0).abs() < 1e-12);
        assert!((b.mean_sog - 3.5).abs() < 1e-12);
        assert!((b.p10_sog - 0.22).abs() < 1e-12);
    }

    #[test]
    fn test_no_points_in_radius_yields_no_bins() {
        let port = create_port("A", 10.0, 20.0, 5.0);
        let points = vec![create_point("V1", "2024-01-01T10:00:00Z", 10.45, 20.0, 0.1)];

        assert!(aggregate(&points, &port, BinWidth::default()).is_empty());
    }

    #[test]
    fn test_single_point_bin() {
        let port = create_port("A", 10.0, 20.0, 5.0);
        let points = vec![create_point("V1", "2024-01-01T10:00:00Z", 10.0, 20.0, 7.5)];

        let bins = aggregate(&points, &port, BinWidth::default());

        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].p10_sog, 7.5);
        assert_eq!(bins[0].mean_sog, 7.5);
        assert_eq!(bins[0].anchored_ratio, 0.0);
    }

    #[test]
    fn test_anchored_threshold_inclusive() {
        let port = create_port("A", 10.0, 20.0, 5.0);
        let points = vec![create_point("V1", "2024-01-01T10:00:00Z", 10.0, 20.0, 0.5)];

        let bins = aggregate(&points, &port, BinWidth::default());

        assert_eq!(bins[0].anchored_ratio, 1.0);
    }

    #[test]
    fn test_bins_sorted_and_gaps_not_filled() {
        let port = create_port("A", 10.0, 20.0, 5.0);
        let points = vec![
            create_point("V1", "2024-01-01T12:10:00Z", 10.0, 20.0, 1.0),
            create_point("V2", "2024-01-01T10:40:00Z", 10.0, 20.0, 1.0),
            create_point("V3", "2024-01-01T10:05:00Z", 10.0, 20.0, 1.0),
        ];

        let bins = aggregate(&points, &port, BinWidth::default());

        let starts: Vec<_> = bins.iter().map(|b| b.tbin).collect();
        assert_eq!(
            starts,
            vec![
                ts("2024-01-01T10:00:00Z"),
                ts("2024-01-01T10:30:00Z"),
                ts("2024-01-01T12:00:00Z"),
            ]
        );
    }

    #[test]
    fn test_arrival_order_does_not_change_result() {
        let port = create_port("A", 10.0, 20.0, 5.0);
        let mut points = vec![
            create_point("V1", "2024-01-01T10:01:00Z", 10.0, 20.0, 0.1),
            create_point("V2", "2024-01-01T10:29:00Z", 10.01, 20.0, 3.0),
            create_point("V3", "2024-01-01T10:31:00Z", 10.0, 20.01, 6.0),
        ];

        let forward = aggregate(&points, &port, BinWidth::default());
        points.reverse();
        let backward = aggregate(&points, &port, BinWidth::default());

        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 2);
    }

    #[test]
    fn test_count_invariant_and_ratio_bounds() {
        let port = create_port("A", 10.0, 20.0, 5.0);
        let points: Vec<_> = (0..40)
            .map(|i| {
                create_point(
                    &format!("V{}", i % 7),
                    &format!("2024-01-01T{:02}:{:02}:00Z", 8 + i / 12, (i * 5) % 60),
                    10.0,
                    20.0,
                    (i % 5) as f64 * 0.3,
                )
            })
            .collect();

        for b in aggregate(&points, &port, BinWidth::default()) {
            assert!(b.points >= b.vessels);
            assert!(b.vessels >= 1);
            assert!((0.0..=1.0).contains(&b.anchored_ratio));
        }
    }

    // Helper functions for tests
    fn create_port(name: &str, lat: f64, lon: f64, radius_km: f64) -> PortDefinition {
        PortDefinition {
            port_name: name.to_string(),
            lat,
            lon,
            radius_km,
        }
    }

    fn create_point(vessel: &str, t: &str, lat: f64, lon: f64, sog: f64) -> AisPoint {
        AisPoint {
            timestamp: ts(t),
            vessel_id: vessel.to_string(),
            lat,
            lon,
            speed_over_ground: sog,
        }
    }

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }
}
