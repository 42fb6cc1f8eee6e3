//! Adaptive density grid and hotspot ranking.
//!
//! A regular grid of nodes is laid over the analysis bounds. Each node
//! counts the points within a search radius slightly larger than the cell
//! spacing, so neighbouring nodes overlap and a cluster straddling a cell
//! edge is not split. Nodes whose count reaches a fraction of the densest
//! node become hotspots.

use std::cmp::Ordering;

use chrono::Utc;
use complaint_map_analytics_models::{DensityResult, Hotspot, HotspotConfig, HotspotParams};
use complaint_map_complaint_models::ComplaintPoint;
use complaint_map_geography::{distance::haversine_distance, validate_coordinate, validate_extent};
use complaint_map_geography_models::{BoundingBox, GeoPoint};
use complaint_map_spatial::PointIndex;

use crate::{AnalyticsError, prepare_region, screening::screen};

/// Layout of the node grid over the analysis bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Node spacing in km.
    pub cell_size_km: f64,
    /// Node columns.
    pub columns: usize,
    /// Node rows.
    pub rows: usize,
    /// Longitude of the first node column.
    pub origin_lng: f64,
    /// Latitude of the first node row.
    pub origin_lat: f64,
    /// Longitude step between columns.
    pub step_lng: f64,
    /// Latitude step between rows.
    pub step_lat: f64,
}

/// A grid node with the number of points within its search radius. Lives
/// for one detection run.
#[derive(Debug, Clone, Copy)]
struct GridCell {
    center: GeoPoint,
    count: usize,
    search_radius_meters: f64,
}

impl GridLayout {
    /// Total number of nodes.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.columns * self.rows
    }

    /// Node positions in scan order: row by row from the south-west.
    #[allow(clippy::cast_precision_loss)]
    pub fn nodes(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns).map(move |column| {
                GeoPoint::new(
                    (column as f64).mul_add(self.step_lng, self.origin_lng),
                    (row as f64).mul_add(self.step_lat, self.origin_lat),
                )
            })
        })
    }
}

/// Width and height of the bounds in km, measured along the southern and
/// western edges.
#[must_use]
pub fn extent_km(bounds: &BoundingBox) -> (f64, f64) {
    let south_west = bounds.south_west();
    let south_east = GeoPoint::new(bounds.max_lng, bounds.min_lat);
    let north_west = GeoPoint::new(bounds.min_lng, bounds.max_lat);
    (
        haversine_distance(&south_west, &south_east) / 1000.0,
        haversine_distance(&south_west, &north_west) / 1000.0,
    )
}

/// Cell size in km for an extent and point count, before the node cap.
///
/// Larger extents get coarser cells. Many points coarsen the grid further
/// and few points refine it.
#[must_use]
pub fn base_cell_size_km(width_km: f64, height_km: f64, point_count: usize) -> f64 {
    let area = width_km * height_km;
    let size = if area > 1000.0 {
        2.0
    } else if area > 100.0 {
        1.0
    } else if area < 10.0 {
        0.2
    } else {
        0.5
    };

    if point_count > 500 {
        size * 1.5
    } else if point_count < 20 {
        size * 0.5
    } else {
        size
    }
}

/// Lays out the node grid, coarsening the cell size until the node count
/// fits `max_grid_nodes`. The bounds must pass
/// [`complaint_map_geography::validate_extent`].
#[must_use]
pub fn layout_grid(
    bounds: &BoundingBox,
    point_count: usize,
    max_grid_nodes: usize,
) -> GridLayout {
    let (width_km, height_km) = extent_km(bounds);
    let max_nodes = max_grid_nodes.max(1);
    let mut cell_size_km = base_cell_size_km(width_km, height_km, point_count);

    loop {
        let layout = fit_grid(bounds, width_km, height_km, cell_size_km);
        let nodes = layout.node_count();
        if nodes <= max_nodes {
            return layout;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = nodes as f64 / max_nodes as f64;
        cell_size_km *= ratio.sqrt().max(1.01);
        log::debug!(
            "Grid of {nodes} nodes exceeds {max_nodes}, growing cell to {cell_size_km:.3} km"
        );
    }
}

/// Centres `floor(extent / cell) + 1` nodes per axis inside the bounds.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn fit_grid(
    bounds: &BoundingBox,
    width_km: f64,
    height_km: f64,
    cell_size_km: f64,
) -> GridLayout {
    let span_lng = bounds.max_lng - bounds.min_lng;
    let span_lat = bounds.max_lat - bounds.min_lat;
    let step_lng = if width_km > 0.0 {
        span_lng * cell_size_km / width_km
    } else {
        span_lng
    };
    let step_lat = if height_km > 0.0 {
        span_lat * cell_size_km / height_km
    } else {
        span_lat
    };

    let column_gaps = (width_km / cell_size_km).floor() as usize;
    let row_gaps = (height_km / cell_size_km).floor() as usize;

    GridLayout {
        cell_size_km,
        columns: column_gaps + 1,
        rows: row_gaps + 1,
        origin_lng: (column_gaps as f64).mul_add(-step_lng, span_lng) / 2.0 + bounds.min_lng,
        origin_lat: (row_gaps as f64).mul_add(-step_lat, span_lat) / 2.0 + bounds.min_lat,
        step_lng,
        step_lat,
    }
}

/// Ranks grid nodes by how many points are within their search radius.
///
/// The grid covers the region's bounds, or the viewport when no region
/// is given. Every valid point is counted, including points outside the
/// bounds but within reach of an edge node. The full ranked candidate list
/// is returned; [`DensityResult::top_hotspots`] gives the display slice.
///
/// # Errors
///
/// Returns [`AnalyticsError::InsufficientInput`] with neither region nor
/// viewport, [`AnalyticsError::InvalidRegion`] for an invalid region,
/// [`AnalyticsError::Geometry`] for an invalid viewport or reference or for
/// bounds that cross the antimeridian or reach a pole, and
/// [`AnalyticsError::InsufficientData`] with fewer than
/// `config.min_points` valid points.
pub fn detect_hotspots(
    points: &[ComplaintPoint],
    params: &HotspotParams,
    config: &HotspotConfig,
) -> Result<DensityResult, AnalyticsError> {
    let bounds = match (&params.region, &params.viewport) {
        (Some(region), _) => prepare_region(region)?.bounds(),
        (None, Some(viewport)) => *viewport,
        (None, None) => {
            return Err(AnalyticsError::InsufficientInput {
                message: "hotspot detection needs a region or a viewport".to_string(),
            });
        }
    };
    validate_extent(&bounds)?;
    if let Some(reference) = &params.reference {
        validate_coordinate(reference)?;
    }

    let screened = screen(points, "hotspot detection");
    let total = screened.valid.len();
    if total < config.min_points {
        return Err(AnalyticsError::InsufficientData {
            analysis: "hotspot detection",
            required: config.min_points,
            actual: total,
        });
    }
    let locations: Vec<GeoPoint> = screened.valid.iter().map(|p| p.location()).collect();

    let layout = layout_grid(&bounds, total, config.max_grid_nodes);
    let search_radius_m = layout.cell_size_km * config.search_radius_factor * 1000.0;
    let used_spatial_index = total > config.index_threshold;
    log::debug!(
        "Hotspot grid: {}x{} nodes, cell {:.3} km, radius {search_radius_m:.0} m, index: {}",
        layout.columns,
        layout.rows,
        layout.cell_size_km,
        used_spatial_index
    );

    let index = used_spatial_index.then(|| PointIndex::build(&locations));
    let occupied: Vec<GridCell> = layout
        .nodes()
        .map(|center| {
            let count = index.as_ref().map_or_else(
                || {
                    locations
                        .iter()
                        .filter(|p| haversine_distance(&center, p) <= search_radius_m)
                        .count()
                },
                |index| index.count_within(&center, search_radius_m),
            );
            GridCell {
                center,
                count,
                search_radius_meters: search_radius_m,
            }
        })
        .filter(|cell| cell.count > 0)
        .collect();

    let max_density = occupied.iter().map(|cell| cell.count).max().unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let average_density = if occupied.is_empty() {
        0.0
    } else {
        occupied.iter().map(|cell| cell.count).sum::<usize>() as f64 / occupied.len() as f64
    };

    let hotspots = rank_hotspots(&occupied, max_density, total, params.reference, config);

    log::info!(
        "Hotspot detection over {total} points: {} of {} nodes occupied, \
         max {max_density}, {} hotspots",
        occupied.len(),
        layout.node_count(),
        hotspots.len()
    );

    Ok(DensityResult {
        timestamp: Utc::now(),
        region: params.region.clone(),
        bounds,
        total_points_considered: total,
        points_excluded: screened.excluded,
        max_density,
        average_density,
        cell_size_km: layout.cell_size_km,
        search_radius_m,
        grid_columns: layout.columns,
        grid_rows: layout.rows,
        nonzero_cells: occupied.len(),
        threshold_fraction: config.threshold_fraction,
        max_hotspots: config.max_hotspots,
        hotspots,
        reference: params.reference,
        used_spatial_index,
    })
}

/// Keeps nodes at or above the threshold and orders them by descending
/// count, then distance to the reference. The sort is stable, so scan
/// order settles any remaining tie.
#[allow(clippy::cast_precision_loss)]
fn rank_hotspots(
    occupied: &[GridCell],
    max_density: usize,
    total: usize,
    reference: Option<GeoPoint>,
    config: &HotspotConfig,
) -> Vec<Hotspot> {
    let threshold = config.threshold_fraction * max_density as f64;

    let mut candidates: Vec<(&GridCell, Option<f64>)> = occupied
        .iter()
        .filter(|cell| cell.count as f64 >= threshold)
        .map(|cell| (cell, reference.map(|r| haversine_distance(&r, &cell.center))))
        .collect();

    candidates.sort_by(|(a, da), (b, db)| {
        b.count.cmp(&a.count).then_with(|| match (da, db) {
            (Some(da), Some(db)) => da.total_cmp(db),
            _ => Ordering::Equal,
        })
    });

    candidates
        .into_iter()
        .enumerate()
        .map(|(i, (cell, distance))| {
            log::trace!(
                "Hotspot #{} at ({}, {}): {} points within {:.0} m",
                i + 1,
                cell.center.longitude,
                cell.center.latitude,
                cell.count,
                cell.search_radius_meters
            );
            Hotspot {
                rank: i + 1,
                center: cell.center,
                count: cell.count,
                intensity: cell.count as f64 / total as f64,
                distance_from_reference_m: distance,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use complaint_map_geography::{GeometryError, distance::destination};
    use complaint_map_geography_models::Region;

    use super::*;
    use crate::fixtures::{point, uniform_points};

    /// ~10km x 10km box near Islamabad.
    fn ten_km_box() -> BoundingBox {
        let south_west = GeoPoint::new(73.0, 33.6);
        let east = destination(&south_west, 90.0, 10_000.0);
        let north = destination(&south_west, 0.0, 10_000.0);
        BoundingBox::from_corners(south_west, GeoPoint::new(east.longitude, north.latitude))
    }

    fn viewport(bounds: BoundingBox) -> HotspotParams {
        HotspotParams {
            viewport: Some(bounds),
            ..HotspotParams::default()
        }
    }

    #[test]
    fn uniform_thousand_points() {
        let bounds = ten_km_box();
        let points = uniform_points(1_000, &bounds, 2024);
        let result =
            detect_hotspots(&points, &viewport(bounds), &HotspotConfig::default()).unwrap();

        assert_eq!(result.total_points_considered, 1_000);
        assert!(!result.hotspots.is_empty());
        assert!(!result.used_spatial_index);
        let top = result.hotspots[0].count;
        for hotspot in &result.hotspots {
            assert!(result.max_density as f64 >= result.average_density);
            assert!(top >= hotspot.count);
            assert!(hotspot.count as f64 >= 0.6 * result.max_density as f64);
            assert!((hotspot.intensity - hotspot.count as f64 / 1_000.0).abs() < 1e-12);
        }
        assert_eq!(top, result.max_density);
        let ranks: Vec<usize> = result.hotspots.iter().map(|h| h.rank).collect();
        assert_eq!(ranks, (1..=result.hotspots.len()).collect::<Vec<_>>());
        assert!(result.top_hotspots().len() <= 10);
    }

    #[test]
    fn detection_is_deterministic() {
        let bounds = ten_km_box();
        let points = uniform_points(300, &bounds, 99);
        let params = HotspotParams {
            reference: Some(bounds.center()),
            ..viewport(bounds)
        };
        let first = detect_hotspots(&points, &params, &HotspotConfig::default()).unwrap();
        let second = detect_hotspots(&points, &params, &HotspotConfig::default()).unwrap();
        assert_eq!(first.hotspots, second.hotspots);
        assert!((first.cell_size_km - second.cell_size_km).abs() < f64::EPSILON);
    }

    #[test]
    fn index_and_linear_scan_agree() {
        let bounds = ten_km_box();
        let points = uniform_points(800, &bounds, 5);
        let linear =
            detect_hotspots(&points, &viewport(bounds), &HotspotConfig::default()).unwrap();
        let indexed_config = HotspotConfig {
            index_threshold: 0,
            ..HotspotConfig::default()
        };
        let indexed = detect_hotspots(&points, &viewport(bounds), &indexed_config).unwrap();
        assert!(!linear.used_spatial_index);
        assert!(indexed.used_spatial_index);
        assert_eq!(linear.hotspots, indexed.hotspots);
        assert_eq!(linear.nonzero_cells, indexed.nonzero_cells);
    }

    #[test]
    fn cluster_is_ranked_first() {
        let bounds = ten_km_box();
        let mut points = uniform_points(100, &bounds, 3);
        let cluster_center = destination(&bounds.south_west(), 45.0, 4_000.0);
        for i in 0..60 {
            let p = destination(&cluster_center, f64::from(i) * 6.0, 50.0);
            points.push(point(&format!("cluster{i}"), p.longitude, p.latitude));
        }
        let result =
            detect_hotspots(&points, &viewport(bounds), &HotspotConfig::default()).unwrap();
        let top = &result.hotspots[0];
        assert!(haversine_distance(&top.center, &cluster_center) <= result.search_radius_m + 50.0);
    }

    #[test]
    fn reference_breaks_ties() {
        // Two identical clusters; the one nearer the reference ranks first.
        let bounds = ten_km_box();
        let west = destination(&bounds.south_west(), 45.0, 3_000.0);
        let east = destination(&west, 90.0, 5_000.0);
        let mut points = Vec::new();
        for (name, center) in [("w", west), ("e", east)] {
            for i in 0..5 {
                let p = destination(&center, f64::from(i) * 72.0, 10.0);
                points.push(point(&format!("{name}{i}"), p.longitude, p.latitude));
            }
        }

        let near_east = HotspotParams {
            reference: Some(destination(&east, 90.0, 1_000.0)),
            ..viewport(bounds)
        };
        let result = detect_hotspots(&points, &near_east, &HotspotConfig::default()).unwrap();
        let first = &result.hotspots[0];
        assert!(
            haversine_distance(&first.center, &east) < haversine_distance(&first.center, &west)
        );
        let distances: Vec<f64> = result
            .hotspots
            .iter()
            .filter(|h| h.count == first.count)
            .map(|h| h.distance_from_reference_m.unwrap())
            .collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn equal_counts_rank_in_scan_order_without_reference() {
        let bounds = ten_km_box();
        let south_west = destination(&bounds.south_west(), 45.0, 3_000.0);
        let north_east = destination(&south_west, 60.0, 5_000.0);
        let mut points = Vec::new();
        for (name, center) in [("ne", north_east), ("sw", south_west)] {
            for i in 0..5 {
                points.push(point(&format!("{name}{i}"), center.longitude, center.latitude));
            }
        }

        let result =
            detect_hotspots(&points, &viewport(bounds), &HotspotConfig::default()).unwrap();
        assert!(result.hotspots.len() >= 2);
        assert!(result.hotspots.iter().all(|h| h.count == 5));
        assert!(result.hotspots.iter().all(|h| h.distance_from_reference_m.is_none()));

        // Row by row from the south, west to east within a row.
        for pair in result.hotspots.windows(2) {
            let (a, b) = (&pair[0].center, &pair[1].center);
            let same_row = (a.latitude - b.latitude).abs() < 1e-12;
            assert!(
                a.latitude < b.latitude || (same_row && a.longitude < b.longitude),
                "{a:?} ranked before {b:?}"
            );
        }
        let first = &result.hotspots[0].center;
        assert!(haversine_distance(first, &south_west) < haversine_distance(first, &north_east));
    }

    #[test]
    fn bounds_across_antimeridian_are_rejected() {
        let center = GeoPoint::new(179.98, -17.0);
        let points: Vec<ComplaintPoint> = (0..20)
            .map(|i| {
                let p = destination(&center, f64::from(i) * 18.0, 80.0);
                point(&format!("p{i}"), p.longitude, p.latitude)
            })
            .collect();
        let params = HotspotParams {
            region: Some(Region::Circle {
                center,
                radius_meters: 5_000.0,
            }),
            ..HotspotParams::default()
        };
        assert!(matches!(
            detect_hotspots(&points, &params, &HotspotConfig::default()),
            Err(AnalyticsError::Geometry(GeometryError::InvalidBounds { .. }))
        ));

        let whole_world =
            BoundingBox::from_corners(GeoPoint::new(-180.0, -60.0), GeoPoint::new(180.0, 60.0));
        assert!(matches!(
            detect_hotspots(&points, &viewport(whole_world), &HotspotConfig::default()),
            Err(AnalyticsError::Geometry(GeometryError::InvalidBounds { .. }))
        ));
    }

    #[test]
    fn region_bounds_take_precedence() {
        let bounds = ten_km_box();
        let points = uniform_points(50, &bounds, 1);
        let params = HotspotParams {
            region: Some(Region::Circle {
                center: bounds.center(),
                radius_meters: 1_000.0,
            }),
            viewport: Some(bounds),
            reference: None,
        };
        let result = detect_hotspots(&points, &params, &HotspotConfig::default()).unwrap();
        assert!(result.bounds.max_lng - result.bounds.min_lng < bounds.max_lng - bounds.min_lng);
        assert!(result.region.is_some());
    }

    #[test]
    fn requires_bounds_and_points() {
        let bounds = ten_km_box();
        let points = uniform_points(10, &bounds, 1);
        assert!(matches!(
            detect_hotspots(&points, &HotspotParams::default(), &HotspotConfig::default()),
            Err(AnalyticsError::InsufficientInput { .. })
        ));

        let few = vec![
            point("a", 73.01, 33.61),
            point("b", 999.0, 33.61),
            point("c", 73.02, 33.62),
        ];
        match detect_hotspots(&few, &viewport(bounds), &HotspotConfig::default()) {
            Err(AnalyticsError::InsufficientData { required, actual, .. }) => {
                assert_eq!(required, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected {other:?}"),
        }

        let bad_region = HotspotParams {
            region: Some(Region::MultiPolygon { rings: vec![] }),
            ..HotspotParams::default()
        };
        assert!(matches!(
            detect_hotspots(&points, &bad_region, &HotspotConfig::default()),
            Err(AnalyticsError::InvalidRegion { .. })
        ));
    }

    #[test]
    fn cell_size_follows_extent_and_count() {
        assert!((base_cell_size_km(50.0, 50.0, 100) - 2.0).abs() < f64::EPSILON);
        assert!((base_cell_size_km(20.0, 20.0, 100) - 1.0).abs() < f64::EPSILON);
        assert!((base_cell_size_km(5.0, 5.0, 100) - 0.5).abs() < f64::EPSILON);
        assert!((base_cell_size_km(2.0, 2.0, 100) - 0.2).abs() < f64::EPSILON);
        assert!((base_cell_size_km(5.0, 5.0, 1_000) - 0.75).abs() < f64::EPSILON);
        assert!((base_cell_size_km(5.0, 5.0, 10) - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn grid_respects_node_cap() {
        let bounds =
            BoundingBox::from_corners(GeoPoint::new(60.0, 20.0), GeoPoint::new(80.0, 40.0));
        let layout = layout_grid(&bounds, 100, 1_000);
        assert!(layout.node_count() <= 1_000);
        assert!(layout.cell_size_km > 2.0);

        let nodes: Vec<GeoPoint> = layout.nodes().collect();
        assert_eq!(nodes.len(), layout.node_count());
        assert!(nodes.iter().all(|n| bounds.contains(n)));
        // Scan order: first row runs west to east from the south-west.
        assert!(nodes[1].longitude > nodes[0].longitude);
        assert!((nodes[1].latitude - nodes[0].latitude).abs() < f64::EPSILON);
    }
}
