//! Display-ready summaries of analysis results.
//!
//! Reports hold labelled strings only. Turning them into HTML, CSV or a
//! spreadsheet is up to the caller.

use complaint_map_analytics_models::{
    AnalysisReport, AnalysisResult, BufferResult, ClassificationResult, DensityResult,
    DistancePair, DistanceResult, NearbyResult, ReportRow, ReportSection,
};
use complaint_map_geography_models::GeoPoint;

/// Builds a report for any analysis result. Identical results always give
/// identical reports.
#[must_use]
pub fn build_report(result: &AnalysisResult) -> AnalysisReport {
    let (title, summary, sections) = match result {
        AnalysisResult::Classification(r) => (
            "Region Analysis",
            classification_summary(r),
            classification_sections(r),
        ),
        AnalysisResult::Buffer(r) => ("Buffer Analysis", buffer_summary(r), buffer_sections(r)),
        AnalysisResult::Density(r) => ("Hotspot Analysis", density_summary(r), density_sections(r)),
        AnalysisResult::Distance(r) => (
            "Distance Analysis",
            distance_summary(r),
            distance_sections(r),
        ),
        AnalysisResult::Nearby(r) => ("Nearby Complaints", nearby_summary(r), nearby_sections(r)),
    };

    AnalysisReport {
        title: title.to_string(),
        summary,
        sections,
        timestamp: result.timestamp(),
    }
}

fn row(label: impl Into<String>, value: impl Into<String>) -> ReportRow {
    ReportRow {
        label: label.into(),
        value: value.into(),
    }
}

fn section(title: &str, rows: Vec<ReportRow>) -> ReportSection {
    ReportSection {
        title: title.to_string(),
        rows,
    }
}

fn format_point(point: &GeoPoint) -> String {
    format!("({:.5}, {:.5})", point.longitude, point.latitude)
}

fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.2} km", meters / 1000.0)
    } else {
        format!("{meters:.0} m")
    }
}

fn excluded_line(points_excluded: usize) -> Option<String> {
    (points_excluded > 0)
        .then(|| format!("{points_excluded} points with invalid coordinates were excluded"))
}

fn classification_summary(r: &ClassificationResult) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} of {} complaints inside the {} ({:.1}%)",
            r.total_in_region,
            r.total_considered,
            r.region.shape_name(),
            r.percent_of_total
        ),
        format!("Area {:.3} km², {:.2} complaints per km²", r.area_km2, r.density_per_km2),
    ];
    lines.extend(excluded_line(r.points_excluded));
    lines
}

fn classification_sections(r: &ClassificationResult) -> Vec<ReportSection> {
    let status = r
        .by_status
        .iter()
        .map(|(status, count)| row(status.label(), count.to_string()))
        .collect();
    let category = r
        .by_category
        .iter()
        .map(|c| row(c.category.as_str(), c.count.to_string()))
        .collect();
    let priority = r
        .by_priority
        .iter()
        .map(|(priority, count)| row(format!("Priority {priority}"), count.to_string()))
        .collect();
    let age = vec![
        row("Last 24 hours", r.by_age.last_24h.to_string()),
        row("Last 7 days", r.by_age.last_7d.to_string()),
        row("Last 30 days", r.by_age.last_30d.to_string()),
        row("Older", r.by_age.older.to_string()),
    ];

    vec![
        section("Status", status),
        section("Category", category),
        section("Priority", priority),
        section("Age", age),
    ]
}

fn buffer_summary(r: &BufferResult) -> Vec<String> {
    let around = r
        .origin
        .as_ref()
        .map_or_else(|| "the drawn shape".to_string(), format_point);
    let mut lines = vec![format!(
        "{} {} buffer around {around}",
        format_distance(r.effective_distance_m),
        r.mode.as_ref()
    )];
    lines.extend(classification_summary(&r.stats));
    lines
}

fn buffer_sections(r: &BufferResult) -> Vec<ReportSection> {
    let mut sections = vec![section(
        "Buffer",
        vec![
            row("Requested distance", format_distance(r.buffer_distance_m)),
            row("Effective distance", format_distance(r.effective_distance_m)),
            row("Mode", r.mode.as_ref()),
        ],
    )];
    sections.extend(classification_sections(&r.stats));
    sections
}

fn density_summary(r: &DensityResult) -> Vec<String> {
    let mut lines = vec![format!(
        "{} hotspots among {} complaints",
        r.hotspots.len(),
        r.total_points_considered
    )];
    if let Some(top) = r.hotspots.first() {
        lines.push(format!(
            "Densest area at {} with {} complaints within {}",
            format_point(&top.center),
            top.count,
            format_distance(r.search_radius_m)
        ));
    }
    lines.extend(excluded_line(r.points_excluded));
    lines
}

fn density_sections(r: &DensityResult) -> Vec<ReportSection> {
    let hotspots = r
        .top_hotspots()
        .iter()
        .map(|h| {
            let mut value = format!("{} complaints ({:.1}%)", h.count, h.intensity * 100.0);
            if let Some(distance) = h.distance_from_reference_m {
                value.push_str(&format!(", {} away", format_distance(distance)));
            }
            row(format!("#{} {}", h.rank, format_point(&h.center)), value)
        })
        .collect();

    vec![
        section("Hotspots", hotspots),
        section(
            "Grid",
            vec![
                row("Cell size", format!("{:.2} km", r.cell_size_km)),
                row("Search radius", format_distance(r.search_radius_m)),
                row("Nodes", format!("{} x {}", r.grid_columns, r.grid_rows)),
                row("Occupied nodes", r.nonzero_cells.to_string()),
                row("Max density", r.max_density.to_string()),
                row("Average density", format!("{:.2}", r.average_density)),
            ],
        ),
    ]
}

fn distance_summary(r: &DistanceResult) -> Vec<String> {
    let mut lines = vec![format!(
        "Average {}, shortest {}, longest {}",
        format_distance(r.average_m),
        format_distance(r.min_m),
        format_distance(r.max_m)
    )];
    if r.sampled {
        lines.push(format!(
            "Sampled {} of {} complaints (every {})",
            r.sampled_count, r.original_count, r.sample_step
        ));
    }
    lines.extend(excluded_line(r.points_excluded));
    lines
}

fn pair_row(pair: &DistancePair) -> ReportRow {
    row(format!("{} to {}", pair.from_id, pair.to_id), format_distance(pair.distance_m))
}

fn distance_sections(r: &DistanceResult) -> Vec<ReportSection> {
    vec![
        section("Longest Pairs", r.top_pairs.iter().map(pair_row).collect()),
        section(
            "Sample",
            vec![
                row("Complaints", r.original_count.to_string()),
                row("Paired", r.sampled_count.to_string()),
                row("Pairs", r.pair_count.to_string()),
            ],
        ),
    ]
}

fn nearby_summary(r: &NearbyResult) -> Vec<String> {
    let mut lines = vec![format!(
        "{} complaints within {} of {}",
        r.total_nearby,
        format_distance(r.radius_m),
        format_point(&r.reference)
    )];
    lines.extend(excluded_line(r.points_excluded));
    lines
}

fn nearby_sections(r: &NearbyResult) -> Vec<ReportSection> {
    vec![section(
        "Nearest",
        r.displayed()
            .iter()
            .map(|c| row(c.id.as_str(), format_distance(c.distance_m)))
            .collect(),
    )]
}
