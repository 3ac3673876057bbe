//! Single-pass aggregation of permits into [`PermitStats`].

use energy_map_analytics_models::{AttributionSummary, PermitStats};
use energy_map_source_models::Permit;
use energy_map_spatial::{
    AttributionDiagnostics, AttributionOptions, GeoContainment, RegionCatalog, assign_with,
};

/// Aggregates permits, attributing them to `catalog` regions when given.
///
/// Every permit counts toward the totals and its category buckets, located
/// or not. With a catalog, `by_region` holds one entry per catalog region
/// (zeroed when nothing falls inside it).
#[must_use]
pub fn aggregate(permits: &[Permit], catalog: Option<&RegionCatalog>) -> PermitStats {
    aggregate_with(permits, catalog, AttributionOptions::default())
}

/// [`aggregate`] with explicit attribution options.
#[must_use]
pub fn aggregate_with(
    permits: &[Permit],
    catalog: Option<&RegionCatalog>,
    options: AttributionOptions,
) -> PermitStats {
    let mut stats = tally(permits);

    if let Some(catalog) = catalog {
        let assignment = assign_with(permits, catalog, &GeoContainment, options);

        stats.by_region = Some(
            assignment
                .regions
                .iter()
                .map(|(name, assigned)| (name.clone(), tally(assigned.iter().copied())))
                .collect(),
        );
        stats.attribution = Some(summarize(
            assignment.assigned_count(),
            &assignment.diagnostics,
        ));
    }

    log::debug!(
        "Aggregated {} permits into {} category fields",
        stats.totals.count,
        stats.by_category.len()
    );

    stats
}

fn tally<'a>(permits: impl IntoIterator<Item = &'a Permit>) -> PermitStats {
    let mut stats = PermitStats::default();

    for permit in permits {
        stats.totals.record(&permit.metrics);

        for (field, value) in &permit.categories {
            stats
                .by_category
                .entry(*field)
                .or_default()
                .entry(value.clone())
                .or_default()
                .record(&permit.metrics);
        }
    }

    stats
}

const fn summarize(assigned: usize, diagnostics: &AttributionDiagnostics) -> AttributionSummary {
    AttributionSummary {
        assigned: assigned as u64,
        unassigned: diagnostics.unassigned as u64,
        unlocated: diagnostics.unlocated as u64,
        overlapping: diagnostics.overlapping as u64,
        geometry_errors: diagnostics.geometry_errors as u64,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use energy_map_analytics_models::Bucket;
    use energy_map_geography_models::RegionKind;
    use energy_map_source_models::{CategoryField, DatasetKind, Location, Metrics};

    use super::*;

    fn permit(tech: &str, capacity: f64, location: Option<(f64, f64)>) -> Permit {
        Permit {
            kind: DatasetKind::Electricity,
            permit_number: None,
            holder: None,
            location: location.and_then(|(lat, lng)| Location::new(lat, lng)),
            categories: BTreeMap::from([(CategoryField::Technology, tech.to_string())]),
            metrics: Metrics {
                capacity,
                output: capacity / 10.0,
            },
        }
    }

    fn catalog() -> RegionCatalog {
        let square = |name: &str, x0: f64, y0: f64, x1: f64, y1: f64| {
            format!(
                r#"{{"type":"Feature","properties":{{"name":"{name}"}},"geometry":{{"type":"Polygon","coordinates":[[[{x0},{y0}],[{x1},{y0}],[{x1},{y1}],[{x0},{y1}],[{x0},{y0}]]]}}}}"#
            )
        };
        let text = format!(
            r#"{{"type":"FeatureCollection","features":[{},{},{}]}}"#,
            square("Central", -100.0, 18.0, -97.0, 21.0),
            square("Norte", -108.0, 26.0, -102.0, 31.0),
            square("Peninsular", -92.0, 18.0, -86.0, 22.0),
        );
        RegionCatalog::from_geojson_str(RegionKind::ControlArea, &text, &["name".to_string()])
            .unwrap()
    }

    #[test]
    fn three_row_scenario() {
        let permits = vec![
            permit("Solar", 10.0, Some((19.5, -99.1))),
            permit("Eolica", 20.0, Some((19.4, -99.2))),
        ];
        let stats = aggregate(&permits, None);

        assert_eq!(stats.totals.count, 2);
        assert!((stats.totals.capacity - 30.0).abs() < f64::EPSILON);
        let tech = stats.category(CategoryField::Technology);
        assert_eq!(tech.len(), 2);
        assert!((tech["Solar"].capacity - 10.0).abs() < f64::EPSILON);
        assert!((tech["Eolica"].capacity - 20.0).abs() < f64::EPSILON);
        assert!(stats.by_region.is_none());
        assert!(stats.attribution.is_none());
    }

    #[test]
    fn is_idempotent() {
        let permits = vec![
            permit("Solar", 10.0, Some((19.5, -99.1))),
            permit("Ciclo Combinado", 500.0, Some((28.6, -106.1))),
        ];
        let catalog = catalog();
        assert_eq!(
            aggregate(&permits, Some(&catalog)),
            aggregate(&permits, Some(&catalog))
        );
    }

    #[test]
    fn category_buckets_sum_to_totals() {
        let permits = vec![
            permit("Solar", 10.0, Some((19.5, -99.1))),
            permit("Solar", 5.5, None),
            permit("Eolica", 20.0, Some((20.9, -89.6))),
            permit("Sin Tecnología", 0.0, Some((0.0, 0.0))),
        ];
        let stats = aggregate(&permits, Some(&catalog()));

        let tech = stats.category(CategoryField::Technology);
        let count: u64 = tech.values().map(|b| b.count).sum();
        let capacity: f64 = tech.values().map(|b| b.capacity).sum();
        assert_eq!(count, stats.totals.count);
        assert!((capacity - stats.totals.capacity).abs() < 1e-9);
    }

    #[test]
    fn regions_partition_located_permits() {
        let permits = vec![
            permit("Solar", 10.0, Some((19.5, -99.1))),
            permit("Solar", 5.0, None),
            permit("Eolica", 20.0, Some((20.9, -89.6))),
            permit("Eolica", 1.0, Some((0.0, 0.0))),
        ];
        let stats = aggregate(&permits, Some(&catalog()));

        let regions = stats.region_totals().unwrap();
        assert_eq!(regions.len(), 3);
        assert_eq!(regions["Central"].count, 1);
        assert_eq!(regions["Peninsular"].count, 1);
        assert_eq!(regions["Norte"], Bucket::default());

        let attribution = stats.attribution.unwrap();
        assert_eq!(attribution.assigned, 2);
        assert_eq!(attribution.unassigned, 1);
        assert_eq!(attribution.unlocated, 1);

        let matrix = stats.matrix(CategoryField::Technology).unwrap();
        assert_eq!(matrix["Central"]["Solar"].count, 1);
        assert!(matrix["Central"].get("Eolica").is_none());

        let central = &stats.by_region.as_ref().unwrap()["Central"];
        assert!(central.by_region.is_none());
    }

    #[test]
    fn non_numeric_metrics_contribute_zero() {
        let permits = vec![
            permit("Solar", f64::NAN, None),
            permit("Solar", 4.0, None),
        ];
        let stats = aggregate(&permits, None);
        assert_eq!(stats.totals.count, 2);
        assert!((stats.totals.capacity - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_input_yields_zeroed_stats() {
        let stats = aggregate(&[], Some(&catalog()));
        assert_eq!(stats.totals.count, 0);
        assert!(stats.by_category.is_empty());
        assert!(stats.by_region.unwrap().values().all(|r| r.totals.count == 0));
    }
}
