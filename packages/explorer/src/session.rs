//! Filter state for one loaded dataset.
//!
//! The session owns the full permit set, the optional region catalog and
//! the baseline statistics. Each filter call replaces the filtered view
//! wholesale; [`ExplorerSession::reset`] returns to the baseline.

use std::fmt;
use std::sync::Arc;

use energy_map_analytics::aggregate_with;
use energy_map_analytics_models::PermitStats;
use energy_map_source::dataset_def::DatasetDefinition;
use energy_map_source_models::{CategoryField, Permit};
use energy_map_spatial::{AttributionOptions, GeoContainment, RegionCatalog, assign_with};

use crate::search;

/// What a filtered view was selected by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCriteria {
    /// Permits whose category value equals `value`.
    Category {
        field: CategoryField,
        value: String,
    },
    /// Permits attributed to `region`.
    Region { region: String },
    /// Permits attributed to `region` whose category value equals `value`.
    RegionAndCategory {
        region: String,
        field: CategoryField,
        value: String,
    },
}

impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category { field, value } => write!(f, "{} = {value}", field.label()),
            Self::Region { region } => write!(f, "Región = {region}"),
            Self::RegionAndCategory {
                region,
                field,
                value,
            } => write!(f, "Región = {region}, {} = {value}", field.label()),
        }
    }
}

/// A filtered subset and its statistics.
#[derive(Debug, Clone)]
pub struct FilteredView {
    /// The filter that selected `permits`.
    pub criteria: FilterCriteria,
    /// The selected permits, in dataset order.
    pub permits: Vec<Permit>,
    /// Statistics over `permits` (attributed against the session catalog).
    pub stats: PermitStats,
}

/// Whether a filter is active.
#[derive(Debug, Clone, Default)]
pub enum FilterState {
    #[default]
    Unfiltered,
    Filtered(FilteredView),
}

/// Single-owner explorer state for one dataset.
#[derive(Debug, Clone)]
pub struct ExplorerSession {
    dataset: DatasetDefinition,
    permits: Vec<Permit>,
    catalog: Option<Arc<RegionCatalog>>,
    options: AttributionOptions,
    baseline: PermitStats,
    state: FilterState,
}

impl ExplorerSession {
    /// Creates a session and computes the baseline statistics.
    #[must_use]
    pub fn new(
        dataset: DatasetDefinition,
        permits: Vec<Permit>,
        catalog: Option<Arc<RegionCatalog>>,
    ) -> Self {
        Self::with_options(dataset, permits, catalog, AttributionOptions::default())
    }

    /// [`ExplorerSession::new`] with explicit attribution options.
    #[must_use]
    pub fn with_options(
        dataset: DatasetDefinition,
        permits: Vec<Permit>,
        catalog: Option<Arc<RegionCatalog>>,
        options: AttributionOptions,
    ) -> Self {
        let baseline = aggregate_with(&permits, catalog.as_deref(), options);
        log::info!(
            "[{}] session ready: {} permits, {}",
            dataset.id,
            permits.len(),
            catalog
                .as_deref()
                .map_or_else(|| "no regions".to_string(), |c| format!("{} regions", c.len()))
        );

        Self {
            dataset,
            permits,
            catalog,
            options,
            baseline,
            state: FilterState::Unfiltered,
        }
    }

    /// Swaps in a new dataset (or a refreshed copy) and clears the filter.
    pub fn replace_dataset(
        &mut self,
        dataset: DatasetDefinition,
        permits: Vec<Permit>,
        catalog: Option<Arc<RegionCatalog>>,
    ) {
        *self = Self::with_options(dataset, permits, catalog, self.options);
    }

    /// Selects permits whose `field` value equals `value` (both trimmed,
    /// case-sensitive).
    pub fn filter_by_category(&mut self, field: CategoryField, value: &str) -> &PermitStats {
        let value = value.trim();
        let subset = self
            .permits
            .iter()
            .filter(|permit| category_matches(permit, field, value))
            .cloned()
            .collect();

        self.apply(
            FilterCriteria::Category {
                field,
                value: value.to_string(),
            },
            subset,
        )
    }

    /// Selects permits attributed to the region named `name`. Without a
    /// catalog, or when no region matches, the subset is empty.
    pub fn filter_by_region(&mut self, name: &str) -> &PermitStats {
        let (region, subset) = self.region_subset(name);
        self.apply(FilterCriteria::Region { region }, subset)
    }

    /// Selects permits attributed to the region named `region` whose
    /// `field` value equals `value`.
    pub fn filter_by_region_and_category(
        &mut self,
        region: &str,
        field: CategoryField,
        value: &str,
    ) -> &PermitStats {
        let value = value.trim();
        let (region, mut subset) = self.region_subset(region);
        subset.retain(|permit| category_matches(permit, field, value));

        self.apply(
            FilterCriteria::RegionAndCategory {
                region,
                field,
                value: value.to_string(),
            },
            subset,
        )
    }

    /// Clears the filter and returns the baseline statistics.
    pub fn reset(&mut self) -> &PermitStats {
        self.state = FilterState::Unfiltered;
        &self.baseline
    }

    /// Searches the active subset (or every permit when unfiltered).
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Permit> {
        search::search(self.current_permits(), query, limit)
    }

    /// Permits of the active subset.
    #[must_use]
    pub fn current_permits(&self) -> &[Permit] {
        match &self.state {
            FilterState::Unfiltered => &self.permits,
            FilterState::Filtered(view) => &view.permits,
        }
    }

    /// Statistics of the active subset.
    #[must_use]
    pub const fn current_stats(&self) -> &PermitStats {
        match &self.state {
            FilterState::Unfiltered => &self.baseline,
            FilterState::Filtered(view) => &view.stats,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &FilterState {
        &self.state
    }

    /// Statistics over every permit of the dataset.
    #[must_use]
    pub const fn baseline(&self) -> &PermitStats {
        &self.baseline
    }

    #[must_use]
    pub const fn dataset(&self) -> &DatasetDefinition {
        &self.dataset
    }

    #[must_use]
    pub fn permits(&self) -> &[Permit] {
        &self.permits
    }

    #[must_use]
    pub fn catalog(&self) -> Option<&RegionCatalog> {
        self.catalog.as_deref()
    }

    /// Resolves `name` against the catalog and collects the permits
    /// attributed to it. Returns the resolved name (or the trimmed input
    /// when unresolved) and the subset.
    fn region_subset(&self, name: &str) -> (String, Vec<Permit>) {
        let Some(catalog) = self.catalog.as_deref() else {
            log::warn!("No region catalog loaded; region filter '{name}' selects nothing");
            return (name.trim().to_string(), Vec::new());
        };
        let Some(region) = catalog.resolve_name(name) else {
            log::warn!("No {} region matches '{name}'", catalog.kind());
            return (name.trim().to_string(), Vec::new());
        };

        let assignment = assign_with(&self.permits, catalog, &GeoContainment, self.options);
        let subset = assignment
            .region(&region.name)
            .iter()
            .map(|permit| (*permit).clone())
            .collect();

        (region.name.clone(), subset)
    }

    fn apply(&mut self, criteria: FilterCriteria, permits: Vec<Permit>) -> &PermitStats {
        let stats = aggregate_with(&permits, self.catalog.as_deref(), self.options);
        log::debug!(
            "[{}] filter {criteria}: {} permits",
            self.dataset.id,
            permits.len()
        );

        self.state = FilterState::Filtered(FilteredView {
            criteria,
            permits,
            stats,
        });
        self.current_stats()
    }
}

fn category_matches(permit: &Permit, field: CategoryField, value: &str) -> bool {
    permit
        .category(field)
        .is_some_and(|candidate| candidate.trim() == value)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use energy_map_geography_models::RegionKind;
    use energy_map_source::registry;
    use energy_map_source_models::{DatasetKind, Location, Metrics};

    use super::*;

    fn permit(number: &str, tech: &str, capacity: f64, location: Option<(f64, f64)>) -> Permit {
        Permit {
            kind: DatasetKind::Electricity,
            permit_number: Some(number.to_string()),
            holder: None,
            location: location.and_then(|(lat, lng)| Location::new(lat, lng)),
            categories: BTreeMap::from([(CategoryField::Technology, tech.to_string())]),
            metrics: Metrics {
                capacity,
                output: 0.0,
            },
        }
    }

    fn catalog() -> Arc<RegionCatalog> {
        let square = |name: &str, x0: f64, y0: f64, x1: f64, y1: f64| {
            format!(
                r#"{{"type":"Feature","properties":{{"name":"{name}"}},"geometry":{{"type":"Polygon","coordinates":[[[{x0},{y0}],[{x1},{y0}],[{x1},{y1}],[{x0},{y1}],[{x0},{y0}]]]}}}}"#
            )
        };
        let text = format!(
            r#"{{"type":"FeatureCollection","features":[{},{}]}}"#,
            square("Central", -100.0, 18.0, -97.0, 21.0),
            square("Noreste", -101.0, 22.0, -97.0, 28.0),
        );
        Arc::new(
            RegionCatalog::from_geojson_str(
                RegionKind::ControlArea,
                &text,
                &["name".to_string()],
            )
            .unwrap(),
        )
    }

    fn session(catalog: Option<Arc<RegionCatalog>>) -> ExplorerSession {
        let permits = vec![
            permit("E/1/GEN", "Solar", 10.0, Some((19.4, -99.1))),
            permit("E/2/GEN", "Eolica", 20.0, Some((25.6, -100.3))),
            permit("E/3/GEN", "Solar", 5.0, Some((19.0, -98.2))),
            permit("E/4/GEN", "Solar", 7.0, None),
        ];
        ExplorerSession::new(registry::dataset("electricity").unwrap(), permits, catalog)
    }

    #[test]
    fn region_filter_then_reset_restores_baseline() {
        let mut session = session(Some(catalog()));
        let baseline = session.current_stats().clone();

        let stats = session.filter_by_region("Central");
        assert_eq!(stats.totals.count, 2);
        assert!((stats.totals.capacity - 15.0).abs() < f64::EPSILON);
        assert!(matches!(session.state(), FilterState::Filtered(_)));

        let stats = session.reset();
        assert_eq!(stats, &baseline);
        assert_eq!(stats.totals.count, 4);
        assert!(matches!(session.state(), FilterState::Unfiltered));
    }

    #[test]
    fn category_filter_includes_unlocated_permits() {
        let mut session = session(Some(catalog()));
        let stats = session.filter_by_category(CategoryField::Technology, " Solar ");
        assert_eq!(stats.totals.count, 3);
        assert!((stats.totals.capacity - 22.0).abs() < f64::EPSILON);

        let regions = stats.region_totals().unwrap();
        assert_eq!(regions["Central"].count, 2);
        assert_eq!(regions["Noreste"].count, 0);
    }

    #[test]
    fn category_filter_is_case_sensitive() {
        let mut session = session(None);
        assert_eq!(
            session
                .filter_by_category(CategoryField::Technology, "solar")
                .totals
                .count,
            0
        );
    }

    #[test]
    fn region_and_category_filter_intersects() {
        let mut session = session(Some(catalog()));
        let stats =
            session.filter_by_region_and_category("Noreste", CategoryField::Technology, "Eolica");
        assert_eq!(stats.totals.count, 1);

        let stats =
            session.filter_by_region_and_category("Noreste", CategoryField::Technology, "Solar");
        assert_eq!(stats.totals.count, 0);
    }

    #[test]
    fn region_filter_without_catalog_is_empty() {
        let mut session = session(None);
        assert_eq!(session.filter_by_region("Central").totals.count, 0);
        assert!(session.current_permits().is_empty());
    }

    #[test]
    fn unknown_region_is_empty() {
        let mut session = session(Some(catalog()));
        assert_eq!(session.filter_by_region("Atlantida").totals.count, 0);
        let FilterState::Filtered(view) = session.state() else {
            panic!("expected a filtered view");
        };
        assert_eq!(
            view.criteria,
            FilterCriteria::Region {
                region: "Atlantida".to_string()
            }
        );
    }

    #[test]
    fn search_is_restricted_to_active_subset() {
        let mut session = session(Some(catalog()));
        assert_eq!(session.search("gen", 10).len(), 4);

        session.filter_by_region("Central");
        let found = session.search("gen", 10);
        assert_eq!(found.len(), 2);
        assert!(
            found
                .iter()
                .all(|p| p.permit_number.as_deref() != Some("E/2/GEN"))
        );
    }

    #[test]
    fn replace_dataset_resets_filter() {
        let mut session = session(Some(catalog()));
        session.filter_by_region("Central");

        let petroliferos = registry::dataset("petroliferos").unwrap();
        session.replace_dataset(petroliferos, Vec::new(), Some(catalog()));

        assert!(matches!(session.state(), FilterState::Unfiltered));
        assert_eq!(session.dataset().id, "petroliferos");
        assert_eq!(session.current_stats().totals.count, 0);
    }
}
