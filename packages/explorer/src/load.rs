//! Concurrent dataset + boundary loading.
//!
//! The spreadsheet and the boundary document are fetched at the same time
//! and joined before normalization. A boundary failure is not fatal: the
//! dataset is still loaded, just without regional statistics.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use energy_map_geography::BoundaryDefinition;
use energy_map_source::SourceLocation;
use energy_map_source::csv_download::fetch_rows;
use energy_map_source::dataset_def::DatasetDefinition;
use energy_map_source::normalize::{CoordinatePolicy, Normalizer};
use energy_map_source::progress::ProgressCallback;
use energy_map_source_models::Permit;
use energy_map_spatial::{CatalogCache, RegionCatalog, fetch_catalog};
use futures::future::OptionFuture;

use crate::ExplorerError;
use crate::session::ExplorerSession;

/// What to load.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    /// Dataset schema and identity.
    pub dataset: DatasetDefinition,
    /// Overrides the dataset's published spreadsheet URL.
    pub csv: Option<SourceLocation>,
    /// Boundary set to attribute against; `None` skips regions entirely.
    pub boundary: Option<BoundaryDefinition>,
    /// Overrides the boundary set's download URL.
    pub boundary_location: Option<SourceLocation>,
    /// What to do with rows lacking usable coordinates.
    pub policy: CoordinatePolicy,
}

impl LoadRequest {
    /// A request using the dataset's own spreadsheet and no boundaries.
    #[must_use]
    pub fn new(dataset: DatasetDefinition) -> Self {
        Self {
            dataset,
            csv: None,
            boundary: None,
            boundary_location: None,
            policy: CoordinatePolicy::default(),
        }
    }

    fn csv_location(&self) -> Result<SourceLocation, ExplorerError> {
        self.csv
            .clone()
            .or_else(|| self.dataset.sheet_url.as_deref().map(SourceLocation::parse))
            .ok_or_else(|| ExplorerError::MissingCsv {
                dataset: self.dataset.id.clone(),
            })
    }
}

/// A normalized dataset ready to become a session.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    /// Dataset schema and identity.
    pub dataset: DatasetDefinition,
    pub permits: Vec<Permit>,
    /// `None` when no boundary was requested or its load failed.
    pub catalog: Option<Arc<RegionCatalog>>,
    /// Spreadsheet rows read, before normalization.
    pub rows: usize,
    /// Rows dropped for unusable coordinates.
    pub skipped: usize,
    /// Permits kept without a location.
    pub unlocated: usize,
    /// When the load finished.
    pub loaded_at: DateTime<Utc>,
}

impl LoadedDataset {
    /// Moves the data into a fresh session.
    #[must_use]
    pub fn into_session(self) -> ExplorerSession {
        ExplorerSession::new(self.dataset, self.permits, self.catalog)
    }
}

/// Fetches the spreadsheet and (optionally) the boundary catalog
/// concurrently, then normalizes the rows.
///
/// Boundary catalogs come from `cache` when already loaded this session.
///
/// # Errors
///
/// Returns [`ExplorerError`] if the spreadsheet location is unknown or the
/// spreadsheet cannot be fetched or parsed. Boundary failures are logged
/// and yield a dataset without a catalog.
pub async fn load_dataset(
    client: &reqwest::Client,
    cache: &mut CatalogCache,
    request: &LoadRequest,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<LoadedDataset, ExplorerError> {
    let csv_location = request.csv_location()?;

    let boundary = request.boundary.as_ref().map(|def| {
        let location = request
            .boundary_location
            .clone()
            .unwrap_or_else(|| SourceLocation::Url(def.url.clone()));
        (def, location)
    });

    let boundary_fetch = if let Some((def, location)) = &boundary {
        Some(cache.load_with(def.kind, move || fetch_catalog(client, def, location)))
    } else {
        None
    };

    let (rows, catalog) = tokio::join!(
        fetch_rows(client, &csv_location, progress),
        OptionFuture::from(boundary_fetch),
    );

    let catalog = match catalog {
        Some(Ok(catalog)) => Some(catalog),
        Some(Err(e)) => {
            log::warn!("Boundary load failed, continuing without regions: {e}");
            None
        }
        None => None,
    };

    let rows = rows.inspect_err(|_| progress.finish_and_clear())?;
    let report = Normalizer::new(&request.dataset).normalize_rows(&rows, request.policy);

    log::info!(
        "[{}] {} permits from {} rows ({} skipped, {} unlocated)",
        request.dataset.id,
        report.permits.len(),
        rows.len(),
        report.skipped,
        report.unlocated
    );

    Ok(LoadedDataset {
        dataset: request.dataset.clone(),
        permits: report.permits,
        catalog,
        rows: rows.len(),
        skipped: report.skipped,
        unlocated: report.unlocated,
        loaded_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use energy_map_geography::boundary_for_kind;
    use energy_map_geography_models::RegionKind;
    use energy_map_source::progress::null_progress;
    use energy_map_source::registry;
    use energy_map_source_models::CategoryField;

    use super::*;

    const CSV: &str = "\
NumeroPermiso,RazonSocial,lat,lon,Tecnología,CapacidadAutorizadaMW,Generación_estimada_anual
E/1/GEN,Solar del Centro,\"19,4\",\"-99,1\",Solar,10,\"1,5\"
E/2/GEN,Viento Norte,25.6,-100.3,Eólica,20,3
E/3/GEN,Sin Coordenadas,abc,-99.0,Solar,5,1
";

    const GEOJSON: &str = r#"{"type":"FeatureCollection","features":[
{"type":"Feature","properties":{"name":"Central"},"geometry":{"type":"Polygon","coordinates":[[[-100,18],[-97,18],[-97,21],[-100,21],[-100,18]]]}},
{"type":"Feature","properties":{"name":"Noreste"},"geometry":{"type":"Polygon","coordinates":[[[-101,22],[-97,22],[-97,28],[-101,28],[-101,22]]]}}
]}"#;

    fn fixture(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "energy_map_load_{}_{name}",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn request(csv: PathBuf, boundary: Option<PathBuf>) -> LoadRequest {
        LoadRequest {
            csv: Some(SourceLocation::Path(csv)),
            boundary: Some(boundary_for_kind(RegionKind::ControlArea).unwrap()),
            boundary_location: boundary.map(SourceLocation::Path),
            ..LoadRequest::new(registry::dataset("electricity").unwrap())
        }
    }

    #[tokio::test]
    async fn loads_rows_and_boundaries_together() {
        let csv = fixture("ok.csv", CSV);
        let geojson = fixture("ok.geojson", GEOJSON);
        let client = reqwest::Client::new();
        let mut cache = CatalogCache::new();

        let loaded = load_dataset(
            &client,
            &mut cache,
            &request(csv, Some(geojson)),
            &null_progress(),
        )
        .await
        .unwrap();

        assert_eq!(loaded.rows, 3);
        assert_eq!(loaded.permits.len(), 2);
        assert_eq!(loaded.skipped, 1);
        assert_eq!(loaded.catalog.as_ref().unwrap().len(), 2);
        assert!(cache.get(RegionKind::ControlArea).is_some());

        let session = loaded.into_session();
        let stats = session.current_stats();
        assert_eq!(stats.totals.count, 2);
        assert!((stats.totals.output - 4.5).abs() < 1e-9);
        assert_eq!(stats.category(CategoryField::Technology)["Eólica"].count, 1);
        assert_eq!(stats.region_totals().unwrap()["Central"].count, 1);
    }

    #[tokio::test]
    async fn boundary_failure_keeps_dataset() {
        let csv = fixture("nobounds.csv", CSV);
        let missing = std::env::temp_dir().join("energy_map_load_missing.geojson");
        let client = reqwest::Client::new();
        let mut cache = CatalogCache::new();

        let loaded = load_dataset(
            &client,
            &mut cache,
            &request(csv, Some(missing)),
            &null_progress(),
        )
        .await
        .unwrap();

        assert_eq!(loaded.permits.len(), 2);
        assert!(loaded.catalog.is_none());
        assert!(cache.is_empty());
        assert!(loaded.into_session().current_stats().by_region.is_none());
    }

    #[tokio::test]
    async fn keep_unlocated_policy_counts_every_row() {
        let csv = fixture("unlocated.csv", CSV);
        let client = reqwest::Client::new();
        let mut cache = CatalogCache::new();

        let mut request = request(csv, None);
        request.boundary = None;
        request.policy = CoordinatePolicy::KeepUnlocated;

        let loaded = load_dataset(&client, &mut cache, &request, &null_progress())
            .await
            .unwrap();
        assert_eq!(loaded.permits.len(), 3);
        assert_eq!(loaded.unlocated, 1);
        assert!(loaded.catalog.is_none());
    }

    #[tokio::test]
    async fn dataset_without_sheet_requires_csv() {
        let client = reqwest::Client::new();
        let mut cache = CatalogCache::new();
        let request = LoadRequest::new(registry::dataset("gas_lp").unwrap());

        let result = load_dataset(&client, &mut cache, &request, &null_progress()).await;
        assert!(matches!(result, Err(ExplorerError::MissingCsv { .. })));
    }
}
