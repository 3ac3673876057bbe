#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region catalogs and point-in-polygon attribution.
//!
//! Boundary polygons are loaded from a `GeoJSON` `FeatureCollection` into a
//! [`RegionCatalog`], cached per [`RegionKind`] for the session by
//! [`CatalogCache`], and used by [`assign`] to attribute each located
//! permit to the first region that contains it.

pub mod attribution;
pub mod cache;
pub mod catalog;
pub mod containment;

use energy_map_geography::BoundaryDefinition;
use energy_map_source::{SourceError, SourceLocation, fetch_text};

pub use attribution::{
    AttributionDiagnostics, AttributionOptions, Assignment, assign, assign_with,
};
pub use cache::CatalogCache;
pub use catalog::{Region, RegionCatalog, RegionShape};
pub use containment::{ContainmentTest, GeoContainment, GeometryError};
pub use energy_map_geography_models::RegionKind;

/// Errors from loading boundary documents.
#[derive(Debug, thiserror::Error)]
pub enum SpatialError {
    /// The document could not be fetched.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The document is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The document is `GeoJSON` but not a usable feature collection.
    #[error("Invalid boundary collection: {message}")]
    InvalidCollection {
        /// Description of the problem.
        message: String,
    },
}

/// Downloads (or reads) a boundary document and builds its catalog.
///
/// # Errors
///
/// Returns [`SpatialError`] if the document cannot be fetched or is not a
/// `GeoJSON` feature collection.
pub async fn fetch_catalog(
    client: &reqwest::Client,
    boundary: &BoundaryDefinition,
    location: &SourceLocation,
) -> Result<RegionCatalog, SpatialError> {
    log::info!("Loading {} boundaries from {location}", boundary.name);

    let text = fetch_text(client, location).await?;
    let catalog =
        RegionCatalog::from_geojson_str(boundary.kind, &text, &boundary.name_properties)?;

    log::info!(
        "Loaded {} {} regions ({} without usable geometry)",
        catalog.len(),
        boundary.kind,
        catalog.regions().iter().filter(|r| !r.is_valid()).count()
    );

    let missing = catalog.missing_official_names();
    if !missing.is_empty() {
        log::warn!(
            "{} boundaries lack {} official {} regions: {}",
            boundary.name,
            missing.len(),
            boundary.kind,
            missing.join(", ")
        );
    }

    Ok(catalog)
}
