#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Permit explorer session.
//!
//! [`load::load_dataset`] fetches a dataset's spreadsheet and its boundary
//! document concurrently and normalizes the rows. An [`ExplorerSession`]
//! then owns the permits, the region catalog and the active filter, and
//! recomputes statistics for each selection.

pub mod load;
pub mod search;
pub mod session;

use energy_map_geography::GeographyError;
use energy_map_source::SourceError;
use energy_map_spatial::SpatialError;

pub use load::{LoadRequest, LoadedDataset, load_dataset};
pub use session::{ExplorerSession, FilterCriteria, FilterState, FilteredView};

/// Errors from loading a dataset into a session.
#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    /// The permit spreadsheet could not be fetched or parsed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The boundary document could not be loaded.
    #[error(transparent)]
    Spatial(#[from] SpatialError),

    /// A boundary set could not be resolved.
    #[error(transparent)]
    Geography(#[from] GeographyError),

    /// The dataset has no published spreadsheet and none was given.
    #[error("Dataset '{dataset}' has no spreadsheet URL; pass a CSV location")]
    MissingCsv {
        /// Dataset id.
        dataset: String,
    },
}
