#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Boundary set definitions and state name matching.
//!
//! Boundary sets (control areas, states) are declared as embedded TOML
//! files under `packages/geography/boundaries/` and resolved by id. The
//! [`names`] module reconciles colloquial state names from permit
//! spreadsheets with the official names carried by boundary polygons.

pub mod names;
pub mod registry;

pub use energy_map_geography_models::RegionKind;
pub use names::{MatchKind, StateMatch, main_state_name, match_state_name, normalize_state_name};
pub use registry::{BoundaryDefinition, all_boundaries, boundary, boundary_for_kind};

/// Errors from boundary definition lookup.
#[derive(Debug, thiserror::Error)]
pub enum GeographyError {
    /// An embedded boundary TOML failed to parse.
    #[error("Boundary definition error: {message}")]
    Definition {
        /// Description of the problem.
        message: String,
    },

    /// No boundary set has the requested id.
    #[error("Unknown boundary set '{id}'")]
    UnknownBoundary {
        /// The id that was requested.
        id: String,
    },
}
