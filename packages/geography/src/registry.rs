//! Boundary set registry.
//!
//! Each `.toml` file in `packages/geography/boundaries/` describes one
//! `GeoJSON` `FeatureCollection` and how to read region names from its
//! feature properties.

use serde::Deserialize;

use crate::{GeographyError, RegionKind};

const BOUNDARY_TOMLS: &[(&str, &str)] = &[
    (
        "control_areas",
        include_str!("../boundaries/control_areas.toml"),
    ),
    ("states", include_str!("../boundaries/states.toml")),
];

/// A downloadable boundary set.
#[derive(Debug, Clone, Deserialize)]
pub struct BoundaryDefinition {
    /// Registry id, e.g. `"states"`.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Which region kind the features describe.
    pub kind: RegionKind,
    /// `GeoJSON` download URL.
    pub url: String,
    /// Feature property names holding the region name, tried in order.
    #[serde(default = "default_name_properties")]
    pub name_properties: Vec<String>,
}

fn default_name_properties() -> Vec<String> {
    vec!["name".to_string()]
}

/// Parses a boundary definition from TOML text.
///
/// # Errors
///
/// Returns [`GeographyError::Definition`] if the TOML is malformed or
/// declares no name property.
pub fn parse_boundary_toml(text: &str) -> Result<BoundaryDefinition, GeographyError> {
    let def: BoundaryDefinition =
        toml::from_str(text).map_err(|e| GeographyError::Definition {
            message: e.to_string(),
        })?;

    if def.name_properties.is_empty() {
        return Err(GeographyError::Definition {
            message: format!("{}: name_properties must not be empty", def.id),
        });
    }

    Ok(def)
}

/// Returns every registered boundary set.
///
/// # Errors
///
/// Returns [`GeographyError::Definition`] naming the first embedded file
/// that fails to parse.
pub fn all_boundaries() -> Result<Vec<BoundaryDefinition>, GeographyError> {
    BOUNDARY_TOMLS
        .iter()
        .map(|(file, text)| {
            parse_boundary_toml(text).map_err(|e| GeographyError::Definition {
                message: format!("{file}.toml: {e}"),
            })
        })
        .collect()
}

/// Looks up a boundary set by id.
///
/// # Errors
///
/// Returns [`GeographyError::UnknownBoundary`] if no set has the id.
pub fn boundary(id: &str) -> Result<BoundaryDefinition, GeographyError> {
    all_boundaries()?
        .into_iter()
        .find(|def| def.id == id)
        .ok_or_else(|| GeographyError::UnknownBoundary { id: id.to_string() })
}

/// Returns the first boundary set describing regions of `kind`.
///
/// # Errors
///
/// Returns [`GeographyError::UnknownBoundary`] if none is registered.
pub fn boundary_for_kind(kind: RegionKind) -> Result<BoundaryDefinition, GeographyError> {
    all_boundaries()?
        .into_iter()
        .find(|def| def.kind == kind)
        .ok_or_else(|| GeographyError::UnknownBoundary {
            id: kind.to_string(),
        })
}
