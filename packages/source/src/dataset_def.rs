//! Config-driven permit dataset definition.
//!
//! [`DatasetDefinition`] captures everything unique about a published
//! spreadsheet in a serializable config struct: where it lives, which
//! boundary set it is attributed against by default, and the column alias
//! tables used to read its heterogeneously named headers.

use energy_map_source_models::{CategoryField, DatasetKind, RawRow};
use serde::Deserialize;

use crate::SourceError;

// ── Top-level dataset definition ─────────────────────────────────────────

/// A complete, config-driven permit dataset definition.
///
/// Loaded from TOML files at compile time (see [`crate::registry`]).
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier (e.g., `"electricity"`).
    pub id: String,
    /// Human-readable name (e.g., `"Permisos de Generación Eléctrica"`).
    pub name: String,
    /// Which typed schema the rows follow.
    pub kind: DatasetKind,
    /// Published CSV export of the spreadsheet, when one is known.
    #[serde(default)]
    pub sheet_url: Option<String>,
    /// Boundary set (see `energy_map_geography::registry`) used when the
    /// caller does not choose one.
    #[serde(default)]
    pub default_boundary: Option<String>,
    /// Category shown against regions in the region × category matrix.
    pub matrix_field: CategoryField,
    /// Units and labels for the two metrics.
    pub metrics: MetricLabels,
    /// Column alias tables.
    pub fields: FieldAliases,
}

/// Display labels for the two additive metrics.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricLabels {
    /// Label for [`energy_map_source_models::Metrics::capacity`].
    pub capacity: String,
    /// Unit for the capacity metric (e.g., `"MW"`).
    pub capacity_unit: String,
    /// Label for [`energy_map_source_models::Metrics::output`].
    pub output: String,
    /// Unit for the output metric (e.g., `"GWh"`, `"MXN"`).
    pub output_unit: String,
}

// ── Field aliases ────────────────────────────────────────────────────────

/// Maps canonical permit fields to the column names they appear under.
///
/// Every list is tried in order; the first column holding a non-empty
/// value wins.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldAliases {
    /// Latitude columns.
    #[serde(default = "default_latitude_aliases")]
    pub latitude: Vec<String>,
    /// Longitude columns.
    #[serde(default = "default_longitude_aliases")]
    pub longitude: Vec<String>,
    /// Permit number columns.
    #[serde(default)]
    pub permit_number: Vec<String>,
    /// Permit holder (razón social) columns.
    #[serde(default)]
    pub holder: Vec<String>,
    /// Capacity columns.
    #[serde(default)]
    pub capacity: Vec<String>,
    /// Generation / investment columns.
    #[serde(default)]
    pub output: Vec<String>,
    /// Category columns, in display order.
    #[serde(default)]
    pub categories: Vec<CategoryAliases>,
}

/// Column aliases for one [`CategoryField`].
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryAliases {
    /// Canonical field.
    pub field: CategoryField,
    /// Columns tried in order.
    pub aliases: Vec<String>,
}

fn default_latitude_aliases() -> Vec<String> {
    ["lat", "Lat", "latitude", "Latitude", "latitud"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_longitude_aliases() -> Vec<String> {
    [
        "lng",
        "Lng",
        "lon",
        "Lon",
        "longitude",
        "Longitude",
        "longitud",
        "Longitud",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Returns the trimmed value of the first alias holding a non-empty value.
#[must_use]
pub fn first_value<'a>(row: &'a RawRow, aliases: &[String]) -> Option<&'a str> {
    aliases
        .iter()
        .filter_map(|alias| row.get(alias))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

impl DatasetDefinition {
    /// Returns the unique dataset identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable dataset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category fields declared by this dataset, in display order.
    #[must_use]
    pub fn category_fields(&self) -> Vec<CategoryField> {
        self.fields.categories.iter().map(|c| c.field).collect()
    }

    /// Checks the invariants serde cannot express.
    fn validate(&self) -> Result<(), SourceError> {
        if self.fields.latitude.is_empty() || self.fields.longitude.is_empty() {
            return Err(SourceError::Definition {
                message: format!("{}: coordinate alias lists must not be empty", self.id),
            });
        }
        let fields = self.category_fields();
        if !fields.contains(&self.matrix_field) {
            return Err(SourceError::Definition {
                message: format!(
                    "{}: matrix_field {} is not a declared category",
                    self.id, self.matrix_field
                ),
            });
        }
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].contains(field) {
                return Err(SourceError::Definition {
                    message: format!("{}: category {field} declared twice", self.id),
                });
            }
        }
        Ok(())
    }
}

/// Parses a [`DatasetDefinition`] from a TOML string.
///
/// # Errors
///
/// Returns [`SourceError::Definition`] if the TOML is malformed, misses
/// required fields, or declares an inconsistent schema.
pub fn parse_dataset_toml(toml_str: &str) -> Result<DatasetDefinition, SourceError> {
    let def: DatasetDefinition =
        toml::de::from_str(toml_str).map_err(|e| SourceError::Definition {
            message: e.to_string(),
        })?;
    def.validate()?;
    Ok(def)
}
